//! Integration tests for fzup

#[test]
fn test_workspace_builds() {
    // Basic smoke test to ensure the workspace compiles
    assert!(true);
}

#[test]
fn test_source_modes() {
    use fzup_core::source::Mode;

    // All source modes round-trip through their string form
    for mode in [Mode::Branch, Mode::Channel, Mode::Url, Mode::Local] {
        assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
    }
}
