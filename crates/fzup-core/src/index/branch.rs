//! Branch index scraping.
//!
//! Firmware branches are published as plain HTML directory listings.
//! The anchors on the page carry file names following the
//! `flipper-z-<target>-<filetype>-<version>.<ext>` grammar; everything
//! else on the page is noise.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::index::FileType;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s[^>]*href\s*=\s*"([^"]+)""#).expect("hardcoded regex compiles")
});

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^flipper-z-(\w+)-(\w+)-(.+)\.(\w+)$").expect("hardcoded regex compiles")
});

/// Parsed contents of one branch directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchIndex {
    /// Version string shared by every artifact in the listing.
    pub version: String,
    files: BTreeMap<(FileType, String), String>,
}

impl BranchIndex {
    /// Parse a branch directory listing.
    ///
    /// Anchors whose link target contains `.map` are ignored, as are
    /// file names with an unrecognized type/extension combination. All
    /// surviving artifacts must agree on a common version prefix; two
    /// incompatible version strings in one listing are a hard error
    /// rather than a silent pick.
    pub fn parse(html: &str) -> Result<Self> {
        let mut files = BTreeMap::new();
        let mut version: Option<String> = None;

        for capture in ANCHOR_RE.captures_iter(html) {
            let href = &capture[1];
            // .map files have special naming and are never deployed
            if href.contains(".map") {
                continue;
            }
            let Some(name) = FILE_NAME_RE.captures(href) else {
                continue;
            };
            let (target, kind, file_version, ext) = (&name[1], &name[2], &name[3], &name[4]);

            if let Some(file_type) = FileType::from_parts(kind, ext) {
                files.insert((file_type, target.to_string()), href.to_string());
            }

            match &version {
                None => version = Some(file_version.to_string()),
                Some(known) if !file_version.starts_with(known.as_str()) => {
                    return Err(Error::resolution(format!(
                        "found multiple versions: {known} and {file_version}"
                    )));
                }
                Some(_) => {}
            }
        }

        let version = version
            .ok_or_else(|| Error::resolution("no SDK artifacts found in branch index"))?;

        Ok(Self { version, files })
    }

    /// Look up the file name published for a (type, target) pair.
    pub fn file_for(&self, file_type: FileType, target: &str) -> Option<&str> {
        self.files
            .get(&(file_type, target.to_string()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body><pre>
        <a href="../">../</a>
        <a href="flipper-z-f7-sdk-dev-abc123.zip">flipper-z-f7-sdk-dev-abc123.zip</a>
        <a href="flipper-z-f7-lib-dev-abc123.zip">flipper-z-f7-lib-dev-abc123.zip</a>
        <a href="flipper-z-f18-sdk-dev-abc123.zip">flipper-z-f18-sdk-dev-abc123.zip</a>
        <a href="flipper-z-any-scripts-dev-abc123.tgz">flipper-z-any-scripts-dev-abc123.tgz</a>
        <a href="flipper-z-f7-firmware-dev-abc123.elf.map">map file</a>
        <a href="flipper-z-f7-mystery-dev-abc123.xyz">unknown artifact</a>
        <a href="checksums.txt">checksums.txt</a>
        </pre></body></html>
    "#;

    #[test]
    fn parses_artifacts_and_version() {
        let index = BranchIndex::parse(LISTING).unwrap();
        assert_eq!(index.version, "dev-abc123");
        assert_eq!(
            index.file_for(FileType::SdkZip, "f7"),
            Some("flipper-z-f7-sdk-dev-abc123.zip")
        );
        assert_eq!(
            index.file_for(FileType::SdkZip, "f18"),
            Some("flipper-z-f18-sdk-dev-abc123.zip")
        );
        assert_eq!(
            index.file_for(FileType::ScriptsTgz, "any"),
            Some("flipper-z-any-scripts-dev-abc123.tgz")
        );
    }

    #[test]
    fn skips_map_files_and_unknown_types() {
        let index = BranchIndex::parse(LISTING).unwrap();
        assert_eq!(index.file_for(FileType::FirmwareElf, "f7"), None);
    }

    #[test]
    fn missing_target_is_not_listed() {
        let index = BranchIndex::parse(LISTING).unwrap();
        assert_eq!(index.file_for(FileType::SdkZip, "f99"), None);
    }

    #[test]
    fn conflicting_versions_are_fatal() {
        let html = r#"
            <a href="flipper-z-f7-sdk-1.0.0.zip">a</a>
            <a href="flipper-z-f7-lib-2.5.1.zip">b</a>
        "#;
        let err = BranchIndex::parse(html).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        assert!(err.to_string().contains("multiple versions"));
    }

    #[test]
    fn version_prefix_extension_is_not_a_conflict() {
        let html = r#"
            <a href="flipper-z-f7-sdk-1.0.zip">a</a>
            <a href="flipper-z-f7-lib-1.0.1-rc.zip">b</a>
        "#;
        let index = BranchIndex::parse(html).unwrap();
        assert_eq!(index.version, "1.0");
    }

    #[test]
    fn empty_listing_is_an_error() {
        let err = BranchIndex::parse("<html><body>nothing here</body></html>").unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
    }
}
