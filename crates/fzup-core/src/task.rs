//! Deploy task reconciliation.
//!
//! A new request rarely repeats every parameter; it is merged with the
//! previously persisted state so that a caller can change only the
//! hardware target while keeping the selected channel, or vice versa.
//! Fields a request does not provide never erase stored values.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::source::Mode;
use crate::state::SdkState;

/// Hardware target assumed when neither the request nor previous state
/// names one.
pub const DEFAULT_HW_TARGET: &str = "f7";

/// What the caller asked for in this invocation. Unset fields mean
/// "keep whatever was deployed before".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployTask {
    pub hw_target: Option<String>,
    pub force: bool,
    pub mode: Option<Mode>,
    /// Mode-specific parameters; only explicitly provided values are
    /// present.
    pub params: BTreeMap<String, String>,
}

/// Fully specified task produced by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveTask {
    pub hw_target: String,
    pub force: bool,
    pub mode: Mode,
    pub params: BTreeMap<String, String>,
}

impl EffectiveTask {
    /// Task deployed when there is no previous state and the caller
    /// specified no mode: latest release channel for the default target.
    pub fn default_task() -> Self {
        Self {
            hw_target: DEFAULT_HW_TARGET.to_string(),
            force: false,
            mode: Mode::Channel,
            params: BTreeMap::from([("channel".to_string(), "release".to_string())]),
        }
    }
}

/// Merge a request with the previously persisted state.
///
/// The merge is asymmetric: explicitly provided fields override, absent
/// fields inherit. `force` is never inherited. Switching modes leaves
/// the previous mode's stored parameters in place; they become inert
/// until that mode is selected again.
pub fn reconcile(previous: Option<&SdkState>, requested: &DeployTask) -> EffectiveTask {
    let effective = match previous {
        None => match requested.mode {
            Some(mode) => EffectiveTask {
                hw_target: requested
                    .hw_target
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HW_TARGET.to_string()),
                force: requested.force,
                mode,
                params: requested
                    .params
                    .iter()
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            },
            None => EffectiveTask {
                force: requested.force,
                ..EffectiveTask::default_task()
            },
        },
        Some(prev) => {
            let mut params = prev.params.clone();
            for (key, value) in &requested.params {
                if !value.is_empty() {
                    params.insert(key.clone(), value.clone());
                }
            }
            EffectiveTask {
                hw_target: requested
                    .hw_target
                    .clone()
                    .unwrap_or_else(|| prev.hw_target.clone()),
                force: requested.force,
                mode: requested.mode.unwrap_or(prev.mode),
                params,
            }
        }
    };
    debug!("reconciled deploy task: {effective:?}");
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Metadata;

    fn channel_state() -> SdkState {
        SdkState::from_deployment(
            "f7",
            Metadata::from([
                ("mode".to_string(), "channel".to_string()),
                ("channel".to_string(), "release".to_string()),
                ("version".to_string(), "1.2.0".to_string()),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn empty_request_keeps_previous_task() {
        let prev = channel_state();
        let requested = DeployTask {
            force: true,
            ..DeployTask::default()
        };

        let effective = reconcile(Some(&prev), &requested);

        assert_eq!(effective.hw_target, prev.hw_target);
        assert_eq!(effective.mode, prev.mode);
        assert_eq!(effective.params, prev.params);
        assert!(effective.force);
    }

    #[test]
    fn no_previous_and_no_mode_yields_default_task() {
        let effective = reconcile(None, &DeployTask::default());
        assert_eq!(effective, EffectiveTask::default_task());
    }

    #[test]
    fn no_previous_with_mode_uses_request_and_default_target() {
        let requested = DeployTask {
            mode: Some(Mode::Branch),
            params: BTreeMap::from([("branch".to_string(), "dev".to_string())]),
            ..DeployTask::default()
        };
        let effective = reconcile(None, &requested);
        assert_eq!(effective.hw_target, DEFAULT_HW_TARGET);
        assert_eq!(effective.mode, Mode::Branch);
        assert_eq!(effective.params["branch"], "dev");
    }

    #[test]
    fn target_switch_keeps_previous_channel() {
        let prev = channel_state();
        let requested = DeployTask {
            hw_target: Some("f18".to_string()),
            ..DeployTask::default()
        };

        let effective = reconcile(Some(&prev), &requested);

        assert_eq!(effective.hw_target, "f18");
        assert_eq!(effective.mode, Mode::Channel);
        assert_eq!(effective.params["channel"], "release");
    }

    #[test]
    fn mode_switch_keeps_inert_previous_params() {
        let prev = channel_state();
        let requested = DeployTask {
            mode: Some(Mode::Branch),
            params: BTreeMap::from([("branch".to_string(), "dev".to_string())]),
            ..DeployTask::default()
        };

        let effective = reconcile(Some(&prev), &requested);

        assert_eq!(effective.mode, Mode::Branch);
        assert_eq!(effective.params["branch"], "dev");
        // The channel selection stays stored, inert until channel mode
        // is selected again.
        assert_eq!(effective.params["channel"], "release");
    }

    #[test]
    fn empty_param_values_do_not_erase_stored_ones() {
        let prev = channel_state();
        let requested = DeployTask {
            params: BTreeMap::from([("channel".to_string(), String::new())]),
            ..DeployTask::default()
        };

        let effective = reconcile(Some(&prev), &requested);
        assert_eq!(effective.params["channel"], "release");
    }

    #[test]
    fn force_is_never_inherited() {
        let prev = channel_state();
        let effective = reconcile(Some(&prev), &DeployTask::default());
        assert!(!effective.force);
    }
}
