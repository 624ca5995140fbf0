//! Editor configuration.
//!
//! Every field has a default, so hosts can load a partial JSON object.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum undo depth. Default: **100**.
    pub history_depth: usize,
    pub animation: AnimationConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 100,
            animation: AnimationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Loop length in milliseconds. Default: **10000**.
    pub duration_ms: f64,

    /// Minimum playhead travel between two UI snapshots. Default: **100**.
    pub snapshot_interval_ms: f64,

    /// Keep applying the last keyframe once the playhead has passed it,
    /// instead of leaving the node untouched. Default: **false**.
    pub hold_last_keyframe: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000.0,
            snapshot_interval_ms: 100.0,
            hold_last_keyframe: false,
        }
    }
}
