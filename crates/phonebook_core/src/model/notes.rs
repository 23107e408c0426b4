//! GM notes singleton.
//!
//! # Invariants
//! - Exactly one logical notes record exists per installation.
//! - Saves overwrite all three fields (last write wins).

use serde::{Deserialize, Serialize};

/// Session-planning notes pad.
///
/// `Default` is the all-empty record returned before anything was saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notes {
    /// Plot hooks to drop on the players.
    #[serde(default)]
    pub hooks: String,
    /// Recap of what happened last session.
    #[serde(default)]
    pub previous_session: String,
    #[serde(default)]
    pub misc: String,
}

impl Notes {
    pub fn new(
        hooks: impl Into<String>,
        previous_session: impl Into<String>,
        misc: impl Into<String>,
    ) -> Self {
        Self {
            hooks: hooks.into(),
            previous_session: previous_session.into(),
            misc: misc.into(),
        }
    }
}
