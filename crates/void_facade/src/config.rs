//! Facade layer configuration

use crate::error::FacadeResult;
use serde::{Deserialize, Serialize};

/// Which frame a defaulted frame argument resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePolicy {
    /// Inside an edit session, use the frame that was current when the
    /// outermost transaction opened. Outside, query the host.
    SnapshotAtEditStart,
    /// Always query the host at call time
    Live,
}

/// Configuration injected into a [`SceneFacade`](crate::SceneFacade)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Accessing an unclassifiable slot fails instead of yielding `None`
    pub strict_properties: bool,
    /// How defaulted frame arguments are resolved
    pub frame_policy: FramePolicy,
    /// Rebuild behaviour caches when the host's behaviour generation changes
    pub revalidate_behaviour_cache: bool,
    /// Use the host's published slot schema instead of probing when available
    pub prefer_schema: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            strict_properties: false,
            frame_policy: FramePolicy::SnapshotAtEditStart,
            revalidate_behaviour_cache: true,
            prefer_schema: true,
        }
    }
}

impl FacadeConfig {
    /// Default configuration with strict property access
    pub fn strict() -> Self {
        Self {
            strict_properties: true,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> FacadeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
