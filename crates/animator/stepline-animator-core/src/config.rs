//! Runtime configuration for an animation context.

use serde::{Deserialize, Serialize};

use crate::error::{AnimatorError, Result};

/// How zero-delay triggers are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutorMode {
    /// Run on the calling thread; errors propagate to the caller of `begin`.
    #[default]
    Inline,
    /// Dispatch onto a worker pool of `threads` threads (0 = rayon's default).
    Pool { threads: usize },
}

/// Diagnostics switches. Only affects logging volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
}

/// Configuration consumed by [`crate::AnimationContext::new`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executor: ExecutorMode,
    /// Initial capacity hint for the scheduler registry.
    pub registry_capacity: usize,
    pub diagnostics: DiagnosticsCfg,
}

impl Config {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AnimatorError::Config {
            reason: e.to_string(),
        })
    }
}
