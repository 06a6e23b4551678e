//! Engine configuration.
//!
//! Defaults ship embedded in the binary (`config.engine.json`). A project
//! file is deep-merged over them: objects merge key by key, every other value
//! (including arrays) replaces the default outright.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use engine_math::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ENGINE_DEFAULTS: &str = include_str!("../config.engine.json");

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Action → key bindings. Keys use DOM `KeyboardEvent.code` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InputConfig {
    pub mappings: BTreeMap<String, Vec<String>>,
}

/// Frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Upper bound on the per-frame delta, in seconds.
    pub max_dt: f32,
    pub target_fps: f64,
    /// Stop after this many frames (0 = run until stopped).
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_dt: 0.033,
            target_fps: 60.0,
            max_frames: 0,
        }
    }
}

/// World-wide physics parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -25.0, 0.0),
        }
    }
}

/// Pointer look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookConfig {
    /// Pointer pixels per radian of camera rotation.
    pub sensitivity: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self { sensitivity: 500.0 }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub input: InputConfig,
    pub frame: FrameConfig,
    pub physics: PhysicsConfig,
    pub look: LookConfig,
}

impl EngineConfig {
    /// The embedded engine defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded document is malformed.
    pub fn engine_defaults() -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(ENGINE_DEFAULTS)?)
    }

    /// Engine defaults with a project JSON document merged over them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if either document is malformed or the
    /// merged result does not describe a valid config.
    pub fn from_project_json(project: &str) -> Result<Self, ConfigError> {
        let mut merged: Value = serde_json::from_str(ENGINE_DEFAULTS)?;
        let overlay: Value = serde_json::from_str(project)?;
        deep_merge(&mut merged, overlay);
        Ok(serde_json::from_value(merged)?)
    }

    /// Load a project config file and merge it over the engine defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid config JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_project_json(&text)
    }
}

/// Merge `overlay` into `base`. Objects merge recursively; anything else in
/// `overlay` replaces the corresponding value in `base`.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
