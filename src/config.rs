use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Seconds between revealed characters.
pub const DEFAULT_CHAR_INTERVAL: f32 = 0.05;

/// What an advance signal does while a line is still being revealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealAdvance {
    /// Drop the signal; the line must finish revealing first.
    #[default]
    Ignore,
    /// Reveal the rest of the line at once and wait for the next signal.
    Complete,
}

/// Tunables for [`crate::PlaybackEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub char_interval: f32,
    pub reveal_advance: RevealAdvance,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            char_interval: DEFAULT_CHAR_INTERVAL,
            reveal_advance: RevealAdvance::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if !self.char_interval.is_finite() || self.char_interval <= 0.0 {
            return Err(SceneError::Config(format!(
                "char_interval must be a positive number of seconds, got {}",
                self.char_interval
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(input: &str) -> SceneResult<Self> {
        let config: Self =
            toml::from_str(input).map_err(|err| SceneError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SceneResult<String> {
        toml::to_string_pretty(self).map_err(|err| SceneError::Config(err.to_string()))
    }

    /// Reads a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> SceneResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn save_to(&self, path: &Path) -> SceneResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
