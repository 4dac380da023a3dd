//! Resource requirements handed to the host's loader before playback.

use tracing::{debug, instrument};

use crate::error::{SceneError, SceneResult};

/// Assets a scene needs, deduplicated in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetRequirements {
    pub textures: Vec<String>,
    pub music: Vec<String>,
}

impl AssetRequirements {
    pub fn add_texture(&mut self, path: &str) {
        if !path.is_empty() && !self.textures.iter().any(|known| known == path) {
            self.textures.push(path.to_string());
        }
    }

    pub fn add_music(&mut self, track: &str) {
        if !track.is_empty() && !self.music.iter().any(|known| known == track) {
            self.music.push(track.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.music.is_empty()
    }
}

/// Host collaborator that resolves texture and audio paths.
pub trait ResourceLoader {
    fn load_texture(&mut self, path: &str) -> Result<(), String>;
    fn load_music(&mut self, track: &str) -> Result<(), String>;
}

/// Resolves every requirement, stopping at the first failure.
#[instrument(level = "debug", skip_all)]
pub fn preload<L: ResourceLoader>(
    requirements: &AssetRequirements,
    loader: &mut L,
) -> SceneResult<()> {
    for path in &requirements.textures {
        loader.load_texture(path).map_err(|message| SceneError::Resource {
            path: path.clone(),
            message,
        })?;
    }
    for track in &requirements.music {
        loader.load_music(track).map_err(|message| SceneError::Resource {
            path: track.clone(),
            message,
        })?;
    }
    debug!(
        textures = requirements.textures.len(),
        music = requirements.music.len(),
        "scene assets resolved"
    );
    Ok(())
}
