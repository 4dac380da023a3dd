use crate::error::{SceneError, SceneResult};

/// Upper bounds enforced while loading a scene script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadLimits {
    pub max_script_bytes: usize,
    pub max_actors: usize,
    pub max_commands: usize,
    pub max_text_length: usize,
    pub max_id_length: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_script_bytes: 4 * 1024 * 1024,
            max_actors: 256,
            max_commands: 65_536,
            max_text_length: 4_096,
            max_id_length: 256,
        }
    }
}

impl LoadLimits {
    pub(crate) fn check_script_bytes(&self, len: usize) -> SceneResult<()> {
        if len > self.max_script_bytes {
            return Err(SceneError::ResourceLimit(format!(
                "script is {len} bytes, limit is {}",
                self.max_script_bytes
            )));
        }
        Ok(())
    }

    pub(crate) fn check_count(&self, what: &str, count: usize, max: usize) -> SceneResult<()> {
        if count > max {
            return Err(SceneError::ResourceLimit(format!(
                "{what} count {count} exceeds {max}"
            )));
        }
        Ok(())
    }

    pub(crate) fn check_id(&self, field: &str, id: &str) -> SceneResult<()> {
        if id.len() > self.max_id_length {
            return Err(SceneError::ResourceLimit(format!(
                "id at `{field}` longer than {} bytes",
                self.max_id_length
            )));
        }
        Ok(())
    }

    pub(crate) fn check_text(&self, field: &str, text: &str) -> SceneResult<()> {
        if text.len() > self.max_text_length {
            return Err(SceneError::ResourceLimit(format!(
                "text at `{field}` longer than {} bytes",
                self.max_text_length
            )));
        }
        Ok(())
    }
}
