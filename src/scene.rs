//! Scene files: a story script wrapped with title, opening background and music.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::assets::AssetRequirements;
use crate::error::{SceneError, SceneResult};
use crate::script::{parse_json, Fields, ScriptDocument, ScriptLoader};

const STORY_TYPE: &str = "story";
const FIELD_TYPE: &str = "field";

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub name: String,
    pub title: String,
    pub background: Option<String>,
    pub music: Option<String>,
    /// Name of the scene that follows this one.
    pub next: Option<String>,
    pub story: ScriptDocument,
}

impl Scene {
    pub fn load(name: &str, value: &Value) -> SceneResult<Self> {
        Self::load_with(&ScriptLoader::default(), name, value)
    }

    #[instrument(level = "debug", skip(loader, value))]
    pub fn load_with(loader: &ScriptLoader, name: &str, value: &Value) -> SceneResult<Self> {
        let fields = Fields::of(value, "")?;
        let title = match fields.optional_str("title")? {
            Some(title) => title.to_string(),
            None => {
                warn!(scene = name, "scene has no title, falling back to its name");
                name.to_string()
            }
        };
        let background = non_empty(fields.optional_str("background")?);
        let music = non_empty(fields.optional_str("music")?);
        let next = non_empty(fields.optional_str("next")?);

        let kind = fields.require_str("type")?;
        if kind.eq_ignore_ascii_case(FIELD_TYPE) {
            return Err(SceneError::UnsupportedScene(kind.to_string()));
        }
        if !kind.eq_ignore_ascii_case(STORY_TYPE) {
            return Err(SceneError::validation(
                "type",
                format!("unknown scene type `{kind}`"),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            title,
            background,
            music,
            next,
            story: loader.load(value)?,
        })
    }

    pub fn from_json_str(name: &str, input: &str) -> SceneResult<Self> {
        let loader = ScriptLoader::default();
        loader.limits().check_script_bytes(input.len())?;
        Self::load_with(&loader, name, &parse_json(input)?)
    }

    /// Loads a scene file; the scene is named after the file stem.
    pub fn load_file(path: &Path) -> SceneResult<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&name, &raw)
    }

    pub fn to_json_value(&self) -> SceneResult<Value> {
        let mut object = Map::new();
        object.insert("title".to_string(), Value::from(self.title.as_str()));
        for (key, value) in [
            ("background", &self.background),
            ("music", &self.music),
            ("next", &self.next),
        ] {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::from(value.as_str()));
            }
        }
        object.insert("type".to_string(), Value::from(STORY_TYPE));
        if let Value::Object(story) = self.story.to_json_value()? {
            object.extend(story);
        }
        Ok(Value::Object(object))
    }

    /// Story assets plus the opening background and music.
    pub fn required_assets(&self) -> AssetRequirements {
        let mut requirements = self.story.required_assets();
        if let Some(background) = &self.background {
            requirements.add_texture(background);
        }
        if let Some(music) = &self.music {
            requirements.add_music(music);
        }
        requirements
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}
