use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// JSON-facing story script with symbolic ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoryScriptRaw {
    pub actors: BTreeMap<String, ActorRaw>,
    pub commands: Vec<CommandRaw>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActorRaw {
    pub name: String,
    pub sheet: String,
    /// `[columns, rows]`.
    pub sheet_size: [u32; 2],
}

/// Exactly one command kind per element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommandRaw {
    Sprite(SpriteRaw),
    Speak(SpeakRaw),
    Wait(WaitRaw),
    Background(BackgroundRaw),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpriteRaw {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[f32; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpeakRaw {
    pub actor: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<[u32; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WaitRaw {
    pub time: f32,
}

/// An empty string clears the image or stops the music.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundRaw {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// JSON Schema of the persisted story script.
pub fn scene_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(StoryScriptRaw)
}
