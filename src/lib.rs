//! Story scene scripts for visual novels: loading, saving, and playback.
//!
//! A scene script declares a cast of actors, and an ordered list of commands
//! (show or move a sprite, speak a line, wait, change background or music).
//! [`ScriptLoader`] turns the JSON form into a [`ScriptDocument`] with every
//! symbolic id resolved, [`ScriptSerializer`] writes it back, and
//! [`PlaybackEngine`] plays it frame by frame.

mod assets;
mod config;
mod engine;
mod error;
mod render;
mod resource;
mod scene;
mod script;
mod visual;

pub use assets::{preload, AssetRequirements, ResourceLoader};
pub use config::{PlaybackConfig, RevealAdvance, DEFAULT_CHAR_INTERVAL};
pub use engine::{AdvanceOutcome, Advisory, PlaybackEngine, PlaybackState, TickStatus};
pub use error::{RefKind, SceneError, SceneResult};
pub use render::{
    FrameView, PortraitView, PresentationCommand, Presenter, RenderOutput, SpriteView,
    TranscriptPresenter,
};
pub use resource::LoadLimits;
pub use scene::Scene;
pub use script::{
    scene_schema, Actor, ActorRaw, AssetRef, BackgroundCommand, BackgroundRaw, CellRect, Command,
    CommandRaw, Pool, PoolEntry, ScriptDocument, ScriptLoader, ScriptSerializer, SheetSize,
    SpeakCommand, SpeakRaw, Sprite, SpriteCommand, SpriteRaw, StoryScriptRaw, Vec2, WaitCommand,
    WaitRaw,
};
pub use visual::{DialogueLine, SpriteState, VisualState};

/// Loads a story script from a parsed JSON value.
pub fn load(value: &serde_json::Value) -> SceneResult<ScriptDocument> {
    ScriptLoader::default().load(value)
}

/// Converts a document back into its JSON value.
pub fn serialize(document: &ScriptDocument) -> SceneResult<serde_json::Value> {
    ScriptSerializer.serialize(document)
}
