mod document;
mod fields;
mod loader;
mod raw;
mod serializer;

pub use document::{
    Actor, AssetRef, BackgroundCommand, CellRect, Command, Pool, PoolEntry, ScriptDocument,
    SheetSize, SpeakCommand, Sprite, SpriteCommand, Vec2, WaitCommand,
};
pub use loader::ScriptLoader;
pub use raw::{
    scene_schema, ActorRaw, BackgroundRaw, CommandRaw, SpeakRaw, SpriteRaw, StoryScriptRaw,
    WaitRaw,
};
pub use serializer::ScriptSerializer;

pub(crate) use fields::Fields;
pub(crate) use loader::parse_json;
