//! Writes a [`ScriptDocument`] back to the persisted JSON shape.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{RefKind, SceneError, SceneResult};
use crate::script::document::{
    Actor, AssetRef, BackgroundCommand, Command, Pool, ScriptDocument, SpeakCommand,
    SpriteCommand, Vec2,
};
use crate::script::raw::{
    ActorRaw, BackgroundRaw, CommandRaw, SpeakRaw, SpriteRaw, StoryScriptRaw, WaitRaw,
};

/// Restores symbolic ids from pool indices.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptSerializer;

impl ScriptSerializer {
    pub fn to_raw(&self, document: &ScriptDocument) -> SceneResult<StoryScriptRaw> {
        let actors = document
            .actors()
            .iter()
            .map(|actor| {
                (
                    actor.id.clone(),
                    ActorRaw {
                        name: actor.name.clone(),
                        sheet: actor.sheet.clone(),
                        sheet_size: [actor.sheet_size.columns, actor.sheet_size.rows],
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        let commands = document
            .commands()
            .iter()
            .enumerate()
            .map(|(index, command)| command_raw(document, index, command))
            .collect::<SceneResult<Vec<_>>>()?;
        Ok(StoryScriptRaw { actors, commands })
    }

    pub fn serialize(&self, document: &ScriptDocument) -> SceneResult<Value> {
        let raw = self.to_raw(document)?;
        serde_json::to_value(&raw).map_err(|err| serialization_error(&err))
    }

    pub fn to_json_string(&self, document: &ScriptDocument) -> SceneResult<String> {
        let raw = self.to_raw(document)?;
        serde_json::to_string_pretty(&raw).map_err(|err| serialization_error(&err))
    }
}

impl ScriptDocument {
    pub fn to_json_value(&self) -> SceneResult<Value> {
        ScriptSerializer.serialize(self)
    }

    pub fn to_json_string(&self) -> SceneResult<String> {
        ScriptSerializer.to_json_string(self)
    }
}

fn command_raw(
    document: &ScriptDocument,
    index: usize,
    command: &Command,
) -> SceneResult<CommandRaw> {
    let field = format!("commands[{index}]");
    let raw = match command {
        Command::Sprite(sprite) => CommandRaw::Sprite(sprite_raw(document, &field, sprite)?),
        Command::Speak(speak) => CommandRaw::Speak(speak_raw(document, &field, speak)?),
        Command::Wait(wait) => CommandRaw::Wait(WaitRaw {
            time: wait.duration,
        }),
        Command::Background(background) => {
            CommandRaw::Background(background_raw(document, &field, background)?)
        }
    };
    Ok(raw)
}

fn sprite_raw(
    document: &ScriptDocument,
    field: &str,
    command: &SpriteCommand,
) -> SceneResult<SpriteRaw> {
    let id = document
        .sprites()
        .key_of(command.sprite)
        .ok_or_else(|| dangling(RefKind::Sprite, command.sprite, field))?;
    let actor = command
        .actor
        .map(|index| actor_at(document, index, field))
        .transpose()?;
    Ok(SpriteRaw {
        id: id.to_string(),
        hide: command.hide,
        actor: actor.map(|actor| actor.id.clone()),
        portrait: portrait_raw(actor, command.portrait),
        pos: command.pos.map(vec2_raw),
        size: command.size.map(vec2_raw),
    })
}

fn speak_raw(
    document: &ScriptDocument,
    field: &str,
    command: &SpeakCommand,
) -> SceneResult<SpeakRaw> {
    let actor = match command.actor {
        Some(index) => actor_at(document, index, field)?,
        None => {
            return Err(SceneError::validation(
                format!("{field}.speak.actor"),
                "speak command has no actor",
            ))
        }
    };
    Ok(SpeakRaw {
        actor: actor.id.clone(),
        text: command.text.clone(),
        portrait: portrait_raw(Some(actor), command.portrait),
    })
}

fn background_raw(
    document: &ScriptDocument,
    field: &str,
    command: &BackgroundCommand,
) -> SceneResult<BackgroundRaw> {
    Ok(BackgroundRaw {
        image: asset_raw(document.backgrounds(), command.image, RefKind::Background, field)?,
        music: asset_raw(document.music(), command.music, RefKind::Music, field)?,
    })
}

fn asset_raw(
    pool: &Pool<String>,
    reference: AssetRef,
    kind: RefKind,
    field: &str,
) -> SceneResult<Option<String>> {
    match reference {
        AssetRef::Keep => Ok(None),
        AssetRef::Clear => Ok(Some(String::new())),
        AssetRef::Set(index) => pool
            .key_of(index)
            .map(|name| Some(name.to_string()))
            .ok_or_else(|| dangling(kind, index, field)),
    }
}

fn actor_at<'d>(document: &'d ScriptDocument, index: usize, field: &str) -> SceneResult<&'d Actor> {
    document
        .actor_at(index)
        .ok_or_else(|| dangling(RefKind::Actor, index, field))
}

/// Splits a linear cell back into `[x, y]` using the actor's column count.
fn portrait_raw(actor: Option<&Actor>, portrait: Option<u32>) -> Option<[u32; 2]> {
    let (column, row) = actor?.sheet_size.cell_coords(portrait?)?;
    Some([column, row])
}

fn vec2_raw(value: Vec2) -> [f32; 2] {
    [value.x, value.y]
}

fn dangling(kind: RefKind, index: usize, field: &str) -> SceneError {
    SceneError::reference(kind, format!("#{index}"), field)
}

#[cold]
#[inline(never)]
fn serialization_error(err: &serde_json::Error) -> SceneError {
    SceneError::Syntax {
        message: err.to_string(),
        src: String::new(),
        span: (0, 0).into(),
    }
}
