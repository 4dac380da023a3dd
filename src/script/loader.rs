//! Builds a [`ScriptDocument`] from the persisted JSON shape.
//!
//! Loading runs three passes over `commands`: sprite ids first, then
//! background and music names, then the commands themselves. Pools are
//! therefore complete before any command is resolved against them. A load
//! either returns a finished document or an error naming the offending field.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{RefKind, SceneError, SceneResult};
use crate::resource::LoadLimits;
use crate::script::document::{
    Actor, AssetRef, BackgroundCommand, Command, ScriptDocument, SheetSize, SpeakCommand,
    SpriteCommand, WaitCommand,
};
use crate::script::fields::Fields;

const COMMAND_KEYS: [&str; 4] = ["sprite", "speak", "wait", "background"];

/// Converts JSON values into script documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptLoader {
    limits: LoadLimits,
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: LoadLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> LoadLimits {
        self.limits
    }

    /// Parses JSON text and loads it.
    pub fn load_str(&self, input: &str) -> SceneResult<ScriptDocument> {
        self.limits.check_script_bytes(input.len())?;
        let value = parse_json(input)?;
        self.load(&value)
    }

    /// Loads a story script from an already parsed JSON value.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&self, root: &Value) -> SceneResult<ScriptDocument> {
        let root = Fields::of(root, "")?;
        let actors = root.require("actors")?;
        let commands = root
            .require("commands")?
            .as_array()
            .ok_or_else(|| SceneError::validation("commands", "expected array"))?;
        self.limits
            .check_count("command", commands.len(), self.limits.max_commands)?;

        let mut document = ScriptDocument::new();
        self.load_actors(&mut document, actors)?;
        self.collect_sprites(&mut document, commands)?;
        self.collect_backgrounds(&mut document, commands)?;
        for (index, command) in commands.iter().enumerate() {
            let resolved = self.resolve_command(&document, index, command)?;
            document.push_resolved(resolved);
        }

        debug!(
            actors = document.actors().len(),
            sprites = document.sprites().len(),
            backgrounds = document.backgrounds().len(),
            music = document.music().len(),
            commands = document.commands().len(),
            "loaded story script"
        );
        Ok(document)
    }

    /// Replaces `document` with a fresh load under these limits.
    ///
    /// On failure `document` is left exactly as it was.
    pub fn reload_into(&self, document: &mut ScriptDocument, root: &Value) -> SceneResult<()> {
        *document = self.load(root)?;
        Ok(())
    }

    fn load_actors(&self, document: &mut ScriptDocument, actors: &Value) -> SceneResult<()> {
        let actors = Fields::of(actors, "actors")?.object();
        self.limits
            .check_count("actor", actors.len(), self.limits.max_actors)?;
        for (id, value) in actors {
            let path = format!("actors.{id}");
            self.limits.check_id(&path, id)?;
            let fields = Fields::of(value, &path)?;
            let name = fields.require_str("name")?;
            let sheet = fields.require_str("sheet")?;
            if sheet.is_empty() {
                return Err(SceneError::validation(
                    fields.path("sheet"),
                    "expected non-empty string",
                ));
            }
            let (columns, rows) = fields
                .optional_uint_pair("sheetSize", 1)?
                .ok_or_else(|| {
                    SceneError::validation(fields.path("sheetSize"), "missing required field")
                })?;
            document.add_actor(Actor::new(
                id.as_str(),
                name,
                sheet,
                SheetSize::new(columns, rows),
            ))?;
        }
        Ok(())
    }

    /// First pass: distinct sprite ids, in first-seen order.
    fn collect_sprites(&self, document: &mut ScriptDocument, commands: &[Value]) -> SceneResult<()> {
        for (index, command) in commands.iter().enumerate() {
            let path = format!("commands[{index}]");
            let fields = Fields::of(command, &path)?;
            let Some(sprite) = fields.get("sprite") else {
                continue;
            };
            let sprite_path = fields.path("sprite");
            let sprite = Fields::of(sprite, &sprite_path)?;
            let id = sprite.require_str("id")?;
            self.limits.check_id(&sprite.path("id"), id)?;
            document.ensure_sprite(id);
        }
        Ok(())
    }

    /// Second pass: distinct background images and music tracks.
    ///
    /// Empty names mean "clear" and never enter a pool.
    fn collect_backgrounds(
        &self,
        document: &mut ScriptDocument,
        commands: &[Value],
    ) -> SceneResult<()> {
        for (index, command) in commands.iter().enumerate() {
            let path = format!("commands[{index}]");
            let fields = Fields::of(command, &path)?;
            let Some(background) = fields.get("background") else {
                continue;
            };
            let background_path = fields.path("background");
            let background = Fields::of(background, &background_path)?;
            if let Some(image) = background.optional_str("image")? {
                if !image.is_empty() {
                    self.limits.check_id(&background.path("image"), image)?;
                    document.ensure_background(image);
                }
            }
            if let Some(music) = background.optional_str("music")? {
                if !music.is_empty() {
                    self.limits.check_id(&background.path("music"), music)?;
                    document.ensure_music(music);
                }
            }
        }
        Ok(())
    }

    fn resolve_command(
        &self,
        document: &ScriptDocument,
        index: usize,
        command: &Value,
    ) -> SceneResult<Command> {
        let path = format!("commands[{index}]");
        let fields = Fields::of(command, &path)?;
        let mut tagged = COMMAND_KEYS
            .iter()
            .filter_map(|key| fields.get(key).map(|body| (*key, body)));
        let (key, body) = match (tagged.next(), tagged.next()) {
            (Some(single), None) => single,
            (None, _) => {
                return Err(SceneError::validation(
                    &path,
                    format!("invalid command {index}: expected one of sprite, speak, wait, background"),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(SceneError::validation(
                    &path,
                    format!("invalid command {index}: more than one command kind present"),
                ))
            }
        };

        let body_path = fields.path(key);
        let body = Fields::of(body, &body_path)?;
        let command = match key {
            "sprite" => Command::Sprite(self.resolve_sprite(document, &body)?),
            "speak" => Command::Speak(self.resolve_speak(document, &body)?),
            "wait" => Command::Wait(resolve_wait(&body)?),
            _ => Command::Background(resolve_background(document, &body)?),
        };
        Ok(command)
    }

    fn resolve_sprite(
        &self,
        document: &ScriptDocument,
        fields: &Fields<'_>,
    ) -> SceneResult<SpriteCommand> {
        let id = fields.require_str("id")?;
        let sprite = document
            .sprite_index(id)
            .ok_or_else(|| SceneError::reference(RefKind::Sprite, id, fields.path("id")))?;
        let actor = match fields.optional_str("actor")? {
            Some(actor_id) => Some(resolve_actor(document, fields, actor_id)?),
            None => None,
        };
        Ok(SpriteCommand {
            sprite,
            hide: fields.optional_bool("hide")?.unwrap_or(false),
            actor,
            portrait: resolve_portrait(document, fields, actor)?,
            pos: fields.optional_vec2("pos")?,
            size: fields.optional_vec2("size")?,
        })
    }

    fn resolve_speak(
        &self,
        document: &ScriptDocument,
        fields: &Fields<'_>,
    ) -> SceneResult<SpeakCommand> {
        let actor_id = fields.require_str("actor")?;
        let actor = resolve_actor(document, fields, actor_id)?;
        let text = fields.optional_str("text")?.unwrap_or_default();
        self.limits.check_text(&fields.path("text"), text)?;
        Ok(SpeakCommand {
            actor: Some(actor),
            portrait: resolve_portrait(document, fields, Some(actor))?,
            text: text.to_string(),
        })
    }
}

fn resolve_actor(document: &ScriptDocument, fields: &Fields<'_>, id: &str) -> SceneResult<usize> {
    document
        .actor_index(id)
        .ok_or_else(|| SceneError::reference(RefKind::Actor, id, fields.path("actor")))
}

/// Linearizes `portrait: [x, y]` against the actor's column count.
fn resolve_portrait(
    document: &ScriptDocument,
    fields: &Fields<'_>,
    actor: Option<usize>,
) -> SceneResult<Option<u32>> {
    let Some((column, row)) = fields.optional_uint_pair("portrait", 0)? else {
        return Ok(None);
    };
    let path = fields.path("portrait");
    let actor = actor
        .and_then(|index| document.actor_at(index))
        .ok_or_else(|| SceneError::validation(&path, "portrait requires an actor"))?;
    let sheet = actor.sheet_size;
    sheet.cell_index(column, row).map(Some).ok_or_else(|| {
        SceneError::validation(
            &path,
            format!(
                "cell [{column}, {row}] outside the {}x{} sheet of actor `{}`",
                sheet.columns, sheet.rows, actor.id
            ),
        )
    })
}

fn resolve_wait(fields: &Fields<'_>) -> SceneResult<WaitCommand> {
    let time = fields.require_f32("time")?;
    if time < 0.0 {
        return Err(SceneError::validation(
            fields.path("time"),
            "expected non-negative number",
        ));
    }
    Ok(WaitCommand { duration: time })
}

fn resolve_background(
    document: &ScriptDocument,
    fields: &Fields<'_>,
) -> SceneResult<BackgroundCommand> {
    let image = resolve_asset(fields, "image", RefKind::Background, |name| {
        document.background_index(name)
    })?;
    let music = resolve_asset(fields, "music", RefKind::Music, |name| {
        document.music_index(name)
    })?;
    Ok(BackgroundCommand { image, music })
}

fn resolve_asset(
    fields: &Fields<'_>,
    key: &str,
    kind: RefKind,
    lookup: impl Fn(&str) -> Option<usize>,
) -> SceneResult<AssetRef> {
    match fields.optional_str(key)? {
        None => Ok(AssetRef::Keep),
        Some("") => Ok(AssetRef::Clear),
        Some(name) => lookup(name)
            .map(AssetRef::Set)
            .ok_or_else(|| SceneError::reference(kind, name, fields.path(key))),
    }
}

impl ScriptDocument {
    /// Parses and loads a story script from JSON text with default limits.
    pub fn from_json_str(input: &str) -> SceneResult<Self> {
        ScriptLoader::default().load_str(input)
    }

    /// Loads a story script from a parsed JSON value with default limits.
    pub fn from_json_value(value: &Value) -> SceneResult<Self> {
        ScriptLoader::default().load(value)
    }

    /// Replaces this document with a freshly loaded one, using default limits.
    ///
    /// See [`ScriptLoader::reload_into`] to keep custom limits.
    pub fn reload(&mut self, value: &Value) -> SceneResult<()> {
        ScriptLoader::default().reload_into(self, value)
    }
}

/// Parses JSON text, reporting syntax errors with a source span.
pub(crate) fn parse_json(input: &str) -> SceneResult<Value> {
    serde_json::from_str(input).map_err(|err| json_syntax_error(input, &err))
}

#[cold]
#[inline(never)]
fn json_syntax_error(input: &str, err: &serde_json::Error) -> SceneError {
    let (offset, length) = json_error_span(input, err);
    let (window, local_offset) = json_error_window(input, offset, length);
    let max_len = window.len().saturating_sub(local_offset);
    let span_len = if max_len == 0 { 0 } else { length.min(max_len) };
    SceneError::Syntax {
        message: err.to_string(),
        src: window,
        span: (local_offset, span_len).into(),
    }
}

#[cold]
#[inline(never)]
fn json_error_span(input: &str, error: &serde_json::Error) -> (usize, usize) {
    let line = error.line();
    let column = error.column();
    if line == 0 || column == 0 {
        return (0, 1);
    }
    let mut offset = 0usize;
    for (current_line, chunk) in input.split_inclusive('\n').enumerate() {
        if current_line + 1 == line {
            let byte_index = chunk
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(idx, _)| idx)
                .unwrap_or(chunk.len().saturating_sub(1));
            return (offset + byte_index, 1);
        }
        offset += chunk.len();
    }
    (input.len().saturating_sub(1), 1)
}

#[cold]
#[inline(never)]
fn json_error_window(input: &str, offset: usize, length: usize) -> (String, usize) {
    const CONTEXT: usize = 160;
    let mut start = offset.saturating_sub(CONTEXT);
    let mut end = (offset + length + CONTEXT).min(input.len());
    while start > 0 && !input.is_char_boundary(start) {
        start -= 1;
    }
    while end < input.len() && !input.is_char_boundary(end) {
        end += 1;
    }
    (input[start..end].to_string(), offset.saturating_sub(start))
}
