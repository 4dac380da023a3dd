//! In-memory story scene model.
//!
//! # Contracts
//! - **Invariant**: actor ids are unique.
//! - **Invariant**: pools never hold duplicate names and keep first-seen order.
//! - **Invariant**: every index stored in a command resolves inside this document,
//!   and portrait cells lie inside the referenced actor's sheet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assets::AssetRequirements;
use crate::error::{RefKind, SceneError, SceneResult};

/// Two-component vector used for sprite position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Grid layout of an actor's sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSize {
    pub columns: u32,
    pub rows: u32,
}

/// Normalized texture rectangle of one sheet cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

impl SheetSize {
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// `None` when the grid has more cells than a `u32` can address.
    pub fn checked_cell_count(&self) -> Option<u32> {
        self.columns.checked_mul(self.rows)
    }

    pub fn cell_count(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Linearizes a `(column, row)` cell as `row * columns + column`.
    pub fn cell_index(&self, column: u32, row: u32) -> Option<u32> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        row.checked_mul(self.columns)?.checked_add(column)
    }

    /// Inverse of [`SheetSize::cell_index`].
    pub fn cell_coords(&self, index: u32) -> Option<(u32, u32)> {
        if self.columns == 0 || index >= self.cell_count() {
            return None;
        }
        Some((index % self.columns, index / self.columns))
    }

    pub fn cell_rect(&self, index: u32) -> Option<CellRect> {
        let (column, row) = self.cell_coords(index)?;
        let width = 1.0 / self.columns as f32;
        let height = 1.0 / self.rows as f32;
        Some(CellRect {
            u: column as f32 * width,
            v: row as f32 * height,
            width,
            height,
        })
    }
}

/// A character with a sprite sheet of portrait cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub sheet: String,
    pub sheet_size: SheetSize,
}

impl Actor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sheet: impl Into<String>,
        sheet_size: SheetSize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sheet: sheet.into(),
            sheet_size,
        }
    }
}

/// Sprite pool entry. Created from sprite command ids, never authored directly.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub id: String,
    pub visible: bool,
    pub pos: Vec2,
    pub size: Vec2,
    pub actor: Option<usize>,
    pub portrait: Option<u32>,
}

impl Sprite {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: false,
            pos: Vec2::ZERO,
            size: Vec2::ONE,
            actor: None,
            portrait: None,
        }
    }
}

/// Three-valued background/music reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssetRef {
    /// Field absent: leave the current asset as is.
    #[default]
    Keep,
    /// Field present but empty: remove the current asset.
    Clear,
    /// Switch to the pool entry at this index.
    Set(usize),
}

impl AssetRef {
    pub fn index(&self) -> Option<usize> {
        match self {
            AssetRef::Set(index) => Some(*index),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpriteCommand {
    pub sprite: usize,
    pub hide: bool,
    pub actor: Option<usize>,
    pub portrait: Option<u32>,
    pub pos: Option<Vec2>,
    pub size: Option<Vec2>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeakCommand {
    pub actor: Option<usize>,
    pub portrait: Option<u32>,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaitCommand {
    pub duration: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackgroundCommand {
    pub image: AssetRef,
    pub music: AssetRef,
}

/// One step of the script, decided once at load time.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Sprite(SpriteCommand),
    Speak(SpeakCommand),
    Wait(WaitCommand),
    Background(BackgroundCommand),
}

impl Command {
    /// JSON key naming this command variant.
    pub fn key(&self) -> &'static str {
        match self {
            Command::Sprite(_) => "sprite",
            Command::Speak(_) => "speak",
            Command::Wait(_) => "wait",
            Command::Background(_) => "background",
        }
    }
}

/// Entry type stored in a [`Pool`], keyed by its symbolic name.
pub trait PoolEntry {
    fn key(&self) -> &str;
    fn from_key(key: &str) -> Self;
}

impl PoolEntry for String {
    fn key(&self) -> &str {
        self
    }

    fn from_key(key: &str) -> Self {
        key.to_string()
    }
}

impl PoolEntry for Sprite {
    fn key(&self) -> &str {
        &self.id
    }

    fn from_key(key: &str) -> Self {
        Sprite::new(key)
    }
}

/// Deduplicated, insertion-ordered collection addressed by index.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool<T> {
    entries: Vec<T>,
    lookup: HashMap<String, usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T: PoolEntry> Pool<T> {
    /// Returns the index of `key`, appending a new entry on first sight.
    pub fn ensure(&mut self, key: &str) -> usize {
        if let Some(index) = self.lookup.get(key) {
            return *index;
        }
        let index = self.entries.len();
        self.entries.push(T::from_key(key));
        self.lookup.insert(key.to_string(), index);
        index
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.lookup.get(key).copied()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    pub fn key_of(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(PoolEntry::key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A story scene: cast, pools, and the ordered command sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptDocument {
    actors: Vec<Actor>,
    actor_lookup: HashMap<String, usize>,
    sprites: Pool<Sprite>,
    backgrounds: Pool<String>,
    music: Pool<String>,
    commands: Vec<Command>,
}

impl ScriptDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor, rejecting duplicate ids and empty sheets.
    pub fn add_actor(&mut self, actor: Actor) -> SceneResult<usize> {
        let field = format!("actors.{}", actor.id);
        if self.actor_lookup.contains_key(&actor.id) {
            return Err(SceneError::validation(field, "duplicate actor id"));
        }
        if actor.sheet.is_empty() {
            return Err(SceneError::validation(
                format!("{field}.sheet"),
                "expected non-empty string",
            ));
        }
        if actor.sheet_size.columns == 0 || actor.sheet_size.rows == 0 {
            return Err(SceneError::validation(
                format!("{field}.sheetSize"),
                "sheet dimensions must be positive",
            ));
        }
        if actor.sheet_size.checked_cell_count().is_none() {
            return Err(SceneError::validation(
                format!("{field}.sheetSize"),
                format!("sheet has more than {} cells", u32::MAX),
            ));
        }
        let index = self.actors.len();
        self.actor_lookup.insert(actor.id.clone(), index);
        self.actors.push(actor);
        Ok(index)
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actor_index(id).and_then(|index| self.actors.get(index))
    }

    pub fn actor_index(&self, id: &str) -> Option<usize> {
        self.actor_lookup.get(id).copied()
    }

    pub fn actor_at(&self, index: usize) -> Option<&Actor> {
        self.actors.get(index)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn ensure_sprite(&mut self, id: &str) -> usize {
        self.sprites.ensure(id)
    }

    pub fn ensure_background(&mut self, name: &str) -> usize {
        self.backgrounds.ensure(name)
    }

    pub fn ensure_music(&mut self, name: &str) -> usize {
        self.music.ensure(name)
    }

    pub fn sprite_index(&self, id: &str) -> Option<usize> {
        self.sprites.position(id)
    }

    pub fn background_index(&self, name: &str) -> Option<usize> {
        self.backgrounds.position(name)
    }

    pub fn music_index(&self, name: &str) -> Option<usize> {
        self.music.position(name)
    }

    pub fn sprites(&self) -> &Pool<Sprite> {
        &self.sprites
    }

    pub fn backgrounds(&self) -> &Pool<String> {
        &self.backgrounds
    }

    pub fn music(&self) -> &Pool<String> {
        &self.music
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Appends a command after checking that every reference resolves.
    pub fn push_command(&mut self, command: Command) -> SceneResult<()> {
        let field = format!("commands[{}]", self.commands.len());
        self.check_command(&command, &field)?;
        self.commands.push(command);
        Ok(())
    }

    pub fn insert_command(&mut self, at: usize, command: Command) -> SceneResult<()> {
        let field = format!("commands[{at}]");
        if at > self.commands.len() {
            return Err(SceneError::validation(field, "insert position out of range"));
        }
        self.check_command(&command, &field)?;
        self.commands.insert(at, command);
        Ok(())
    }

    /// Removes a command. Pool entries it referenced are kept.
    pub fn remove_command(&mut self, at: usize) -> Option<Command> {
        if at < self.commands.len() {
            Some(self.commands.remove(at))
        } else {
            None
        }
    }

    /// Sheet textures, background images, and music tracks the scene needs.
    pub fn required_assets(&self) -> AssetRequirements {
        let mut requirements = AssetRequirements::default();
        for actor in &self.actors {
            requirements.add_texture(&actor.sheet);
        }
        for background in self.backgrounds.iter() {
            requirements.add_texture(background);
        }
        for track in self.music.iter() {
            requirements.add_music(track);
        }
        requirements
    }

    /// Pushes a command the loader has already resolved.
    pub(crate) fn push_resolved(&mut self, command: Command) {
        self.commands.push(command);
    }

    fn check_command(&self, command: &Command, field: &str) -> SceneResult<()> {
        match command {
            Command::Sprite(sprite) => {
                if sprite.sprite >= self.sprites.len() {
                    return Err(SceneError::reference(
                        RefKind::Sprite,
                        format!("#{}", sprite.sprite),
                        format!("{field}.sprite.id"),
                    ));
                }
                for (key, value) in [("pos", sprite.pos), ("size", sprite.size)] {
                    if value.is_some_and(|value| !value.x.is_finite() || !value.y.is_finite()) {
                        return Err(SceneError::validation(
                            format!("{field}.sprite.{key}"),
                            "expected finite numbers",
                        ));
                    }
                }
                self.check_portrait(sprite.actor, sprite.portrait, &format!("{field}.sprite"))
            }
            Command::Speak(speak) => {
                self.check_portrait(speak.actor, speak.portrait, &format!("{field}.speak"))?;
                if speak.actor.is_none() {
                    return Err(SceneError::validation(
                        format!("{field}.speak.actor"),
                        "missing required field",
                    ));
                }
                Ok(())
            }
            Command::Wait(wait) => {
                if !wait.duration.is_finite() || wait.duration < 0.0 {
                    return Err(SceneError::validation(
                        format!("{field}.wait.time"),
                        "expected non-negative number",
                    ));
                }
                Ok(())
            }
            Command::Background(background) => {
                if let Some(index) = background.image.index() {
                    if index >= self.backgrounds.len() {
                        return Err(SceneError::reference(
                            RefKind::Background,
                            format!("#{index}"),
                            format!("{field}.background.image"),
                        ));
                    }
                }
                if let Some(index) = background.music.index() {
                    if index >= self.music.len() {
                        return Err(SceneError::reference(
                            RefKind::Music,
                            format!("#{index}"),
                            format!("{field}.background.music"),
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn check_portrait(
        &self,
        actor: Option<usize>,
        portrait: Option<u32>,
        field: &str,
    ) -> SceneResult<()> {
        let Some(actor_index) = actor else {
            if portrait.is_some() {
                return Err(SceneError::validation(
                    format!("{field}.portrait"),
                    "portrait requires an actor",
                ));
            }
            return Ok(());
        };
        let actor = self.actors.get(actor_index).ok_or_else(|| {
            SceneError::reference(
                RefKind::Actor,
                format!("#{actor_index}"),
                format!("{field}.actor"),
            )
        })?;
        if let Some(cell) = portrait {
            if cell >= actor.sheet_size.cell_count() {
                return Err(SceneError::validation(
                    format!("{field}.portrait"),
                    format!("cell {cell} outside sheet of actor `{}`", actor.id),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
