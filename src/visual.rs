//! Visible state produced by playback.

use crate::script::{ScriptDocument, Sprite, SpriteCommand, Vec2};

/// Runtime state of one sprite pool entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteState {
    pub visible: bool,
    pub pos: Vec2,
    pub size: Vec2,
    pub actor: Option<usize>,
    pub portrait: Option<u32>,
}

impl From<&Sprite> for SpriteState {
    fn from(sprite: &Sprite) -> Self {
        Self {
            visible: sprite.visible,
            pos: sprite.pos,
            size: sprite.size,
            actor: sprite.actor,
            portrait: sprite.portrait,
        }
    }
}

impl SpriteState {
    pub(crate) fn apply(&mut self, command: &SpriteCommand) {
        self.visible = !command.hide;
        if let Some(actor) = command.actor {
            if self.actor != Some(actor) {
                self.portrait = None;
            }
            self.actor = Some(actor);
        }
        if let Some(portrait) = command.portrait {
            self.portrait = Some(portrait);
        }
        if let Some(pos) = command.pos {
            self.pos = pos;
        }
        if let Some(size) = command.size {
            self.size = size;
        }
    }
}

/// The dialogue line currently latched, with its reveal counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueLine {
    text: String,
    char_count: usize,
    revealed: usize,
}

impl DialogueLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            char_count: text.chars().count(),
            text,
            revealed: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters currently shown.
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn is_complete(&self) -> bool {
        self.revealed >= self.char_count
    }

    /// Shown prefix, always cut on a character boundary.
    pub fn revealed_text(&self) -> &str {
        match self.text.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub(crate) fn reveal_one(&mut self) {
        if !self.is_complete() {
            self.revealed += 1;
        }
    }

    pub(crate) fn reveal_all(&mut self) {
        self.revealed = self.char_count;
    }
}

/// Current visual state for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualState {
    pub background: Option<String>,
    pub music: Option<String>,
    pub speaker: Option<usize>,
    pub portrait: Option<u32>,
    pub line: Option<DialogueLine>,
    pub sprites: Vec<SpriteState>,
}

impl VisualState {
    /// Starting state: nothing shown, sprites at their pool defaults.
    pub fn for_document(document: &ScriptDocument) -> Self {
        Self {
            sprites: document.sprites().iter().map(SpriteState::from).collect(),
            ..Self::default()
        }
    }

    pub fn revealed_text(&self) -> Option<&str> {
        self.line.as_ref().map(DialogueLine::revealed_text)
    }
}
