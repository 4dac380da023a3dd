//! Presentation seam between playback and the host's renderer.

use crate::script::{Actor, CellRect, Vec2};

/// Side effect emitted while commands are dispatched.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationCommand {
    ShowBackground(String),
    ClearBackground,
    PlayMusic(String),
    StopMusic,
    /// The sprite at this pool index changed.
    SpriteChanged(usize),
}

/// Host presentation layer.
pub trait Presenter {
    fn show_background(&mut self, image: &str);
    fn clear_background(&mut self);
    fn play_music(&mut self, track: &str);
    fn stop_music(&mut self);
    fn update_sprite(&mut self, _sprite: &SpriteView<'_>) {}
}

/// A portrait cell of an actor's sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortraitView<'a> {
    pub sheet: &'a str,
    pub cell: CellRect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteView<'a> {
    pub id: &'a str,
    pub visible: bool,
    pub pos: Vec2,
    pub size: Vec2,
    pub portrait: Option<PortraitView<'a>>,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameView<'a> {
    pub background: Option<&'a str>,
    pub music: Option<&'a str>,
    /// Set only while a line is on screen.
    pub speaker: Option<&'a Actor>,
    pub portrait: Option<PortraitView<'a>>,
    pub text: Option<&'a str>,
    pub sprites: Vec<SpriteView<'a>>,
}

/// Rendered text output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutput {
    pub text: String,
}

/// Headless presenter that records calls as text lines.
#[derive(Clone, Debug, Default)]
pub struct TranscriptPresenter {
    pub lines: Vec<String>,
}

impl TranscriptPresenter {
    /// Formats a frame as plain text.
    pub fn render(&self, frame: &FrameView<'_>) -> RenderOutput {
        let mut lines = Vec::new();
        if let Some(background) = frame.background {
            lines.push(format!("Background: {background}"));
        }
        if let Some(music) = frame.music {
            lines.push(format!("Music: {music}"));
        }
        let shown = frame
            .sprites
            .iter()
            .map(|sprite| sprite.id)
            .collect::<Vec<_>>();
        if !shown.is_empty() {
            lines.push(format!("Sprites: {}", shown.join(", ")));
        }
        if let Some(text) = frame.text {
            match frame.speaker {
                Some(actor) => lines.push(format!("{}: {text}", actor.name)),
                None => lines.push(text.to_string()),
            }
        }
        RenderOutput {
            text: lines.join("\n"),
        }
    }
}

impl Presenter for TranscriptPresenter {
    fn show_background(&mut self, image: &str) {
        self.lines.push(format!("show background {image}"));
    }

    fn clear_background(&mut self) {
        self.lines.push("clear background".to_string());
    }

    fn play_music(&mut self, track: &str) {
        self.lines.push(format!("play music {track}"));
    }

    fn stop_music(&mut self) {
        self.lines.push("stop music".to_string());
    }

    fn update_sprite(&mut self, sprite: &SpriteView<'_>) {
        let verb = if sprite.visible { "show" } else { "hide" };
        self.lines.push(format!(
            "{verb} sprite {} at ({}, {})",
            sprite.id, sprite.pos.x, sprite.pos.y
        ));
    }
}
