//! Polled playback of a story script.
//!
//! The host calls [`PlaybackEngine::tick`] once per frame with the elapsed
//! time and [`PlaybackEngine::advance`] when the player asks for the next line.
//! All timers run on the supplied delta time only.

use tracing::{debug, info, instrument, trace, warn};

use crate::config::{PlaybackConfig, RevealAdvance};
use crate::error::SceneResult;
use crate::render::{FrameView, PortraitView, PresentationCommand, Presenter, SpriteView};
use crate::scene::Scene;
use crate::script::{
    AssetRef, BackgroundCommand, Command, ScriptDocument, SpeakCommand, SpriteCommand,
};
use crate::visual::{DialogueLine, VisualState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    NotStarted,
    Executing,
    AwaitingTextReveal,
    AwaitingInput,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    Continuing,
    Finished,
}

/// Result of an advance signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Ignored,
    /// The line being revealed was completed at once.
    Completed,
    /// Moved past the current line.
    Advanced,
}

/// A non-fatal problem met during playback; the command was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advisory {
    pub command_index: usize,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct WaitTimer {
    duration: f32,
    elapsed: f32,
}

/// Executes a [`ScriptDocument`] against the host's presentation layer.
#[derive(Clone, Debug)]
pub struct PlaybackEngine {
    document: ScriptDocument,
    config: PlaybackConfig,
    state: PlaybackState,
    command_index: usize,
    wait: Option<WaitTimer>,
    reveal_timer: f32,
    visual: VisualState,
    pending: Vec<PresentationCommand>,
    advisories: Vec<Advisory>,
    opening_background: Option<String>,
    opening_music: Option<String>,
}

impl PlaybackEngine {
    pub fn new(document: ScriptDocument, config: PlaybackConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            visual: VisualState::for_document(&document),
            document,
            config,
            state: PlaybackState::NotStarted,
            command_index: 0,
            wait: None,
            reveal_timer: 0.0,
            pending: Vec::new(),
            advisories: Vec::new(),
            opening_background: None,
            opening_music: None,
        })
    }

    /// Plays a scene's story, showing its opening background and music on start.
    pub fn with_scene(scene: &Scene, config: PlaybackConfig) -> SceneResult<Self> {
        let mut engine = Self::new(scene.story.clone(), config)?;
        engine.opening_background = scene.background.clone();
        engine.opening_music = scene.music.clone();
        Ok(engine)
    }

    /// Resets playback to the first command.
    #[instrument(level = "debug", skip(self))]
    pub fn start(&mut self) {
        self.visual = VisualState::for_document(&self.document);
        self.pending.clear();
        self.advisories.clear();
        self.command_index = 0;
        self.wait = None;
        self.reveal_timer = 0.0;
        self.state = PlaybackState::Executing;
        if let Some(background) = self.opening_background.clone() {
            self.show_background(background);
        }
        if let Some(music) = self.opening_music.clone() {
            self.play_music(music);
        }
        info!(commands = self.document.commands().len(), "story playback started");
    }

    /// Runs one frame. Non-blocking commands are dispatched back to back, then
    /// `delta` feeds whichever timer is active.
    pub fn tick(&mut self, delta: f32) -> TickStatus {
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        };
        match self.state {
            PlaybackState::NotStarted => return TickStatus::Continuing,
            PlaybackState::Finished => return TickStatus::Finished,
            _ => {}
        }

        self.run_until_blocked();
        match self.state {
            PlaybackState::AwaitingTextReveal => self.reveal(delta),
            PlaybackState::Executing => self.wait_for(delta),
            _ => {}
        }
        self.status()
    }

    /// External "next" input.
    pub fn advance(&mut self) -> AdvanceOutcome {
        match self.state {
            PlaybackState::AwaitingInput => {
                self.visual.line = None;
                self.command_index += 1;
                if self.command_index >= self.document.commands().len() {
                    self.finish();
                } else {
                    self.state = PlaybackState::Executing;
                }
                AdvanceOutcome::Advanced
            }
            PlaybackState::AwaitingTextReveal => match self.config.reveal_advance {
                RevealAdvance::Ignore => AdvanceOutcome::Ignored,
                RevealAdvance::Complete => {
                    if let Some(line) = self.visual.line.as_mut() {
                        line.reveal_all();
                    }
                    self.reveal_timer = 0.0;
                    self.state = PlaybackState::AwaitingInput;
                    AdvanceOutcome::Completed
                }
            },
            _ => AdvanceOutcome::Ignored,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> TickStatus {
        if self.state == PlaybackState::Finished {
            TickStatus::Finished
        } else {
            TickStatus::Continuing
        }
    }

    pub fn command_index(&self) -> usize {
        self.command_index
    }

    /// True while a wait command is counting down.
    pub fn is_waiting(&self) -> bool {
        self.wait.is_some()
    }

    pub fn document(&self) -> &ScriptDocument {
        &self.document
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn visual_state(&self) -> &VisualState {
        &self.visual
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Takes the presentation side effects queued since the last call.
    pub fn drain_presentation(&mut self) -> Vec<PresentationCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Forwards queued side effects to a presenter.
    pub fn present_to<P: Presenter>(&mut self, presenter: &mut P) {
        for command in std::mem::take(&mut self.pending) {
            match command {
                PresentationCommand::ShowBackground(image) => presenter.show_background(&image),
                PresentationCommand::ClearBackground => presenter.clear_background(),
                PresentationCommand::PlayMusic(track) => presenter.play_music(&track),
                PresentationCommand::StopMusic => presenter.stop_music(),
                PresentationCommand::SpriteChanged(index) => {
                    if let Some(view) = self.sprite_view(index) {
                        presenter.update_sprite(&view);
                    }
                }
            }
        }
    }

    /// Per-frame query of what should be on screen.
    pub fn frame(&self) -> FrameView<'_> {
        let line = self.visual.line.as_ref();
        let speaker = line
            .and(self.visual.speaker)
            .and_then(|index| self.document.actor_at(index));
        let portrait = speaker.and_then(|actor| {
            let cell = actor.sheet_size.cell_rect(self.visual.portrait?)?;
            Some(PortraitView {
                sheet: actor.sheet.as_str(),
                cell,
            })
        });
        let sprites = (0..self.visual.sprites.len())
            .filter_map(|index| self.sprite_view(index))
            .filter(|sprite| sprite.visible)
            .collect();
        FrameView {
            background: self.visual.background.as_deref(),
            music: self.visual.music.as_deref(),
            speaker,
            portrait,
            text: line.map(DialogueLine::revealed_text),
            sprites,
        }
    }

    fn sprite_view(&self, index: usize) -> Option<SpriteView<'_>> {
        let state = self.visual.sprites.get(index)?;
        let id = self.document.sprites().key_of(index)?;
        let portrait = state
            .actor
            .and_then(|actor| self.document.actor_at(actor))
            .and_then(|actor| {
                let cell = actor.sheet_size.cell_rect(state.portrait?)?;
                Some(PortraitView {
                    sheet: actor.sheet.as_str(),
                    cell,
                })
            });
        Some(SpriteView {
            id,
            visible: state.visible,
            pos: state.pos,
            size: state.size,
            portrait,
        })
    }

    fn run_until_blocked(&mut self) {
        while self.state == PlaybackState::Executing && self.wait.is_none() {
            let Some(command) = self.document.commands().get(self.command_index).cloned() else {
                self.finish();
                return;
            };
            trace!(index = self.command_index, kind = command.key(), "dispatch");
            match command {
                Command::Background(background) => {
                    self.apply_background(&background);
                    self.command_index += 1;
                }
                Command::Sprite(sprite) => {
                    self.apply_sprite(&sprite);
                    self.command_index += 1;
                }
                Command::Wait(wait) => {
                    self.wait = Some(WaitTimer {
                        duration: wait.duration,
                        elapsed: 0.0,
                    });
                }
                Command::Speak(speak) => self.speak(speak),
            }
        }
    }

    fn speak(&mut self, command: SpeakCommand) {
        if let Some(actor) = command.actor {
            if self.visual.speaker != Some(actor) {
                self.visual.portrait = None;
            }
            self.visual.speaker = Some(actor);
        }
        if let Some(portrait) = command.portrait {
            self.visual.portrait = Some(portrait);
        }
        self.visual.line = Some(DialogueLine::new(command.text));
        self.reveal_timer = 0.0;
        self.state = PlaybackState::AwaitingTextReveal;
    }

    fn reveal(&mut self, delta: f32) {
        let Some(line) = self.visual.line.as_mut() else {
            self.state = PlaybackState::AwaitingInput;
            return;
        };
        if !line.is_complete() {
            self.reveal_timer += delta;
            if self.reveal_timer >= self.config.char_interval {
                line.reveal_one();
                self.reveal_timer = 0.0;
            }
        }
        if line.is_complete() {
            self.state = PlaybackState::AwaitingInput;
        }
    }

    fn wait_for(&mut self, delta: f32) {
        let Some(wait) = self.wait.as_mut() else {
            return;
        };
        wait.elapsed += delta;
        if wait.elapsed >= wait.duration {
            debug!(index = self.command_index, "wait elapsed");
            self.wait = None;
            self.command_index += 1;
            self.run_until_blocked();
        }
    }

    fn apply_background(&mut self, command: &BackgroundCommand) {
        match command.image {
            AssetRef::Keep => {}
            AssetRef::Clear => {
                self.visual.background = None;
                self.pending.push(PresentationCommand::ClearBackground);
            }
            AssetRef::Set(index) => match self.document.backgrounds().key_of(index) {
                Some(image) => {
                    let image = image.to_string();
                    self.show_background(image);
                }
                None => self.advise(format!("background #{index} is not in the pool")),
            },
        }
        match command.music {
            AssetRef::Keep => {}
            AssetRef::Clear => {
                self.visual.music = None;
                self.pending.push(PresentationCommand::StopMusic);
            }
            AssetRef::Set(index) => match self.document.music().key_of(index) {
                Some(track) => {
                    let track = track.to_string();
                    self.play_music(track);
                }
                None => self.advise(format!("music #{index} is not in the pool")),
            },
        }
    }

    fn apply_sprite(&mut self, command: &SpriteCommand) {
        match self.visual.sprites.get_mut(command.sprite) {
            Some(sprite) => {
                sprite.apply(command);
                self.pending
                    .push(PresentationCommand::SpriteChanged(command.sprite));
            }
            None => self.advise(format!("sprite #{} is not in the pool", command.sprite)),
        }
    }

    fn show_background(&mut self, image: String) {
        self.visual.background = Some(image.clone());
        self.pending.push(PresentationCommand::ShowBackground(image));
    }

    fn play_music(&mut self, track: String) {
        self.visual.music = Some(track.clone());
        self.pending.push(PresentationCommand::PlayMusic(track));
    }

    fn advise(&mut self, message: String) {
        warn!(index = self.command_index, "{message}; command skipped");
        self.advisories.push(Advisory {
            command_index: self.command_index,
            message,
        });
    }

    fn finish(&mut self) {
        self.state = PlaybackState::Finished;
        info!("story playback finished");
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
