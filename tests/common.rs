#![allow(dead_code)]

use serde_json::{json, Value};
use story_scene::{PlaybackConfig, PlaybackEngine, ScriptDocument, TickStatus, TranscriptPresenter};

/// A small scene touching every command kind, in canonical serialized form.
pub fn sample_script() -> Value {
    json!({
        "actors": {
            "alice": { "name": "Alice", "sheet": "alice.png", "sheetSize": [3, 2] },
            "bob": { "name": "Bob", "sheet": "bob.png", "sheetSize": [1, 1] }
        },
        "commands": [
            { "background": { "image": "room.png", "music": "theme.ogg" } },
            { "sprite": { "id": "left", "actor": "alice", "portrait": [1, 1], "pos": [0.25, 0.5] } },
            { "speak": { "actor": "alice", "text": "Hi", "portrait": [1, 1] } },
            { "wait": { "time": 0.5 } },
            { "sprite": { "id": "left", "hide": true } },
            { "speak": { "actor": "bob", "text": "Bye" } },
            { "background": { "image": "" } }
        ]
    })
}

pub fn sample_document() -> ScriptDocument {
    ScriptDocument::from_json_value(&sample_script()).expect("load sample")
}

/// Plays a script to the end, advancing as soon as each line is shown.
pub fn run_to_end(document: ScriptDocument, max_ticks: usize) -> (PlaybackEngine, TranscriptPresenter) {
    let mut engine =
        PlaybackEngine::new(document, PlaybackConfig::default()).expect("create engine");
    let mut presenter = TranscriptPresenter::default();
    engine.start();

    for _ in 0..max_ticks {
        let status = engine.tick(0.05);
        engine.present_to(&mut presenter);
        if status == TickStatus::Finished {
            break;
        }
        engine.advance();
    }

    (engine, presenter)
}
