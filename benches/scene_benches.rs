use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::{json, Value};

use story_scene::{
    PlaybackConfig, PlaybackEngine, ScriptDocument, ScriptLoader, ScriptSerializer, TickStatus,
};

fn dialogue_script(line_count: usize) -> Value {
    let commands = (0..line_count)
        .flat_map(|idx| {
            [
                json!({ "sprite": { "id": format!("slot{}", idx % 4), "actor": "narrator", "portrait": [idx % 2, 0] } }),
                json!({ "speak": { "actor": "narrator", "text": format!("Line {idx}") } }),
                json!({ "background": { "image": format!("bg{}", idx % 8) } }),
            ]
        })
        .collect::<Vec<_>>();
    json!({
        "actors": {
            "narrator": { "name": "Narrator", "sheet": "narrator.png", "sheetSize": [2, 1] }
        },
        "commands": commands
    })
}

fn bench_load(c: &mut Criterion) {
    let script = dialogue_script(200);
    let text = serde_json::to_string(&script).expect("json");
    let loader = ScriptLoader::default();
    c.bench_function("load_value", |b| {
        b.iter(|| loader.load(&script).expect("load"))
    });
    c.bench_function("load_str", |b| {
        b.iter(|| loader.load_str(&text).expect("load"))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let document = ScriptDocument::from_json_value(&dialogue_script(200)).expect("load");
    c.bench_function("serialize_value", |b| {
        b.iter(|| ScriptSerializer.serialize(&document).expect("serialize"))
    });
}

fn bench_playback(c: &mut Criterion) {
    let document = ScriptDocument::from_json_value(&dialogue_script(200)).expect("load");
    c.bench_function("playback_run", |b| {
        b.iter_batched(
            || PlaybackEngine::new(document.clone(), PlaybackConfig::default()).expect("engine"),
            |mut engine| {
                engine.start();
                while engine.tick(0.05) == TickStatus::Continuing {
                    engine.advance();
                    engine.drain_presentation();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(scene_benches, bench_load, bench_serialize, bench_playback);
criterion_main!(scene_benches);
