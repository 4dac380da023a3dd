mod common;

use std::fs;

use serde_json::{json, Value};
use story_scene::{Scene, SceneError};
use tempfile::tempdir;

fn story_scene(extra: Value) -> Value {
    let mut scene = common::sample_script();
    let object = scene.as_object_mut().expect("object");
    object.insert("type".to_string(), json!("story"));
    if let Value::Object(extra) = extra {
        object.extend(extra);
    }
    scene
}

#[test]
fn missing_title_falls_back_to_the_name() {
    let scene = Scene::load("chapter_one", &story_scene(json!({}))).expect("scene");
    assert_eq!(scene.title, "chapter_one");
    assert_eq!(scene.background, None);
    assert_eq!(scene.story.commands().len(), 7);
}

#[test]
fn envelope_fields_are_read() {
    let scene = Scene::load(
        "intro",
        &story_scene(json!({
            "title": "The Beginning",
            "background": "sky.png",
            "music": "",
            "next": "chapter_one"
        })),
    )
    .expect("scene");
    assert_eq!(scene.title, "The Beginning");
    assert_eq!(scene.background.as_deref(), Some("sky.png"));
    assert_eq!(scene.music, None);
    assert_eq!(scene.next.as_deref(), Some("chapter_one"));

    let assets = scene.required_assets();
    assert!(assets.textures.contains(&"sky.png".to_string()));
}

#[test]
fn field_scenes_are_unsupported() {
    let err = Scene::load("map", &story_scene(json!({ "type": "Field" }))).expect_err("field");
    assert!(matches!(err, SceneError::UnsupportedScene(_)));

    let err = Scene::load("odd", &story_scene(json!({ "type": "cutscene" }))).expect_err("unknown");
    assert_eq!(err.field(), Some("type"));
}

#[test]
fn scene_round_trips_through_json() {
    let scene = Scene::load(
        "intro",
        &story_scene(json!({ "title": "Intro", "music": "wind.ogg" })),
    )
    .expect("scene");
    let value = scene.to_json_value().expect("to json");
    assert_eq!(value["type"], json!("story"));
    assert_eq!(value["music"], json!("wind.ogg"));
    assert!(value.get("background").is_none());

    let again = Scene::load("intro", &value).expect("reload");
    assert_eq!(again, scene);
}

#[test]
fn load_file_names_scene_after_stem() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("harbor.json");
    let text = serde_json::to_string_pretty(&story_scene(json!({ "title": "Harbor" })))
        .expect("json");
    fs::write(&path, text).expect("write scene");

    let scene = Scene::load_file(&path).expect("load file");
    assert_eq!(scene.name, "harbor");
    assert_eq!(scene.title, "Harbor");

    let err = Scene::load_file(&dir.path().join("missing.json")).expect_err("missing");
    assert!(matches!(err, SceneError::Io(_)));
}
