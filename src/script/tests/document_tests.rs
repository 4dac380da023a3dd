use super::*;

fn cast() -> ScriptDocument {
    let mut document = ScriptDocument::new();
    document
        .add_actor(Actor::new("alice", "Alice", "alice.png", SheetSize::new(3, 2)))
        .expect("add alice");
    document
}

#[test]
fn ensure_is_idempotent_and_order_preserving() {
    let mut document = ScriptDocument::new();
    assert_eq!(document.ensure_background("room"), 0);
    assert_eq!(document.ensure_background("street"), 1);
    assert_eq!(document.ensure_background("room"), 0);
    assert_eq!(document.backgrounds().len(), 2);
    assert_eq!(document.backgrounds().key_of(1), Some("street"));

    assert_eq!(document.ensure_sprite("door"), 0);
    assert_eq!(document.ensure_sprite("door"), 0);
    assert_eq!(document.sprites().len(), 1);
    assert!(!document.sprites().get(0).expect("door").visible);

    assert_eq!(document.ensure_music("theme"), 0);
    assert_eq!(document.music_index("theme"), Some(0));
    assert_eq!(document.music_index("other"), None);
}

#[test]
fn duplicate_actor_is_rejected() {
    let mut document = cast();
    let err = document
        .add_actor(Actor::new("alice", "Other", "other.png", SheetSize::new(1, 1)))
        .expect_err("duplicate id");
    assert_eq!(err.field(), Some("actors.alice"));
    assert_eq!(document.actors().len(), 1);
}

#[test]
fn zero_sized_sheet_is_rejected() {
    let mut document = ScriptDocument::new();
    let err = document
        .add_actor(Actor::new("bob", "Bob", "bob.png", SheetSize::new(0, 2)))
        .expect_err("empty sheet");
    assert_eq!(err.field(), Some("actors.bob.sheetSize"));
}

#[test]
fn sheet_cells_linearize_by_columns() {
    let sheet = SheetSize::new(3, 2);
    assert_eq!(sheet.cell_index(1, 1), Some(4));
    assert_eq!(sheet.cell_index(3, 0), None);
    assert_eq!(sheet.cell_index(0, 2), None);
    assert_eq!(sheet.cell_coords(4), Some((1, 1)));
    assert_eq!(sheet.cell_coords(6), None);

    let rect = sheet.cell_rect(5).expect("last cell");
    assert_eq!(rect.u, 2.0 / 3.0);
    assert_eq!(rect.v, 0.5);
    assert_eq!(rect.height, 0.5);
}

#[test]
fn push_command_rejects_dangling_references() {
    let mut document = cast();

    let err = document
        .push_command(Command::Sprite(SpriteCommand {
            sprite: 0,
            ..SpriteCommand::default()
        }))
        .expect_err("no sprite in pool");
    assert!(matches!(err, SceneError::Reference { kind: RefKind::Sprite, .. }));

    let err = document
        .push_command(Command::Speak(SpeakCommand {
            actor: Some(7),
            portrait: None,
            text: "hi".to_string(),
        }))
        .expect_err("no actor 7");
    assert!(matches!(err, SceneError::Reference { kind: RefKind::Actor, .. }));

    let err = document
        .push_command(Command::Background(BackgroundCommand {
            image: AssetRef::Set(0),
            music: AssetRef::Keep,
        }))
        .expect_err("no background");
    assert_eq!(err.field(), Some("commands[0].background.image"));

    assert!(document.commands().is_empty());
}

#[test]
fn push_command_checks_portrait_bounds() {
    let mut document = cast();
    let err = document
        .push_command(Command::Speak(SpeakCommand {
            actor: Some(0),
            portrait: Some(6),
            text: String::new(),
        }))
        .expect_err("cell 6 outside 3x2 sheet");
    assert_eq!(err.field(), Some("commands[0].speak.portrait"));

    let err = document
        .push_command(Command::Speak(SpeakCommand {
            actor: None,
            portrait: Some(0),
            text: String::new(),
        }))
        .expect_err("portrait without actor");
    assert_eq!(err.field(), Some("commands[0].speak.portrait"));

    let err = document
        .push_command(Command::Speak(SpeakCommand {
            actor: None,
            portrait: None,
            text: "who?".to_string(),
        }))
        .expect_err("speaker is required");
    assert_eq!(err.field(), Some("commands[0].speak.actor"));

    document
        .push_command(Command::Speak(SpeakCommand {
            actor: Some(0),
            portrait: Some(5),
            text: "ok".to_string(),
        }))
        .expect("valid portrait");
    assert_eq!(document.commands().len(), 1);
}

#[test]
fn insert_and_remove_keep_pools() {
    let mut document = cast();
    let room = document.ensure_background("room");
    document
        .push_command(Command::Wait(WaitCommand { duration: 1.0 }))
        .expect("wait");
    document
        .insert_command(
            0,
            Command::Background(BackgroundCommand {
                image: AssetRef::Set(room),
                music: AssetRef::Clear,
            }),
        )
        .expect("insert at front");
    assert_eq!(document.commands()[0].key(), "background");
    assert!(document.insert_command(5, Command::Wait(WaitCommand::default())).is_err());

    let removed = document.remove_command(0).expect("removed");
    assert_eq!(removed.key(), "background");
    assert_eq!(document.backgrounds().len(), 1);
    assert!(document.remove_command(3).is_none());
}

#[test]
fn negative_wait_is_rejected() {
    let mut document = ScriptDocument::new();
    let err = document
        .push_command(Command::Wait(WaitCommand { duration: -0.5 }))
        .expect_err("negative");
    assert_eq!(err.field(), Some("commands[0].wait.time"));
}

#[test]
fn required_assets_cover_sheets_and_pools() {
    let mut document = cast();
    document.ensure_background("room.png");
    document.ensure_music("theme.ogg");
    let assets = document.required_assets();
    assert_eq!(assets.textures, vec!["alice.png".to_string(), "room.png".to_string()]);
    assert_eq!(assets.music, vec!["theme.ogg".to_string()]);
}

#[test]
fn cell_index_never_overflows() {
    let sheet = SheetSize::new(2_147_483_648, 4);
    assert_eq!(sheet.checked_cell_count(), None);
    assert_eq!(sheet.cell_index(0, 3), None);
    assert_eq!(sheet.cell_index(1, 1), Some(2_147_483_649));

    let mut document = ScriptDocument::new();
    let err = document
        .add_actor(Actor::new("huge", "Huge", "huge.png", sheet))
        .expect_err("too many cells");
    assert_eq!(err.field(), Some("actors.huge.sheetSize"));
    assert!(document.actors().is_empty());
}

#[test]
fn non_finite_sprite_vectors_are_rejected() {
    let mut document = ScriptDocument::new();
    let sprite = document.ensure_sprite("s");
    let err = document
        .push_command(Command::Sprite(SpriteCommand {
            sprite,
            pos: Some(Vec2::new(f32::INFINITY, 0.0)),
            ..SpriteCommand::default()
        }))
        .expect_err("infinite pos");
    assert_eq!(err.field(), Some("commands[0].sprite.pos"));

    let err = document
        .push_command(Command::Sprite(SpriteCommand {
            sprite,
            size: Some(Vec2::new(1.0, f32::NAN)),
            ..SpriteCommand::default()
        }))
        .expect_err("nan size");
    assert_eq!(err.field(), Some("commands[0].sprite.size"));
    assert!(document.commands().is_empty());
}
