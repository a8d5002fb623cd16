use std::time::Duration;

use composer_common::{ComposerConfig, OutputResolution};
use composer_layout_model::{
    EntityOptions, FixedGeometry, InteractionMode, PointerEvent, PositionMode, Resolution,
};
use composer_render_engine::{
    run_composer_loop, Composer, ComposerCommand, RecordingSurface, StillSource,
};
use tokio::sync::mpsc;

fn config() -> ComposerConfig {
    ComposerConfig {
        resolution: OutputResolution {
            width: 400,
            height: 300,
        },
        fps: 100,
        ..ComposerConfig::default()
    }
}

#[tokio::test]
async fn loop_applies_pointer_commands_and_renders() {
    let mut composer = Composer::new(config());
    let id = composer.add_entity(
        StillSource::video(100.0, 100.0),
        EntityOptions {
            position: PositionMode::Fixed(FixedGeometry::pinned(0.0, 0.0, 100.0, 100.0)),
            draggable: true,
            ..EntityOptions::default()
        },
    );
    let surface = RecordingSurface::new(Resolution::new(400.0, 300.0));
    let (tx, rx) = mpsc::channel(16);
    let task = tokio::spawn(run_composer_loop(composer, surface, rx));

    for event in [
        PointerEvent::down(0, 50.0, 50.0),
        PointerEvent::moved(10, 80.0, 70.0),
        PointerEvent::up(20, 80.0, 70.0),
    ] {
        tx.send(ComposerCommand::Pointer(event)).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(ComposerCommand::Shutdown).await.unwrap();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome.pointer_events, 3);
    assert!(outcome.frames_rendered >= 1);
    assert_eq!(outcome.surface.frame_count() as u64, outcome.frames_rendered);

    let display = outcome.composer.get_entity(id).unwrap().display.unwrap();
    assert_eq!((display.position.x, display.position.y), (30.0, 20.0));
}

#[tokio::test]
async fn loop_stops_when_senders_drop() {
    let composer = Composer::new(config());
    let surface = RecordingSurface::new(Resolution::new(400.0, 300.0));
    let (tx, rx) = mpsc::channel(4);
    let task = tokio::spawn(run_composer_loop(composer, surface, rx));

    tx.send(ComposerCommand::SetMode(InteractionMode::Draw))
        .await
        .unwrap();
    tx.send(ComposerCommand::Pointer(PointerEvent::down(0, 1.0, 1.0)))
        .await
        .unwrap();
    tx.send(ComposerCommand::Pointer(PointerEvent::leave(5)))
        .await
        .unwrap();
    drop(tx);

    let outcome = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("loop did not stop")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.composer.interaction_mode(), InteractionMode::Draw);
    assert_eq!(outcome.composer.drawing().len(), 1);
}
