//! Async host loop.
//!
//! Owns a [`Composer`] inside one task and multiplexes the frame interval,
//! the stroke sweep interval and a command channel. Late ticks are skipped,
//! not replayed. No locks: everything reaches the composer through the
//! channel.

use std::time::Duration;

use composer_common::error::ComposerResult;
use composer_interaction::DrawStylePatch;
use composer_layout_model::{InteractionMode, PointerEvent};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::composer::Composer;
use crate::surface::Surface;

/// Input accepted by [`run_composer_loop`].
#[derive(Debug, Clone)]
pub enum ComposerCommand {
    Pointer(PointerEvent),
    SetMode(InteractionMode),
    SetDrawStyle(DrawStylePatch),
    ClearDrawing,
    Shutdown,
}

/// What the loop did before it stopped. Hands the composer and surface back.
#[derive(Debug)]
pub struct LoopOutcome<S> {
    pub composer: Composer,
    pub surface: S,
    pub frames_rendered: u64,
    pub pointer_events: u64,
    pub strokes_swept: usize,
}

/// Drive `composer` until a [`ComposerCommand::Shutdown`] arrives or every
/// command sender is dropped.
pub async fn run_composer_loop<S: Surface>(
    mut composer: Composer,
    mut surface: S,
    mut commands: mpsc::Receiver<ComposerCommand>,
) -> ComposerResult<LoopOutcome<S>> {
    let mut frame_tick = interval(Duration::from_millis(composer.frame_interval_ms().max(1)));
    frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sweep_tick = interval(Duration::from_millis(composer.sweep_interval_ms().max(1)));
    sweep_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frames_rendered = 0u64;
    let mut pointer_events = 0u64;
    let mut strokes_swept = 0usize;

    tracing::info!(
        frame_interval_ms = composer.frame_interval_ms(),
        sweep_interval_ms = composer.sweep_interval_ms(),
        "Composer loop started"
    );

    loop {
        tokio::select! {
            _ = frame_tick.tick() => {
                composer.render(&mut surface)?;
                frames_rendered += 1;
            }

            _ = sweep_tick.tick() => {
                strokes_swept += composer.sweep_drawing();
            }

            command = commands.recv() => {
                match command {
                    Some(ComposerCommand::Pointer(event)) => {
                        composer.handle_pointer(&event);
                        pointer_events += 1;
                    }
                    Some(ComposerCommand::SetMode(mode)) => composer.set_interaction_mode(mode),
                    Some(ComposerCommand::SetDrawStyle(patch)) => composer.set_draw_style(&patch),
                    Some(ComposerCommand::ClearDrawing) => composer.clear_drawing(),
                    Some(ComposerCommand::Shutdown) | None => break,
                }
            }
        }
    }

    tracing::info!(frames_rendered, pointer_events, strokes_swept, "Composer loop stopped");
    Ok(LoopOutcome {
        composer,
        surface,
        frames_rendered,
        pointer_events,
        strokes_swept,
    })
}
