//! Replay a pointer script against a scene.
//!
//! A scene file names the sources to composite and the pointer events to
//! feed them:
//!
//! ```json
//! {
//!   "resolution": { "width": 1280, "height": 720 },
//!   "mode": "move-resize",
//!   "sources": [
//!     { "native": { "width": 1920, "height": 1080 },
//!       "options": { "position": { "mode": "contain" } } },
//!     { "native": { "width": 640, "height": 480 },
//!       "options": { "position": { "mode": "fixed", "x": 20, "y": 20, "width": "25%" },
//!                    "mask": "circle", "draggable": true, "resizable": true } },
//!     { "audio_only": true }
//!   ],
//!   "pointer_script": "drag.jsonl"
//! }
//! ```
//!
//! `pointer_script` is resolved relative to the scene file; events may also
//! be given inline under `pointer`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use composer_common::{ComposerClock, ComposerConfig, ManualClock, OutputResolution, TimeSource};
use composer_interaction::{CursorHint, DrawStylePatch};
use composer_layout_model::{
    parse_pointer_events, EntityOptions, InteractionMode, PointerEvent, Resolution,
};
use composer_render_engine::{
    run_composer_loop, Composer, ComposerCommand, EntityInfo, FrameComposition, RecordingSurface,
    StillSource,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Scene file contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Output size; overrides the configured resolution.
    pub resolution: Option<OutputResolution>,
    pub mode: InteractionMode,
    pub draw_style: Option<DrawStylePatch>,
    pub sources: Vec<SceneSource>,
    /// Inline pointer events.
    pub pointer: Vec<PointerEvent>,
    /// JSONL file of pointer events, relative to the scene file.
    pub pointer_script: Option<PathBuf>,
}

/// One source in a scene.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneSource {
    /// Native size; omitted means the source has not reported one yet.
    pub native: Option<Resolution>,
    pub audio_only: bool,
    pub options: EntityOptions,
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene {}", path.display()))
    }

    /// Inline events followed by the script file's events.
    pub fn pointer_events(&self, scene_path: &Path) -> anyhow::Result<Vec<PointerEvent>> {
        let mut events = self.pointer.clone();
        if let Some(script) = &self.pointer_script {
            let script_path = scene_path
                .parent()
                .map(|dir| dir.join(script))
                .unwrap_or_else(|| script.clone());
            let jsonl = std::fs::read_to_string(&script_path).with_context(|| {
                format!("Failed to read pointer script {}", script_path.display())
            })?;
            events.extend(parse_pointer_events(&jsonl).context("Invalid pointer script")?);
        }
        Ok(events)
    }

    /// Build a composer with every source added in file order.
    pub fn build(
        &self,
        mut config: ComposerConfig,
        clock: impl TimeSource + Send + 'static,
    ) -> Composer {
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        let mut composer = Composer::with_clock(config, clock);
        for source in &self.sources {
            let media = if source.audio_only {
                StillSource::audio()
            } else {
                match source.native {
                    Some(native) => StillSource::video(native.width, native.height),
                    None => StillSource::pending(),
                }
            };
            composer.add_entity(media, source.options.clone());
        }
        composer.set_interaction_mode(self.mode);
        if let Some(style) = &self.draw_style {
            composer.set_draw_style(style);
        }
        composer
    }
}

/// Printed result of a replay.
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub pointer_events: usize,
    pub cursor: CursorHint,
    pub strokes: usize,
    pub draw_ops: usize,
    pub entities: Vec<EntityInfo>,
    pub frame: FrameComposition,
}

pub async fn run(config: ComposerConfig, scene_path: PathBuf, realtime: bool) -> anyhow::Result<()> {
    let scene = Scene::load(&scene_path)?;
    let events = scene.pointer_events(&scene_path)?;
    tracing::info!(
        scene = %scene_path.display(),
        sources = scene.sources.len(),
        events = events.len(),
        realtime,
        "Replaying scene"
    );

    let summary = if realtime {
        let composer = scene.build(config, ComposerClock::start());
        replay_realtime(composer, &events).await?
    } else {
        let clock = ManualClock::new(0);
        let composer = scene.build(config, clock.clone());
        replay_scripted(composer, &clock, &events)?
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Deterministic replay: time jumps to each event's timestamp.
fn replay_scripted(
    mut composer: Composer,
    clock: &ManualClock,
    events: &[PointerEvent],
) -> anyhow::Result<ReplaySummary> {
    for event in events {
        clock.set_ms(event.timestamp_ms);
        composer.sweep_drawing();
        composer.handle_pointer(event);
    }

    let mut surface = surface_for(&composer);
    let frame = composer.render(&mut surface).context("Render failed")?;
    Ok(summarize(&composer, &surface, events.len(), frame))
}

/// Wall-clock replay through the async draw loop. The composer must run on
/// a real clock so strokes age and get swept.
async fn replay_realtime(
    composer: Composer,
    events: &[PointerEvent],
) -> anyhow::Result<ReplaySummary> {
    let surface = surface_for(&composer);
    let (tx, rx) = mpsc::channel(64);
    let task = tokio::spawn(run_composer_loop(composer, surface, rx));

    let start = tokio::time::Instant::now();
    for event in events {
        tokio::time::sleep_until(start + Duration::from_millis(event.timestamp_ms)).await;
        tx.send(ComposerCommand::Pointer(*event))
            .await
            .context("Composer loop stopped early")?;
    }
    tx.send(ComposerCommand::Shutdown)
        .await
        .context("Composer loop stopped early")?;

    let outcome = task.await.context("Composer loop panicked")??;
    tracing::info!(frames = outcome.frames_rendered, "Realtime replay finished");

    let mut composer = outcome.composer;
    let mut surface = outcome.surface;
    let frame = composer.render(&mut surface).context("Render failed")?;
    Ok(summarize(&composer, &surface, events.len(), frame))
}

fn surface_for(composer: &Composer) -> RecordingSurface {
    RecordingSurface::new(composer.container())
}

fn summarize(
    composer: &Composer,
    surface: &RecordingSurface,
    pointer_events: usize,
    frame: FrameComposition,
) -> ReplaySummary {
    ReplaySummary {
        pointer_events,
        cursor: composer.cursor(),
        strokes: composer.drawing().len(),
        draw_ops: surface.ops().len(),
        entities: composer.list_entities(),
        frame,
    }
}
