//! Compute one layout.

use anyhow::Context;
use composer_layout_model::{
    compute_layout, Dimension, DisplaySettings, FixedGeometry, Mask, PositionMode,
    PositionModeKind, Resolution,
};

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<Resolution, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("bad width {w:?}"))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("bad height {h:?}"))?;
    Ok(Resolution::new(width, height))
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    container: Resolution,
    native: Resolution,
    mode: PositionModeKind,
    mask: Mask,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<Dimension>,
    height: Option<Dimension>,
) -> anyhow::Result<()> {
    let fixed = FixedGeometry {
        x,
        y,
        width,
        height,
    };
    if mode != PositionModeKind::Fixed && !fixed.is_empty() {
        tracing::warn!(mode = %mode, "Fixed geometry arguments are ignored outside fixed mode");
    }
    let position = PositionMode::from_kind(mode, fixed);

    let layout = compute_layout("source", container, native, &position, mask)
        .context("Layout failed")?;
    let display = DisplaySettings::new(layout, native);
    println!("{}", serde_json::to_string_pretty(&display)?);
    Ok(())
}
