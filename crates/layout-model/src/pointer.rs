//! Pointer-event feed types.
//!
//! The input adapter delivers events already scaled to surface pixels.
//! Scripts of events (for replays and tests) use JSONL, one event per line,
//! in the same `{"t": .., "type": ..}` shape as the recorder's event logs.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// Milliseconds since composer start.
pub type TimestampMs = u64;

/// Global pointer routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    /// Pointer input drags and resizes entities.
    #[default]
    MoveResize,
    /// Pointer input draws freehand strokes.
    Draw,
}

impl std::str::FromStr for InteractionMode {
    type Err = composer_common::error::ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move-resize" => Ok(InteractionMode::MoveResize),
            "draw" => Ok(InteractionMode::Draw),
            other => Err(composer_common::error::ComposerError::invalid_interaction_mode(other)),
        }
    }
}

/// A single pointer event with timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(rename = "t", default)]
    pub timestamp_ms: TimestampMs,

    #[serde(flatten)]
    pub kind: PointerEventKind,
}

/// Pointer phase with its surface-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEventKind {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// The pointer left the capture surface; acts as an implicit up.
    Leave,
}

impl PointerEvent {
    pub fn down(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: PointerEventKind::Down { x, y },
        }
    }

    pub fn moved(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: PointerEventKind::Move { x, y },
        }
    }

    pub fn up(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self {
            timestamp_ms,
            kind: PointerEventKind::Up { x, y },
        }
    }

    pub fn leave(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            kind: PointerEventKind::Leave,
        }
    }

    /// Pointer coordinate, if the event carries one.
    pub fn point(&self) -> Option<Point2D> {
        match self.kind {
            PointerEventKind::Down { x, y }
            | PointerEventKind::Move { x, y }
            | PointerEventKind::Up { x, y } => Some(Point2D::new(x, y)),
            PointerEventKind::Leave => None,
        }
    }
}

/// Parse pointer events from JSONL content. Blank lines and `#` comments are skipped.
pub fn parse_pointer_events(jsonl: &str) -> Result<Vec<PointerEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize pointer events to JSONL format.
pub fn serialize_pointer_events(events: &[PointerEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let event = PointerEvent::down(40, 12.5, 30.0);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"t\":40"));
        assert!(json.contains("\"type\":\"down\""));
        assert!(json.contains("\"x\":12.5"));
    }

    #[test]
    fn test_jsonl_script_parses_with_comments() {
        let script = "# drag the camera\n\
            {\"t\":0,\"type\":\"down\",\"x\":10,\"y\":10}\n\
            \n\
            {\"t\":16,\"type\":\"move\",\"x\":20,\"y\":15}\n\
            {\"t\":32,\"type\":\"leave\"}\n";
        let events = parse_pointer_events(script).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].point(), Some(Point2D::new(20.0, 15.0)));
        assert_eq!(events[2].kind, PointerEventKind::Leave);
        assert_eq!(events[2].point(), None);
    }

    #[test]
    fn test_serialized_script_reparses() {
        let events = vec![
            PointerEvent::down(0, 1.0, 2.0),
            PointerEvent::moved(10, 3.0, 4.0),
            PointerEvent::up(20, 3.0, 4.0),
        ];
        let jsonl = serialize_pointer_events(&events).unwrap();
        assert_eq!(parse_pointer_events(&jsonl).unwrap(), events);
    }

    #[test]
    fn test_interaction_mode_names() {
        assert_eq!(
            "draw".parse::<InteractionMode>().unwrap(),
            InteractionMode::Draw
        );
        assert_eq!(
            serde_json::to_string(&InteractionMode::MoveResize).unwrap(),
            "\"move-resize\""
        );
        assert!(matches!(
            "paint".parse::<InteractionMode>(),
            Err(composer_common::error::ComposerError::InvalidInteractionMode { .. })
        ));
    }
}
