//! Recorded sessions: items with their geometry and a timeline of host
//! notifications, stored as JSON.

use crate::error::{AppError, AppResult};
use cardmason_core::{ItemId, ItemSource, MasonryConfig, Measurement, PointerEvent};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One child plus the geometry the DOM would report for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptItem {
    #[serde(flatten)]
    pub source: ItemSource,
    /// Measured wrapper size. Unmeasured items fail the layout pass.
    #[serde(default)]
    pub measured: Option<Size>,
    /// Card box inside the wrapper; defaults to filling it.
    #[serde(default)]
    pub card: Option<Rect>,
}

impl ScriptItem {
    pub fn measurement(&self) -> Option<Measurement> {
        let size = self.measured?;
        Some(match self.card {
            Some(card) => Measurement::new(size, card),
            None => Measurement::filled(size.width, size.height),
        })
    }
}

/// Something the host reports at a point of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Pointer { event: PointerEvent },
    /// Grid top relative to the viewport.
    Scroll { wrapper_top: f64 },
    Resize {
        width: f64,
        height: f64,
        /// New grid width; defaults to the viewport width.
        #[serde(default)]
        wrapper_width: Option<f64>,
    },
    Loaded { id: ItemId },
    Failed { id: ItemId },
    /// Replace the children (infinite scroll pages, removals).
    Children { items: Vec<ScriptItem> },
    /// Only advance the clock.
    Wait,
}

/// A timed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Milliseconds since the session started.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// A whole recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub config: MasonryConfig,
    pub viewport: Size,
    /// Grid width; defaults to the viewport width.
    #[serde(default)]
    pub wrapper_width: Option<f64>,
    /// Grid top relative to the viewport when the grid mounts. Without it the
    /// endline is only checked on scroll.
    #[serde(default)]
    pub wrapper_top: Option<f64>,
    pub items: Vec<ScriptItem>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SessionScript {
    /// Parse and validate a script.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.config.validate()?;
        if !(self.viewport.width >= 0.0 && self.viewport.height >= 0.0) {
            return Err(AppError::Script(format!("invalid viewport {:?}", self.viewport)));
        }
        if let Some(pair) = self.steps.windows(2).find(|pair| pair[1].at_ms < pair[0].at_ms) {
            return Err(AppError::Script(format!(
                "steps go back in time ({} ms after {} ms)",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(())
    }

    pub fn wrapper_width(&self) -> f64 {
        self.wrapper_width.unwrap_or(self.viewport.width)
    }
}

/// Read a bare item list (`cardmason layout`).
pub fn load_items(path: &Path) -> AppResult<Vec<ScriptItem>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "viewport": { "width": 300, "height": 600 },
            "items": [
                { "id": "a", "measured": { "width": 100, "height": 80 } },
                { "id": "sep", "is_separator": true, "measured": { "width": 300, "height": 10 } },
                { "id": "b" }
            ],
            "steps": [
                { "at_ms": 0, "action": "pointer", "event": { "type": "mouse_down", "position": { "x": 5, "y": 5 } } },
                { "at_ms": 40, "action": "scroll", "wrapper_top": -20 },
                { "at_ms": 50, "action": "loaded", "id": "b" },
                { "at_ms": 900, "action": "wait" }
            ]
        }"#;
        let script = SessionScript::from_json(json).unwrap();
        assert_eq!(script.config, MasonryConfig::default());
        assert_eq!(script.wrapper_width(), 300.0);
        assert_eq!(script.items.len(), 3);
        assert!(script.items[1].source.is_separator);
        assert_eq!(script.items[0].measurement(), Some(Measurement::filled(100.0, 80.0)));
        assert_eq!(script.items[2].measurement(), None);
        assert_eq!(script.steps[1].action, Action::Scroll { wrapper_top: -20.0 });
        assert!(matches!(
            script.steps[0].action,
            Action::Pointer {
                event: PointerEvent::MouseDown { item_index: None, .. }
            }
        ));
    }

    #[test]
    fn test_rejects_unordered_steps() {
        let json = r#"{
            "viewport": { "width": 300, "height": 600 },
            "items": [],
            "steps": [
                { "at_ms": 10, "action": "wait" },
                { "at_ms": 5, "action": "wait" }
            ]
        }"#;
        assert!(matches!(SessionScript::from_json(json), Err(AppError::Script(_))));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let json = r#"{
            "config": { "gestures": { "drag_threshold": 0 } },
            "viewport": { "width": 300, "height": 600 },
            "items": []
        }"#;
        assert!(matches!(SessionScript::from_json(json), Err(AppError::Config(_))));
    }
}
