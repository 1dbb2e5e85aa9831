//! Engine configuration.
//!
//! Durations are stored in milliseconds so the config can be loaded from the
//! same JSON a host would hand to the layout component.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default layout transition duration in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 600;
/// Default ghost transition duration in milliseconds.
pub const DEFAULT_GHOST_TRANSITION_MS: u64 = 200;
/// Default CSS timing function for both transitions.
pub const DEFAULT_TIMING_FUNCTION: &str = "ease";
/// Default reorder cooldown in milliseconds.
pub const DEFAULT_REORDER_COOLDOWN_MS: u64 = 500;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A CSS-style transition: duration plus timing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Easing, e.g. `ease` or `cubic-bezier(...)`.
    pub timing_function: String,
}

impl Transition {
    pub fn new(duration_ms: u64, timing_function: impl Into<String>) -> Self {
        Self {
            duration_ms,
            timing_function: timing_function.into(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Render as a CSS `transition` value for the given property.
    pub fn css(&self, property: &str) -> String {
        format!("{} {}ms {}", property, self.duration_ms, self.timing_function)
    }
}

/// Gesture thresholds and timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Mouse travel (px, either axis) that starts a drag.
    pub drag_threshold: f64,
    /// Hold time (ms) before a single-finger touch becomes a drag.
    pub long_press_delay: u64,
    /// Hold time (ms) before page scrolling is locked during a touch.
    pub scroll_lock_delay: u64,
    /// Touch travel (px) that turns a pending long press into a scroll.
    pub long_press_slop: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            long_press_delay: 500,
            scroll_lock_delay: 300,
            long_press_slop: 10.0,
        }
    }
}

impl GestureConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_delay)
    }

    pub fn scroll_lock(&self) -> Duration {
        Duration::from_millis(self.scroll_lock_delay)
    }
}

/// Host-facing configuration of a masonry layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonryConfig {
    /// Layout (settle) transition duration in milliseconds.
    pub transition_duration: u64,
    pub transition_timing_function: String,
    /// Ghost transition duration in milliseconds.
    pub ghost_transition_duration: u64,
    pub ghost_transition_timing_function: String,
    /// Optional decorative header content rendered above the grid.
    pub header: Option<String>,
    /// Minimum time (ms) between two reorders of the same drag.
    pub reorder_cooldown: u64,
    pub gestures: GestureConfig,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            transition_duration: DEFAULT_TRANSITION_MS,
            transition_timing_function: DEFAULT_TIMING_FUNCTION.to_string(),
            ghost_transition_duration: DEFAULT_GHOST_TRANSITION_MS,
            ghost_transition_timing_function: DEFAULT_TIMING_FUNCTION.to_string(),
            header: None,
            reorder_cooldown: DEFAULT_REORDER_COOLDOWN_MS,
            gestures: GestureConfig::default(),
        }
    }
}

impl MasonryConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.gestures.drag_threshold.is_finite() && self.gestures.drag_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold must be positive, got {}",
                self.gestures.drag_threshold
            )));
        }
        if !(self.gestures.long_press_slop.is_finite() && self.gestures.long_press_slop >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "long_press_slop must be non-negative, got {}",
                self.gestures.long_press_slop
            )));
        }
        if self.transition_timing_function.trim().is_empty()
            || self.ghost_transition_timing_function.trim().is_empty()
        {
            return Err(ConfigError::Invalid("timing function must not be empty".to_string()));
        }
        Ok(())
    }

    /// Transition applied to cards settling into layout positions.
    pub fn layout_transition(&self) -> Transition {
        Transition::new(self.transition_duration, self.transition_timing_function.clone())
    }

    /// Transition applied to the ghost proxy.
    pub fn ghost_transition(&self) -> Transition {
        Transition::new(
            self.ghost_transition_duration,
            self.ghost_transition_timing_function.clone(),
        )
    }

    pub fn reorder_cooldown(&self) -> Duration {
        Duration::from_millis(self.reorder_cooldown)
    }
}
