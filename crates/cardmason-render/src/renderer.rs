//! Renderer trait abstraction.

use cardmason_core::config::{MasonryConfig, Transition};
use cardmason_core::engine::Frame;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The frame to render.
    pub frame: &'a Frame,
    /// Transition settings the frame was produced with.
    pub config: &'a MasonryConfig,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Draw the endline sensors (snapshots only; the DOM always gets them).
    pub show_endline: bool,
    /// Label cards with their ids (snapshots only).
    pub show_labels: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(frame: &'a Frame, config: &'a MasonryConfig) -> Self {
        Self {
            frame,
            config,
            scale_factor: 1.0,
            show_endline: true,
            show_labels: true,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Toggle endline sensor markers.
    pub fn with_endline(mut self, show: bool) -> Self {
        self.show_endline = show;
        self
    }

    /// Toggle card labels.
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Layout transition to apply to cards and the bounding box, if any.
    ///
    /// Nothing animates before the layout is mounted.
    pub fn layout_transition(&self) -> Option<Transition> {
        (self.frame.transition && self.frame.layout_is_mount).then(|| self.config.layout_transition())
    }
}

/// Trait for rendering backends.
///
/// Implementations turn a [`Frame`] into their own output (inline styles,
/// SVG markup, ...).
pub trait Renderer {
    /// Build the output for a frame, replacing the previous one.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;
}
