//! Cardmason Render Library
//!
//! Renderer abstraction over the engine's [`Frame`](cardmason_core::Frame).
//! [`CssRenderer`] produces inline styles for the DOM host and
//! [`SvgRenderer`] produces static snapshots for the CLI.

mod css;
mod renderer;
mod svg;

pub use css::{CssRenderer, StyledNode};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use svg::SvgRenderer;
