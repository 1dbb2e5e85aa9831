//! Cardmason Application
//!
//! Hosts for the masonry engine: headless session replay behind the
//! `cardmason` CLI, and the WASM binding that drives a real DOM.

mod error;
pub mod replay;
pub mod script;

pub use error::{AppError, AppResult};
pub use replay::{CssEntry, LayoutFailure, Replay, ReplayReport, TimedEvent, layout_once};
pub use script::{Action, ScriptItem, SessionScript, Step};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{BodyStyle, WasmMasonry};
