//! Cardmason Core Library
//!
//! Platform-agnostic masonry layout and drag-to-reorder engine. Hosts supply
//! children, measurements, pointer input and window notifications; the
//! engine answers with frames to render and lifecycle events.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod ghost;
pub mod input;
pub mod items;
pub mod layout;
pub mod scroll_lock;

pub use config::{ConfigError, ConfigResult, GestureConfig, MasonryConfig, Transition};
pub use engine::{DragState, EndlineAnchors, Frame, HeaderFrame, ItemFrame, MasonryEngine, MasonryEvent};
pub use geometry::{GeometryRegistry, Measurement};
pub use ghost::Ghost;
pub use input::{CursorTracker, DragTrigger, Gesture, PointerDevice, PointerEvent};
pub use items::{Item, ItemId, ItemSource, ItemsStore};
pub use layout::{Endline, Layout, LayoutElement, LayoutError, LayoutResult, column_count, compute_layout, transition_for};
pub use scroll_lock::{DocumentStyle, MemoryDocumentStyle, ScrollLock, ScrollStyle};
