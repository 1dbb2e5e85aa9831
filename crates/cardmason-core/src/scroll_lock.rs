//! Page scroll lock used while a touch drag may be in progress.
//!
//! The document's scroll style is shared with the rest of the page, so only
//! [`ScrollLock`] writes it. The values found at construction are restored
//! on release instead of hardcoded defaults.

use serde::{Deserialize, Serialize};

/// The two document style properties the lock manipulates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollStyle {
    /// CSS `overflow`.
    pub overflow: String,
    /// CSS `overscroll-behavior-y`.
    pub overscroll_behavior_y: String,
}

impl ScrollStyle {
    pub fn new(overflow: impl Into<String>, overscroll_behavior_y: impl Into<String>) -> Self {
        Self {
            overflow: overflow.into(),
            overscroll_behavior_y: overscroll_behavior_y.into(),
        }
    }

    /// Disables scrolling and pull-to-refresh.
    pub fn locked() -> Self {
        Self::new("hidden", "contain")
    }
}

/// Access to the document's scroll style.
///
/// Implemented over `document.body.style` on the web and by
/// [`MemoryDocumentStyle`] for tests and headless hosts.
pub trait DocumentStyle {
    fn read(&self) -> ScrollStyle;
    fn write(&mut self, style: &ScrollStyle);
}

/// In-memory document style.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStyle {
    current: ScrollStyle,
    writes: usize,
}

impl MemoryDocumentStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing page styles.
    pub fn with_style(style: ScrollStyle) -> Self {
        Self {
            current: style,
            writes: 0,
        }
    }

    pub fn current(&self) -> &ScrollStyle {
        &self.current
    }

    /// Number of writes performed.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DocumentStyle for MemoryDocumentStyle {
    fn read(&self) -> ScrollStyle {
        self.current.clone()
    }

    fn write(&mut self, style: &ScrollStyle) {
        self.current = style.clone();
        self.writes += 1;
    }
}

/// Acquire/release guard over the document scroll style.
#[derive(Debug)]
pub struct ScrollLock<D: DocumentStyle> {
    document: D,
    saved: ScrollStyle,
    locked: bool,
}

impl<D: DocumentStyle> ScrollLock<D> {
    /// Capture the document's current style as the value to restore.
    pub fn new(document: D) -> Self {
        let saved = document.read();
        Self {
            document,
            saved,
            locked: false,
        }
    }

    /// Stop page scrolling. No-op if already locked.
    pub fn lock(&mut self) {
        if !self.locked {
            log::debug!("Locking page scroll");
            self.document.write(&ScrollStyle::locked());
            self.locked = true;
        }
    }

    /// Restore the captured style unless a touch session or a ghost still
    /// needs the lock. Returns true if the style was restored.
    pub fn release(&mut self, touch_active: bool, ghost_active: bool) -> bool {
        if touch_active || ghost_active {
            return false;
        }
        self.force_release()
    }

    /// Restore unconditionally (teardown).
    pub fn force_release(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        log::debug!("Restoring page scroll");
        self.document.write(&self.saved);
        self.locked = false;
        true
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Style captured at construction.
    pub fn saved(&self) -> &ScrollStyle {
        &self.saved
    }

    pub fn document(&self) -> &D {
        &self.document
    }
}
