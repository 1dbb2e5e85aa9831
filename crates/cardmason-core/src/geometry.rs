//! Registry of measured item geometry.
//!
//! The rendering layer measures each item's wrapper and card elements and
//! records them here. The layout calculator only reads from it.

use crate::items::ItemId;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Measured geometry of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Outer wrapper size; its width is the column pitch.
    pub wrapper: Size,
    /// Card box in wrapper coordinates (offset + size).
    pub card: Rect,
}

impl Measurement {
    pub fn new(wrapper: Size, card: Rect) -> Self {
        Self { wrapper, card }
    }

    /// A card that fills its wrapper exactly.
    pub fn filled(width: f64, height: f64) -> Self {
        Self {
            wrapper: Size::new(width, height),
            card: Rect::new(0.0, 0.0, width, height),
        }
    }
}

/// Maps item ids to their latest measurement.
#[derive(Debug, Clone, Default)]
pub struct GeometryRegistry {
    entries: HashMap<ItemId, Measurement>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement. Returns true if it differs from the previous one.
    pub fn insert(&mut self, id: ItemId, measurement: Measurement) -> bool {
        self.entries.insert(id, measurement) != Some(measurement)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Measurement> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<Measurement> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drop measurements of items that no longer exist.
    pub fn retain_ids(&mut self, keep: impl Fn(&ItemId) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
