//! Masonry layout calculator.
//!
//! Places items column by column: every card goes to the currently shortest
//! column, separators span the full width and level all columns. The result
//! is a pure function of the items, the column count and the measured
//! geometry, so recomputing with unchanged inputs yields the same layout.

use crate::geometry::GeometryRegistry;
use crate::items::{Item, ItemId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Layout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("No measurement recorded for item {0}")]
    MissingMeasurement(ItemId),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Computed placement of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Wrapper origin in layout coordinates.
    pub x: f64,
    pub y: f64,
    pub card_width: f64,
    pub card_height: f64,
    /// Card offset inside its wrapper.
    pub card_offset_left: f64,
    pub card_offset_top: f64,
    /// Wrapper footprint (column pitch x slot height).
    pub wrapper: Size,
}

impl LayoutElement {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Slot occupied by the wrapper.
    pub fn wrapper_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.wrapper)
    }

    /// Visible card box in layout coordinates.
    pub fn card_rect(&self) -> Rect {
        Rect::from_origin_size(
            Point::new(self.x + self.card_offset_left, self.y + self.card_offset_top),
            Size::new(self.card_width, self.card_height),
        )
    }
}

/// Column fill state and the sensor anchors derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endline {
    /// Bottom of the shortest column: where the next card lands.
    pub start: Option<Point>,
    /// Bottom of the tallest column.
    pub end: Option<Point>,
    /// Filled height per column.
    pub by_columns: Vec<f64>,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Placements indexed by item index.
    pub elements: Vec<LayoutElement>,
    /// Id of the item placed at each element.
    pub ids: Vec<ItemId>,
    pub columns: usize,
    pub column_width: f64,
    pub width: f64,
    pub height: f64,
    pub endline: Endline,
}

impl Layout {
    /// Layout of an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn element(&self, index: usize) -> Option<&LayoutElement> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Placement of the item with the given id.
    pub fn element_of(&self, id: &ItemId) -> Option<&LayoutElement> {
        self.ids
            .iter()
            .position(|placed| placed == id)
            .and_then(|index| self.elements.get(index))
    }

    /// Id of the item whose wrapper contains `point`, skipping `exclude`.
    pub fn item_at(&self, point: Point, exclude: Option<&ItemId>) -> Option<&ItemId> {
        self.ids
            .iter()
            .zip(&self.elements)
            .filter(|(id, _)| Some(*id) != exclude)
            .find(|(_, element)| element.wrapper_rect().contains(point))
            .map(|(id, _)| id)
    }
}

/// Column pitch inferred from the first card: its fixed width, else its
/// measured wrapper width. `None` when there is no card at all.
pub fn column_width(items: &[Item], registry: &GeometryRegistry) -> LayoutResult<Option<f64>> {
    let Some(card) = items.iter().find(|item| !item.is_separator) else {
        return Ok(None);
    };
    let width = match card.width {
        Some(width) => width,
        None => {
            registry
                .get(&card.id)
                .ok_or_else(|| LayoutError::MissingMeasurement(card.id.clone()))?
                .wrapper
                .width
        }
    };
    Ok(Some(width.max(0.0)))
}

/// Number of columns that fit in `wrapper_width`.
///
/// Degenerate inputs collapse to a single column instead of failing: no
/// cards, a zero-width card, or a wrapper narrower than one card.
pub fn column_count(
    wrapper_width: f64,
    items: &[Item],
    registry: &GeometryRegistry,
) -> LayoutResult<usize> {
    if items.is_empty() {
        return Ok(0);
    }
    let columns = match column_width(items, registry)? {
        Some(width) if width > 0.0 && wrapper_width.is_finite() => {
            (wrapper_width / width).floor().max(0.0) as usize
        }
        _ => 1,
    };
    Ok(columns.max(1))
}

/// Place `items` (sorted by order) into `columns` columns.
pub fn compute_layout(
    items: &[Item],
    columns: usize,
    registry: &GeometryRegistry,
) -> LayoutResult<Layout> {
    if items.is_empty() {
        return Ok(Layout::empty());
    }
    let columns = columns.max(1);
    let column_width = column_width(items, registry)?.unwrap_or(0.0);
    let mut by_columns = vec![0.0_f64; columns];
    let mut elements = Vec::with_capacity(items.len());
    let mut ids = Vec::with_capacity(items.len());

    for item in items {
        let measured = registry
            .get(&item.id)
            .ok_or_else(|| LayoutError::MissingMeasurement(item.id.clone()))?;
        let height = item.height.unwrap_or(measured.wrapper.height);
        let card_width = item.width.unwrap_or(measured.card.width());
        let card_height = item.height.unwrap_or(measured.card.height());

        let (x, y, wrapper_width) = if item.is_separator {
            let y = by_columns[extreme_index(&by_columns, |a, b| a > b)];
            by_columns.fill(y + height);
            (0.0, y, item.width.unwrap_or(measured.wrapper.width))
        } else {
            let column = extreme_index(&by_columns, |a, b| a < b);
            let y = by_columns[column];
            by_columns[column] += height;
            (column as f64 * column_width, y, column_width)
        };

        elements.push(LayoutElement {
            x,
            y,
            card_width,
            card_height,
            card_offset_left: measured.card.x0,
            card_offset_top: measured.card.y0,
            wrapper: Size::new(wrapper_width, height),
        });
        ids.push(item.id.clone());
    }

    let shortest = extreme_index(&by_columns, |a, b| a < b);
    let tallest = extreme_index(&by_columns, |a, b| a > b);
    let endline = Endline {
        start: Some(Point::new(column_width * shortest as f64, by_columns[shortest])),
        end: Some(Point::new(column_width * tallest as f64, by_columns[tallest])),
        by_columns,
    };
    let height = endline.end.map_or(0.0, |end| end.y);

    log::debug!(
        "Layout pass: {} items, {} columns of {}px, height {}",
        elements.len(),
        columns,
        column_width,
        height
    );

    Ok(Layout {
        elements,
        ids,
        columns,
        column_width,
        width: column_width * columns as f64,
        height,
        endline,
    })
}

/// Whether a layout change should animate.
///
/// Arrivals are silent (appended pages must not re-animate existing cards);
/// rearrangements and removals animate. An update that keeps the count but
/// swaps in a new id counts as an arrival.
pub fn transition_for(previous: &HashSet<ItemId>, current: &HashSet<ItemId>) -> bool {
    use std::cmp::Ordering;
    match current.len().cmp(&previous.len()) {
        Ordering::Greater => false,
        Ordering::Equal => current.is_subset(previous),
        Ordering::Less => true,
    }
}

/// First index whose value beats every other under `better`.
fn extreme_index(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (index, &value) in values.iter().enumerate().skip(1) {
        if better(value, values[best]) {
            best = index;
        }
    }
    best
}
