//! Ghost proxy shown in place of the dragged card.

use crate::config::{MasonryConfig, Transition};
use crate::engine::DragState;
use crate::items::ItemId;
use crate::layout::{Layout, LayoutElement};
use kurbo::{Point, Rect, Size, Vec2};
use serde::Serialize;

/// Floating copy of the dragged card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ghost {
    pub is_active: bool,
    pub item_id: Option<ItemId>,
    pub item_index: Option<usize>,
    /// Top-left corner in layout coordinates.
    pub position: Point,
    pub size: Size,
    /// Independent from the layout transition.
    pub transition: Transition,
}

impl Ghost {
    pub fn inactive(transition: Transition) -> Self {
        Self {
            is_active: false,
            item_id: None,
            item_index: None,
            position: Point::ZERO,
            size: Size::ZERO,
            transition,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// Offset of the grab point inside the card, so the ghost does not jump to
/// the pointer tip when the drag starts.
pub fn grab_offset(pointer: Point, element: &LayoutElement) -> Vec2 {
    pointer - element.card_rect().origin()
}

/// Derive the ghost from the current drag, if any.
pub fn derive_ghost(drag: Option<&DragState>, layout: &Layout, config: &MasonryConfig) -> Ghost {
    let transition = config.ghost_transition();
    let Some(drag) = drag.filter(|drag| drag.dragging) else {
        return Ghost::inactive(transition);
    };
    let size = layout
        .element_of(&drag.drag_item_id)
        .map_or(Size::ZERO, |element| Size::new(element.card_width, element.card_height));

    Ghost {
        is_active: true,
        item_id: Some(drag.drag_item_id.clone()),
        item_index: Some(drag.drag_item_index),
        position: drag.drag_point - drag.grab_offset,
        size,
        transition,
    }
}
