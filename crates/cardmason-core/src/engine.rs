//! Masonry engine: the drag/reorder orchestrator.
//!
//! [`MasonryEngine`] owns the items store, the measured geometry, the cursor
//! tracker and the scroll lock, and derives the layout and the ghost from
//! them. Hosts feed it input, measurements and window notifications, call
//! [`MasonryEngine::recompute`] after mutations, render [`MasonryEngine::frame`]
//! and drain lifecycle events with [`MasonryEngine::poll_events`].
//!
//! # Drag lifecycle
//!
//! `idle -> pressed -> (threshold | long press) -> dragging -> (hover -> reorder)* -> released -> idle`
//!
//! Reorders happen while dragging, at most once per hover-target change and
//! never during the cooldown that follows a reorder. The `Rearranged` event
//! is queued only once the drag has ended, and only if the dragged item's
//! order differs from the order it had when the drag started.

use crate::config::MasonryConfig;
use crate::geometry::{GeometryRegistry, Measurement};
use crate::ghost::{Ghost, derive_ghost, grab_offset};
use crate::input::{CursorTracker, Gesture, PointerEvent};
use crate::items::{Item, ItemId, ItemSource, ItemsStore};
use crate::layout::{Layout, LayoutElement, LayoutResult, column_count, compute_layout, transition_for};
use crate::scroll_lock::{DocumentStyle, MemoryDocumentStyle, ScrollLock};
use kurbo::{Point, Size, Vec2};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// State of the drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub dragging: bool,
    /// Current index of the dragged item (follows reorders).
    pub drag_item_index: usize,
    pub drag_item_id: ItemId,
    /// Latest pointer position.
    pub drag_point: Point,
    /// Pointer offset inside the card at drag start.
    pub grab_offset: Vec2,
    pub drag_item_prev_order: i64,
    /// Order taken at the latest reorder, if any.
    pub drag_item_new_order: Option<i64>,
    /// A reorder is settling; further reorders wait.
    pub is_rearranging: bool,
    /// Item under the pointer at the last hover evaluation.
    pub over_item_id: Option<ItemId>,
}

/// Lifecycle events raised by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MasonryEvent {
    /// A drag ended with the dragged item in a new slot.
    Rearranged {
        item: Item,
        new_order: i64,
        items: Vec<Item>,
    },
    /// The endline sensor scrolled into view with `elements` items laid out.
    EndlineEntered { elements: usize },
    /// The viewport width changed.
    WidthResized { width: f64 },
    /// Press and release without a drag.
    ItemClicked { id: ItemId, index: usize },
}

/// Render props for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFrame {
    pub item: Item,
    /// `None` until the item has been measured and laid out.
    pub layout_element: Option<LayoutElement>,
    pub transition: bool,
    pub layout_is_mount: bool,
    /// The ghost is standing in for this item.
    pub is_dragged: bool,
}

/// Header props, present once the layout is mounted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderFrame {
    pub width: f64,
    pub content: String,
}

/// Endline sensor anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndlineAnchors {
    pub start: Point,
    pub end: Point,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub items: Vec<ItemFrame>,
    pub width: f64,
    pub height: f64,
    pub transition: bool,
    pub layout_is_mount: bool,
    pub ghost: Ghost,
    pub header: Option<HeaderFrame>,
    pub endline: Option<EndlineAnchors>,
}

/// The masonry layout and drag engine.
#[derive(Debug)]
pub struct MasonryEngine<D: DocumentStyle = MemoryDocumentStyle> {
    config: MasonryConfig,
    store: ItemsStore,
    registry: GeometryRegistry,
    tracker: CursorTracker,
    scroll_lock: ScrollLock<D>,
    layout: Layout,
    /// Ids placed by the current layout.
    laid_out_ids: HashSet<ItemId>,
    /// Width of the element the grid is laid out in.
    wrapper_width: f64,
    /// Window size; its width is compared on resize.
    viewport: Size,
    /// Viewport-relative top of the grid, from the host's last reading.
    wrapper_top: Option<f64>,
    drag: Option<DragState>,
    ghost: Ghost,
    cooldown_until: Option<Instant>,
    transition: bool,
    layout_is_mount: bool,
    needs_layout: bool,
    pending_viewport: Option<Size>,
    /// Next successful layout was caused by a resize.
    resize_settling: bool,
    load_count: u64,
    error_count: u64,
    /// Element count at the last endline firing.
    endline_elements: usize,
    attached: bool,
    events: Vec<MasonryEvent>,
}

impl MasonryEngine<MemoryDocumentStyle> {
    /// Engine with an in-memory document style (tests, headless hosts).
    pub fn headless(config: MasonryConfig, viewport: Size) -> Self {
        Self::new(config, MemoryDocumentStyle::new(), viewport)
    }
}

impl<D: DocumentStyle> MasonryEngine<D> {
    /// Create an engine. The document's current scroll style is captured here
    /// and restored whenever the scroll lock is released.
    pub fn new(config: MasonryConfig, document: D, viewport: Size) -> Self {
        let ghost = Ghost::inactive(config.ghost_transition());
        Self {
            tracker: CursorTracker::new(config.gestures.clone()),
            scroll_lock: ScrollLock::new(document),
            config,
            store: ItemsStore::new(),
            registry: GeometryRegistry::new(),
            layout: Layout::empty(),
            laid_out_ids: HashSet::new(),
            wrapper_width: viewport.width,
            viewport,
            wrapper_top: None,
            drag: None,
            ghost,
            cooldown_until: None,
            transition: false,
            layout_is_mount: false,
            needs_layout: true,
            pending_viewport: None,
            resize_settling: false,
            load_count: 0,
            error_count: 0,
            endline_elements: 0,
            attached: true,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    /// Items sorted by order.
    pub fn items(&self) -> &[Item] {
        self.store.items()
    }

    pub fn store(&self) -> &ItemsStore {
        &self.store
    }

    pub fn registry(&self) -> &GeometryRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn ghost(&self) -> &Ghost {
        &self.ghost
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|drag| drag.dragging)
    }

    pub fn tracker(&self) -> &CursorTracker {
        &self.tracker
    }

    pub fn scroll_lock(&self) -> &ScrollLock<D> {
        &self.scroll_lock
    }

    pub fn columns(&self) -> usize {
        self.layout.columns
    }

    pub fn transition(&self) -> bool {
        self.transition
    }

    pub fn layout_is_mount(&self) -> bool {
        self.layout_is_mount
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn load_count(&self) -> u64 {
        self.load_count
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Replace the children. Known ids keep uncommitted local order.
    pub fn set_children(&mut self, children: impl IntoIterator<Item = ItemSource>) {
        self.store.sync(children);
        let store = &self.store;
        self.registry.retain_ids(|id| store.find(id).is_some());

        if let Some(drag) = self.drag.as_mut() {
            match self.store.position_of(&drag.drag_item_id) {
                Some(index) => drag.drag_item_index = index,
                None => {
                    log::warn!("Dragged item {} was removed, cancelling drag", drag.drag_item_id);
                    self.tracker.clear();
                    self.drag = None;
                    self.cooldown_until = None;
                    self.refresh_ghost();
                    self.release_scroll_lock();
                }
            }
        }
        self.needs_layout = true;
    }

    /// Record the measured geometry of an item.
    pub fn measure(&mut self, id: ItemId, measurement: Measurement) {
        if self.registry.insert(id, measurement) {
            self.needs_layout = true;
        }
    }

    /// Width of the element the grid lives in.
    pub fn set_wrapper_width(&mut self, width: f64) {
        if width != self.wrapper_width {
            self.wrapper_width = width;
            self.needs_layout = true;
        }
    }

    /// An item's content finished loading; its size may have changed.
    pub fn item_loaded(&mut self, id: &ItemId) {
        self.load_count += 1;
        log::debug!("Item {} loaded ({} total)", id, self.load_count);
        self.needs_layout = true;
    }

    /// An item's content failed to load. The item stays in the grid.
    pub fn item_failed(&mut self, id: &ItemId) {
        self.error_count += 1;
        log::warn!("Can't load item {} ({} failures)", id, self.error_count);
        self.needs_layout = true;
    }

    /// Window resized. Settled on the next [`recompute`](Self::recompute).
    pub fn on_resize(&mut self, viewport: Size) {
        if !self.attached {
            return;
        }
        self.pending_viewport = Some(viewport);
        self.needs_layout = true;
    }

    /// Grid top relative to the viewport as read by the host before a layout
    /// pass. The endline is checked on the next [`recompute`](Self::recompute),
    /// so a first page that fits the viewport still asks for more.
    pub fn set_wrapper_top(&mut self, wrapper_top: f64) {
        if !self.attached {
            return;
        }
        self.wrapper_top = Some(wrapper_top);
    }

    /// Window scrolled; `wrapper_top` is the grid's top relative to the viewport.
    pub fn on_scroll(&mut self, wrapper_top: f64) {
        if !self.attached {
            return;
        }
        self.wrapper_top = Some(wrapper_top);
        self.check_endline();
    }

    /// Feed a pointer event.
    pub fn handle_input(&mut self, event: PointerEvent, now: Instant) {
        let event = self.resolve_press_target(event);
        let gestures = self.tracker.handle(&event, now);
        self.apply_gestures(gestures, now);
        self.release_scroll_lock();
    }

    /// Advance timers: scroll lock, long press and reorder cooldown.
    pub fn tick(&mut self, now: Instant) {
        let gestures = self.tracker.poll(now);
        self.apply_gestures(gestures, now);

        if self.cooldown_until.is_some_and(|until| until <= now) {
            self.cooldown_until = None;
            if let Some(drag) = self.drag.as_mut() {
                drag.is_rearranging = false;
            }
            log::trace!("Reorder cooldown over");
            self.update_hover(now);
        }
        self.release_scroll_lock();
    }

    /// Recompute columns and layout if anything they depend on changed.
    ///
    /// Returns `Ok(true)` when a new layout was produced. On a missing
    /// measurement the previous layout is kept and the engine stays dirty.
    pub fn recompute(&mut self) -> LayoutResult<bool> {
        if !self.needs_layout {
            return Ok(false);
        }

        if let Some(viewport) = self.pending_viewport.take() {
            if viewport.width != self.viewport.width {
                log::info!("Viewport width changed {} -> {}", self.viewport.width, viewport.width);
                self.events.push(MasonryEvent::WidthResized { width: viewport.width });
            }
            self.viewport = viewport;
            self.resize_settling = true;
        }

        let result = column_count(self.wrapper_width, self.store.items(), &self.registry)
            .and_then(|columns| compute_layout(self.store.items(), columns, &self.registry));
        let layout = match result {
            Ok(layout) => layout,
            Err(err) => {
                log::warn!("Layout pass skipped: {}", err);
                return Err(err);
            }
        };

        let ids = self.store.ids();
        self.transition = self.resize_settling || transition_for(&self.laid_out_ids, &ids);
        self.resize_settling = false;
        self.laid_out_ids = ids;
        self.layout = layout;
        self.needs_layout = false;

        if !self.layout_is_mount && self.layout.height > 0.0 {
            log::info!("Layout mounted with {} items", self.layout.len());
            self.layout_is_mount = true;
        }

        self.refresh_ghost();
        self.check_endline();
        Ok(true)
    }

    /// Render props for the current state.
    pub fn frame(&self) -> Frame {
        let positions: HashMap<&ItemId, usize> = self
            .layout
            .ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();
        let dragged = self
            .drag
            .as_ref()
            .filter(|drag| drag.dragging)
            .map(|drag| &drag.drag_item_id);

        let items = self
            .store
            .items()
            .iter()
            .map(|item| ItemFrame {
                item: item.clone(),
                layout_element: positions
                    .get(&item.id)
                    .and_then(|&index| self.layout.element(index))
                    .copied(),
                transition: self.transition,
                layout_is_mount: self.layout_is_mount,
                is_dragged: dragged == Some(&item.id),
            })
            .collect();

        let header = self
            .config
            .header
            .as_ref()
            .filter(|_| self.layout_is_mount)
            .map(|content| HeaderFrame {
                width: self.layout.width,
                content: content.clone(),
            });

        let endline = match (self.layout.endline.start, self.layout.endline.end) {
            (Some(start), Some(end)) => Some(EndlineAnchors { start, end }),
            _ => None,
        };

        Frame {
            items,
            width: self.layout.width,
            height: self.layout.height,
            transition: self.transition,
            layout_is_mount: self.layout_is_mount,
            ghost: self.ghost.clone(),
            header,
            endline,
        }
    }

    /// Drain queued lifecycle events.
    pub fn poll_events(&mut self) -> Vec<MasonryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Detach: drop timers and drag state, restore page scroll, and ignore
    /// further window notifications.
    pub fn teardown(&mut self) {
        log::info!("Masonry engine torn down");
        self.attached = false;
        self.tracker.clear();
        self.drag = None;
        self.cooldown_until = None;
        self.refresh_ghost();
        self.scroll_lock.force_release();
    }

    /// Fill in the pressed item from the layout when the host did not.
    fn resolve_press_target(&self, event: PointerEvent) -> PointerEvent {
        let resolve = |position: Point| {
            self.layout
                .item_at(position, None)
                .and_then(|id| self.store.position_of(id))
        };
        match event {
            PointerEvent::MouseDown {
                position,
                item_index: None,
            } => PointerEvent::MouseDown {
                position,
                item_index: resolve(position),
            },
            PointerEvent::TouchStart {
                position,
                item_index: None,
                fingers,
            } => PointerEvent::TouchStart {
                position,
                item_index: resolve(position),
                fingers,
            },
            other => other,
        }
    }

    fn apply_gestures(&mut self, gestures: Vec<Gesture>, now: Instant) {
        for gesture in gestures {
            match gesture {
                Gesture::ScrollLock => self.scroll_lock.lock(),
                Gesture::DragStart {
                    item_index,
                    origin,
                    position,
                    trigger,
                } => {
                    log::debug!("Drag start on item {} via {:?}", item_index, trigger);
                    self.start_drag(item_index, origin, position, now);
                }
                Gesture::DragMove { position } => self.drag_to(position, now),
                Gesture::DragEnd { position } => {
                    if let Some(drag) = self.drag.as_mut() {
                        drag.drag_point = position;
                    }
                    self.finish_drag();
                }
                Gesture::DragCancel => self.finish_drag(),
                Gesture::Click { item_index, .. } => {
                    if let Some(item) = self.store.get(item_index) {
                        self.events.push(MasonryEvent::ItemClicked {
                            id: item.id.clone(),
                            index: item_index,
                        });
                    }
                }
            }
        }
    }

    fn start_drag(&mut self, item_index: usize, origin: Point, position: Point, now: Instant) {
        let Some(item) = self.store.get(item_index) else {
            log::warn!("Drag started on unknown item index {}", item_index);
            self.tracker.clear();
            return;
        };
        let grab = self
            .layout
            .element_of(&item.id)
            .map_or(Vec2::ZERO, |element| grab_offset(origin, element));

        log::info!("Dragging {} (order {})", item.id, item.order);
        self.drag = Some(DragState {
            dragging: true,
            drag_item_index: item_index,
            drag_item_id: item.id.clone(),
            drag_point: position,
            grab_offset: grab,
            drag_item_prev_order: item.order,
            drag_item_new_order: None,
            is_rearranging: false,
            over_item_id: None,
        });
        self.refresh_ghost();
        self.update_hover(now);
    }

    fn drag_to(&mut self, position: Point, now: Instant) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.drag_point = position;
        self.refresh_ghost();
        self.update_hover(now);
    }

    /// Reorder against the item under the pointer if the hover target
    /// changed and no cooldown is running.
    fn update_hover(&mut self, now: Instant) {
        if self.cooldown_until.is_some() {
            return;
        }
        let Some(drag) = self.drag.as_ref() else {
            return;
        };
        let over = self
            .layout
            .item_at(drag.drag_point, Some(&drag.drag_item_id))
            .cloned();
        if over == drag.over_item_id {
            return;
        }
        let from = drag.drag_item_index;
        let dragged_id = drag.drag_item_id.clone();

        let target = over
            .as_ref()
            .and_then(|id| self.store.position_of(id))
            .and_then(|index| self.store.get(index).map(|item| (index, item.order)));

        let mut reordered = None;
        if let Some((over_index, over_order)) = target
            && self.store.reorder(from, over_index)
        {
            log::debug!("Moved {} to order {}", dragged_id, over_order);
            reordered = Some(over_order);
        }

        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.over_item_id = over;
        if let Some(new_order) = reordered {
            drag.drag_item_index = self.store.position_of(&dragged_id).unwrap_or(from);
            drag.drag_item_new_order = Some(new_order);
            drag.is_rearranging = true;
            self.cooldown_until = Some(now + self.config.reorder_cooldown());
            self.needs_layout = true;
            // Later hit tests must see the new positions.
            if let Err(err) = self.recompute() {
                log::warn!("Layout after reorder failed: {}", err);
            }
        }
    }

    fn finish_drag(&mut self) {
        self.cooldown_until = None;
        let Some(drag) = self.drag.take() else {
            return;
        };
        self.refresh_ghost();
        log::info!("Drag of {} ended", drag.drag_item_id);

        if let Some(new_order) = drag.drag_item_new_order
            && new_order != drag.drag_item_prev_order
            && let Some(item) = self.store.find(&drag.drag_item_id)
        {
            self.events.push(MasonryEvent::Rearranged {
                item: item.clone(),
                new_order,
                items: self.store.items().to_vec(),
            });
        }
    }

    fn refresh_ghost(&mut self) {
        self.ghost = derive_ghost(self.drag.as_ref(), &self.layout, &self.config);
    }

    fn release_scroll_lock(&mut self) {
        self.scroll_lock
            .release(self.tracker.touch_active(), self.ghost.is_active);
    }

    /// Queue `EndlineEntered` once per growth of the laid out item count.
    fn check_endline(&mut self) {
        if !self.attached {
            return;
        }
        let (Some(top), Some(start)) = (self.wrapper_top, self.layout.endline.start) else {
            return;
        };
        let elements = self.layout.len();
        if top + start.y - self.viewport.height <= 0.0 && self.endline_elements != elements {
            log::debug!("Endline entered with {} elements", elements);
            self.endline_elements = elements;
            self.events.push(MasonryEvent::EndlineEntered { elements });
        }
    }
}
