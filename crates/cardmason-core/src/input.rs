//! Cursor tracking for mouse and touch input.
//!
//! [`CursorTracker`] folds device events into a single [`Cursor`] and
//! classifies each press as a click, a threshold drag (mouse) or a long-press
//! drag (touch). Timers are deadlines checked against the `now` passed in,
//! so callers drive them from their own clock via [`CursorTracker::poll`].

use crate::config::GestureConfig;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Input device that owns the current pointer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerDevice {
    Mouse,
    Touch,
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in layout coordinates. `item_index` names the item under
/// the press; `None` lets the engine resolve it from the current layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    MouseDown {
        position: Point,
        #[serde(default)]
        item_index: Option<usize>,
    },
    MouseMove {
        position: Point,
    },
    MouseUp {
        position: Point,
    },
    TouchStart {
        position: Point,
        #[serde(default)]
        item_index: Option<usize>,
        fingers: usize,
    },
    TouchMove {
        position: Point,
        fingers: usize,
    },
    TouchEnd {
        position: Point,
    },
    /// Browser-initiated cancel (touchcancel, lost capture, blur).
    Cancel,
}

/// What turned a press into a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragTrigger {
    /// Mouse moved past the drag threshold.
    Threshold,
    /// Single finger held for the long-press delay.
    LongPress,
}

/// Classified gesture produced by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// A touch has been held long enough that page scrolling should stop.
    ScrollLock,
    DragStart {
        item_index: usize,
        /// Where the press started.
        origin: Point,
        position: Point,
        trigger: DragTrigger,
    },
    DragMove {
        position: Point,
    },
    DragEnd {
        position: Point,
    },
    DragCancel,
    Click {
        item_index: usize,
        position: Point,
    },
}

/// Snapshot of the active pointer. Exists only while a pointer is down.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub device: PointerDevice,
    pub pos: Point,
    pub initial_pos: Point,
    pub is_down: bool,
    /// Item under the initial press.
    pub item_index: usize,
    /// Concurrent fingers (touch only, 0 for mouse).
    pub num_fingers: usize,
    pub pressed_at: Instant,
}

impl Cursor {
    /// Travel since the press.
    pub fn delta(&self) -> Vec2 {
        self.pos - self.initial_pos
    }
}

/// Tracks the pointer session and its gesture timers.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    config: GestureConfig,
    cursor: Option<Cursor>,
    dragging: bool,
    /// Still eligible to end as a click/tap.
    tap_candidate: bool,
    scroll_lock_deadline: Option<Instant>,
    long_press_deadline: Option<Instant>,
}

impl CursorTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            cursor: None,
            dragging: false,
            tap_candidate: false,
            scroll_lock_deadline: None,
            long_press_deadline: None,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// A touch session is in progress.
    pub fn touch_active(&self) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(|cursor| cursor.device == PointerDevice::Touch)
    }

    /// A timer is armed and will fire on a later [`poll`](Self::poll).
    pub fn has_pending_timers(&self) -> bool {
        self.scroll_lock_deadline.is_some() || self.long_press_deadline.is_some()
    }

    /// Process one event. Timers due at `now` fire first.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> Vec<Gesture> {
        let mut out = self.poll(now);

        match *event {
            PointerEvent::MouseDown { position, item_index } => {
                if self.cursor.is_some() {
                    return out;
                }
                if let Some(item_index) = item_index {
                    self.press(PointerDevice::Mouse, position, item_index, 0, now);
                }
            }
            PointerEvent::MouseMove { position } => {
                let threshold = self.config.drag_threshold;
                let Some(cursor) = self.cursor.as_mut() else {
                    return out;
                };
                if cursor.device != PointerDevice::Mouse || !cursor.is_down {
                    return out;
                }
                cursor.pos = position;
                if self.dragging {
                    out.push(Gesture::DragMove { position });
                } else {
                    let delta = cursor.delta();
                    if delta.x.abs() >= threshold || delta.y.abs() >= threshold {
                        log::trace!("Mouse drag threshold crossed at {:?}", position);
                        self.dragging = true;
                        self.tap_candidate = false;
                        out.push(Gesture::DragStart {
                            item_index: cursor.item_index,
                            origin: cursor.initial_pos,
                            position,
                            trigger: DragTrigger::Threshold,
                        });
                    }
                }
            }
            PointerEvent::MouseUp { position } => {
                if self
                    .cursor
                    .as_ref()
                    .is_some_and(|cursor| cursor.device == PointerDevice::Mouse)
                {
                    self.release(position, &mut out);
                }
            }
            PointerEvent::TouchStart {
                position,
                item_index,
                fingers,
            } => match self.cursor.as_mut() {
                None => {
                    if let Some(item_index) = item_index {
                        self.press(PointerDevice::Touch, position, item_index, fingers, now);
                    }
                }
                Some(cursor) if cursor.device == PointerDevice::Touch => {
                    cursor.num_fingers = fingers;
                    self.on_finger_count_changed(fingers);
                }
                Some(_) => {}
            },
            PointerEvent::TouchMove { position, fingers } => {
                let slop = self.config.long_press_slop;
                let Some(cursor) = self.cursor.as_mut() else {
                    return out;
                };
                if cursor.device != PointerDevice::Touch {
                    return out;
                }
                cursor.pos = position;
                cursor.num_fingers = fingers;
                let moved_far = cursor.delta().hypot() > slop;
                if self.dragging {
                    out.push(Gesture::DragMove { position });
                } else {
                    self.on_finger_count_changed(fingers);
                    if moved_far && self.long_press_deadline.take().is_some() {
                        log::trace!("Touch moved past slop, long press abandoned");
                    }
                    if moved_far {
                        self.tap_candidate = false;
                    }
                }
            }
            PointerEvent::TouchEnd { position } => {
                if self.touch_active() {
                    self.release(position, &mut out);
                }
            }
            PointerEvent::Cancel => {
                if self.dragging {
                    out.push(Gesture::DragCancel);
                }
                self.clear();
            }
        }

        out
    }

    /// Fire timers that are due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Gesture> {
        let mut out = Vec::new();

        if self.scroll_lock_deadline.is_some_and(|deadline| deadline <= now) {
            self.scroll_lock_deadline = None;
            out.push(Gesture::ScrollLock);
        }

        if self.long_press_deadline.is_some_and(|deadline| deadline <= now) {
            self.long_press_deadline = None;
            if let Some(cursor) = self.cursor.as_ref()
                && cursor.device == PointerDevice::Touch
                && cursor.num_fingers == 1
                && !self.dragging
            {
                log::trace!("Long press fired for item {}", cursor.item_index);
                self.dragging = true;
                self.tap_candidate = false;
                out.push(Gesture::DragStart {
                    item_index: cursor.item_index,
                    origin: cursor.initial_pos,
                    position: cursor.pos,
                    trigger: DragTrigger::LongPress,
                });
            }
        }

        out
    }

    /// Drop the session and every pending timer.
    pub fn clear(&mut self) {
        self.cursor = None;
        self.dragging = false;
        self.tap_candidate = false;
        self.scroll_lock_deadline = None;
        self.long_press_deadline = None;
    }

    fn press(
        &mut self,
        device: PointerDevice,
        position: Point,
        item_index: usize,
        fingers: usize,
        now: Instant,
    ) {
        log::trace!("{:?} press on item {} at {:?}", device, item_index, position);
        self.cursor = Some(Cursor {
            device,
            pos: position,
            initial_pos: position,
            is_down: true,
            item_index,
            num_fingers: fingers,
            pressed_at: now,
        });
        self.dragging = false;
        self.tap_candidate = true;
        if device == PointerDevice::Touch {
            self.scroll_lock_deadline = Some(now + self.config.scroll_lock());
            self.long_press_deadline = (fingers == 1).then(|| now + self.config.long_press());
            self.tap_candidate = fingers == 1;
        }
    }

    fn on_finger_count_changed(&mut self, fingers: usize) {
        if fingers != 1 && !self.dragging {
            if self.long_press_deadline.take().is_some() {
                log::trace!("{} fingers down, long press cancelled", fingers);
            }
            self.tap_candidate = false;
        }
    }

    fn release(&mut self, position: Point, out: &mut Vec<Gesture>) {
        if self.dragging {
            out.push(Gesture::DragEnd { position });
        } else if self.tap_candidate
            && let Some(cursor) = self.cursor.as_ref()
        {
            out.push(Gesture::Click {
                item_index: cursor.item_index,
                position,
            });
        }
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn mouse_down(tracker: &mut CursorTracker, now: Instant) {
        tracker.handle(
            &PointerEvent::MouseDown {
                position: Point::new(10.0, 10.0),
                item_index: Some(2),
            },
            now,
        );
    }

    fn touch_start(tracker: &mut CursorTracker, fingers: usize, now: Instant) -> Vec<Gesture> {
        tracker.handle(
            &PointerEvent::TouchStart {
                position: Point::new(10.0, 10.0),
                item_index: Some(1),
                fingers,
            },
            now,
        )
    }

    fn starts_drag(gestures: &[Gesture]) -> bool {
        gestures.iter().any(|g| matches!(g, Gesture::DragStart { .. }))
    }

    #[test]
    fn test_mouse_press_records_cursor() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        let cursor = tracker.cursor().unwrap();
        assert!(cursor.is_down);
        assert_eq!(cursor.item_index, 2);
        assert_eq!(cursor.initial_pos, Point::new(10.0, 10.0));
        assert!(!tracker.has_pending_timers());
    }

    #[test]
    fn test_mouse_two_pixels_is_not_a_drag() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        let out = tracker.handle(&PointerEvent::MouseMove { position: Point::new(12.0, 8.0) }, t0);
        assert!(out.is_empty());
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_mouse_three_pixels_starts_drag() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        let out = tracker.handle(&PointerEvent::MouseMove { position: Point::new(10.0, 13.0) }, t0);
        assert_eq!(
            out,
            vec![Gesture::DragStart {
                item_index: 2,
                origin: Point::new(10.0, 10.0),
                position: Point::new(10.0, 13.0),
                trigger: DragTrigger::Threshold,
            }]
        );
        let out = tracker.handle(&PointerEvent::MouseMove { position: Point::new(40.0, 13.0) }, t0);
        assert_eq!(out, vec![Gesture::DragMove { position: Point::new(40.0, 13.0) }]);
    }

    #[test]
    fn test_mouse_release_without_drag_is_click() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        let out = tracker.handle(&PointerEvent::MouseUp { position: Point::new(11.0, 10.0) }, t0);
        assert_eq!(
            out,
            vec![Gesture::Click {
                item_index: 2,
                position: Point::new(11.0, 10.0)
            }]
        );
        assert!(tracker.cursor().is_none());
    }

    #[test]
    fn test_mouse_release_after_drag_ends_drag() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        tracker.handle(&PointerEvent::MouseMove { position: Point::new(30.0, 10.0) }, t0);
        let out = tracker.handle(&PointerEvent::MouseUp { position: Point::new(30.0, 10.0) }, t0);
        assert_eq!(out, vec![Gesture::DragEnd { position: Point::new(30.0, 10.0) }]);
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_press_outside_items_is_ignored() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        tracker.handle(
            &PointerEvent::MouseDown {
                position: Point::ZERO,
                item_index: None,
            },
            Instant::now(),
        );
        assert!(tracker.cursor().is_none());
    }

    #[test]
    fn test_long_press_timing() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        assert!(touch_start(&mut tracker, 1, t0).is_empty());

        let out = tracker.poll(t0 + ms(299));
        assert!(out.is_empty());
        let out = tracker.poll(t0 + ms(300));
        assert_eq!(out, vec![Gesture::ScrollLock]);

        assert!(!starts_drag(&tracker.poll(t0 + ms(499))));
        assert!(!tracker.is_dragging());
        let out = tracker.poll(t0 + ms(500));
        assert!(starts_drag(&out));
        assert!(tracker.is_dragging());
    }

    #[test]
    fn test_second_finger_cancels_long_press() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        touch_start(&mut tracker, 1, t0);
        touch_start(&mut tracker, 2, t0 + ms(200));
        assert!(!starts_drag(&tracker.poll(t0 + ms(800))));
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_two_finger_touch_never_arms_long_press() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        touch_start(&mut tracker, 2, t0);
        assert_eq!(tracker.poll(t0 + ms(1000)), vec![Gesture::ScrollLock]);
    }

    #[test]
    fn test_touch_scroll_abandons_long_press() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        touch_start(&mut tracker, 1, t0);
        tracker.handle(
            &PointerEvent::TouchMove {
                position: Point::new(10.0, 60.0),
                fingers: 1,
            },
            t0 + ms(100),
        );
        assert!(!starts_drag(&tracker.poll(t0 + ms(600))));
        let out = tracker.handle(&PointerEvent::TouchEnd { position: Point::new(10.0, 60.0) }, t0 + ms(700));
        assert!(out.is_empty());
    }

    #[test]
    fn test_release_clears_pending_timers() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        touch_start(&mut tracker, 1, t0);
        let out = tracker.handle(&PointerEvent::TouchEnd { position: Point::new(10.0, 10.0) }, t0 + ms(100));
        assert!(matches!(out.as_slice(), [Gesture::Click { item_index: 1, .. }]));
        assert!(!tracker.has_pending_timers());
        assert!(tracker.poll(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn test_event_after_deadline_fires_timer_first() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        touch_start(&mut tracker, 1, t0);
        let out = tracker.handle(&PointerEvent::TouchEnd { position: Point::new(10.0, 10.0) }, t0 + ms(600));
        assert!(matches!(
            out.as_slice(),
            [Gesture::ScrollLock, Gesture::DragStart { trigger: DragTrigger::LongPress, .. }, Gesture::DragEnd { .. }]
        ));
    }

    #[test]
    fn test_cancel_during_drag() {
        let mut tracker = CursorTracker::new(GestureConfig::default());
        let t0 = Instant::now();
        mouse_down(&mut tracker, t0);
        tracker.handle(&PointerEvent::MouseMove { position: Point::new(20.0, 10.0) }, t0);
        let out = tracker.handle(&PointerEvent::Cancel, t0);
        assert_eq!(out, vec![Gesture::DragCancel]);
        assert!(tracker.cursor().is_none());
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn test_event_json_shape() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"type":"mouse_down","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(
            event,
            PointerEvent::MouseDown {
                position: Point::new(1.0, 2.0),
                item_index: None
            }
        );
    }
}
