//! Headless session replay and one-shot layout.

use crate::error::AppResult;
use crate::script::{Action, ScriptItem, SessionScript};
use cardmason_core::{
    Frame, GeometryRegistry, ItemsStore, Layout, MasonryConfig, MasonryEngine, MasonryEvent,
    column_count, compute_layout,
};
use cardmason_render::{CssRenderer, RenderContext, Renderer, SvgRenderer};
use kurbo::Size;
use serde::Serialize;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// A step whose layout pass failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutFailure {
    pub at_ms: u64,
    pub error: String,
}

/// An event and the time it was raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub event: MasonryEvent,
}

/// Inline style of one DOM node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CssEntry {
    pub key: String,
    pub style: String,
}

/// Outcome of a replayed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub events: Vec<TimedEvent>,
    pub layout_failures: Vec<LayoutFailure>,
    pub columns: usize,
    pub frame: Frame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<Vec<CssEntry>>,
}

/// Drives a [`MasonryEngine`] through a script.
pub struct Replay {
    engine: MasonryEngine,
    started: Instant,
    events: Vec<TimedEvent>,
    layout_failures: Vec<LayoutFailure>,
}

impl Replay {
    pub fn new(script: &SessionScript) -> Self {
        let mut engine = MasonryEngine::headless(script.config.clone(), script.viewport);
        engine.set_wrapper_width(script.wrapper_width());
        if let Some(wrapper_top) = script.wrapper_top {
            engine.set_wrapper_top(wrapper_top);
        }
        let mut replay = Self {
            engine,
            started: Instant::now(),
            events: Vec::new(),
            layout_failures: Vec::new(),
        };
        replay.load_children(&script.items);
        replay.settle(0);
        replay
    }

    /// Run every step of `script` and report.
    pub fn run(script: &SessionScript) -> Self {
        let mut replay = Self::new(script);
        for step in &script.steps {
            replay.apply(step.at_ms, &step.action);
        }
        replay
    }

    pub fn engine(&self) -> &MasonryEngine {
        &self.engine
    }

    /// Apply one action at `at_ms`.
    pub fn apply(&mut self, at_ms: u64, action: &Action) {
        let now = self.started + Duration::from_millis(at_ms);
        self.engine.tick(now);

        match action {
            Action::Pointer { event } => self.engine.handle_input(event.clone(), now),
            Action::Scroll { wrapper_top } => self.engine.on_scroll(*wrapper_top),
            Action::Resize {
                width,
                height,
                wrapper_width,
            } => {
                self.engine.on_resize(Size::new(*width, *height));
                self.engine.set_wrapper_width(wrapper_width.unwrap_or(*width));
            }
            Action::Loaded { id } => self.engine.item_loaded(id),
            Action::Failed { id } => self.engine.item_failed(id),
            Action::Children { items } => self.load_children(items),
            Action::Wait => {}
        }
        self.settle(at_ms);
    }

    /// Final report; `css` adds the inline styles of the final frame.
    pub fn report(&self, css: bool) -> AppResult<ReplayReport> {
        let frame = self.engine.frame();
        let css = if css {
            Some(render_css(&frame, self.engine.config())?)
        } else {
            None
        };
        Ok(ReplayReport {
            events: self.events.clone(),
            layout_failures: self.layout_failures.clone(),
            columns: self.engine.columns(),
            frame,
            css,
        })
    }

    /// SVG snapshot of the current frame.
    pub fn snapshot(&self) -> AppResult<String> {
        render_svg(&self.engine.frame(), self.engine.config())
    }

    fn load_children(&mut self, items: &[ScriptItem]) {
        log::debug!("Replay children: {} items", items.len());
        self.engine
            .set_children(items.iter().map(|item| item.source.clone()));
        for item in items {
            if let Some(measurement) = item.measurement() {
                self.engine.measure(item.source.id.clone(), measurement);
            }
        }
    }

    fn settle(&mut self, at_ms: u64) {
        if let Err(err) = self.engine.recompute() {
            self.layout_failures.push(LayoutFailure {
                at_ms,
                error: err.to_string(),
            });
        }
        self.events.extend(
            self.engine
                .poll_events()
                .into_iter()
                .map(|event| TimedEvent { at_ms, event }),
        );
    }
}

/// Inline styles of every node of `frame`.
pub fn render_css(frame: &Frame, config: &MasonryConfig) -> AppResult<Vec<CssEntry>> {
    let mut renderer = CssRenderer::new();
    renderer.build_scene(&RenderContext::new(frame, config))?;
    Ok(renderer
        .nodes()
        .iter()
        .map(|node| CssEntry {
            key: node.key.clone(),
            style: node.css_text(),
        })
        .collect())
}

pub fn render_svg(frame: &Frame, config: &MasonryConfig) -> AppResult<String> {
    let mut renderer = SvgRenderer::new();
    renderer.build_scene(&RenderContext::new(frame, config))?;
    Ok(renderer.into_document())
}

/// Lay out `items` once in a grid `wrapper_width` wide.
pub fn layout_once(items: &[ScriptItem], wrapper_width: f64) -> AppResult<Layout> {
    let store = ItemsStore::from_sources(items.iter().map(|item| item.source.clone()));
    let mut registry = GeometryRegistry::new();
    for item in items {
        if let Some(measurement) = item.measurement() {
            registry.insert(item.source.id.clone(), measurement);
        }
    }
    let columns = column_count(wrapper_width, store.items(), &registry)?;
    Ok(compute_layout(store.items(), columns, &registry)?)
}
