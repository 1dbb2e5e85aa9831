//! WebAssembly entry point and DOM host.
//!
//! The page renders one element per DOM key (`"<id>-wrapper"` around `"<id>"`,
//! plus the boundary, ghost, header and endline nodes) and forwards window and
//! pointer events to [`WasmMasonry`]. Geometry is read back from the DOM and
//! styles are written straight onto the keyed elements.

use cardmason_core::{
    DocumentStyle, ItemSource, MasonryConfig, MasonryEngine, MasonryEvent, Measurement, PointerEvent,
    ScrollStyle,
};
use cardmason_render::{CssRenderer, RenderContext, Renderer};
use kurbo::{Point, Rect, Size};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};
use web_time::Instant;

const BOUNDARY_ID: &str = "masonry-boundary";

/// Initialize logging and panic reporting.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("cardmason (WASM) ready");
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document"))
}

fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// Viewport-relative top of the grid's bounding box.
fn boundary_top(document: &Document) -> Option<f64> {
    document
        .get_element_by_id(BOUNDARY_ID)
        .map(|boundary| boundary.get_bounding_client_rect().top())
}

fn viewport() -> Result<Size, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(Size::new(width, height))
}

/// `document.body.style` as the scroll lock target.
#[derive(Debug, Default)]
pub struct BodyStyle;

impl BodyStyle {
    fn body() -> Option<HtmlElement> {
        document().ok().and_then(|document| document.body())
    }
}

impl DocumentStyle for BodyStyle {
    fn read(&self) -> ScrollStyle {
        let Some(body) = Self::body() else {
            return ScrollStyle::default();
        };
        let style = body.style();
        ScrollStyle::new(
            style.get_property_value("overflow").unwrap_or_default(),
            style.get_property_value("overscroll-behavior-y").unwrap_or_default(),
        )
    }

    fn write(&mut self, scroll: &ScrollStyle) {
        let Some(body) = Self::body() else {
            log::warn!("No document body to apply scroll style to");
            return;
        };
        let style = body.style();
        if let Err(err) = style
            .set_property("overflow", &scroll.overflow)
            .and_then(|()| style.set_property("overscroll-behavior-y", &scroll.overscroll_behavior_y))
        {
            log::warn!("Can't set body scroll style: {:?}", err);
        }
    }
}

/// Masonry grid bound to the page's DOM.
#[wasm_bindgen]
pub struct WasmMasonry {
    engine: MasonryEngine<BodyStyle>,
    /// Element whose width the grid fills.
    container_id: String,
    renderer: CssRenderer,
    on_rearrange: Option<js_sys::Function>,
    on_endline_enter: Option<js_sys::Function>,
    on_width_resize: Option<js_sys::Function>,
    on_item_click: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl WasmMasonry {
    /// `config` is a `MasonryConfig` object; `undefined` takes the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config: JsValue) -> Result<WasmMasonry, JsValue> {
        let config: MasonryConfig = if config.is_undefined() || config.is_null() {
            MasonryConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config
            .validate()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let engine = MasonryEngine::new(config, BodyStyle, viewport()?);
        Ok(Self {
            engine,
            container_id: container_id.to_string(),
            renderer: CssRenderer::new(),
            on_rearrange: None,
            on_endline_enter: None,
            on_width_resize: None,
            on_item_click: None,
        })
    }

    /// Replace the children with an array of `ItemSource` objects.
    pub fn set_children(&mut self, children: JsValue) -> Result<(), JsValue> {
        let children: Vec<ItemSource> = serde_wasm_bindgen::from_value(children)?;
        self.engine.set_children(children);
        Ok(())
    }

    /// Read every item's geometry from the DOM. Returns false if some item
    /// is not in the document yet.
    pub fn measure(&mut self) -> Result<bool, JsValue> {
        let document = document()?;
        if let Some(container) = html_element(&document, &self.container_id) {
            self.engine.set_wrapper_width(f64::from(container.offset_width()));
        }

        let ids: Vec<_> = self.engine.items().iter().map(|item| item.id.clone()).collect();
        let mut complete = true;
        for id in ids {
            let (Some(wrapper), Some(card)) = (
                html_element(&document, &id.wrapper_key()),
                html_element(&document, id.as_str()),
            ) else {
                complete = false;
                continue;
            };
            let measurement = Measurement::new(
                Size::new(f64::from(wrapper.offset_width()), f64::from(wrapper.offset_height())),
                Rect::from_origin_size(
                    (f64::from(card.offset_left()), f64::from(card.offset_top())),
                    (f64::from(card.offset_width()), f64::from(card.offset_height())),
                ),
            );
            self.engine.measure(id, measurement);
        }
        Ok(complete)
    }

    pub fn item_loaded(&mut self, id: &str) {
        self.engine.item_loaded(&id.into());
    }

    pub fn item_failed(&mut self, id: &str) {
        self.engine.item_failed(&id.into());
    }

    /// Window `resize` listener.
    pub fn on_resize(&mut self) -> Result<(), JsValue> {
        self.engine.on_resize(viewport()?);
        Ok(())
    }

    /// Window `scroll` listener.
    pub fn on_scroll(&mut self) -> Result<(), JsValue> {
        if let Some(top) = boundary_top(&document()?) {
            self.engine.on_scroll(top);
        }
        self.dispatch_events()
    }

    /// Pointer handlers take client coordinates. `item_index` is the index
    /// of the pressed item, or `undefined` to hit-test the layout.
    pub fn mouse_down(&mut self, x: f64, y: f64, item_index: Option<usize>) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::MouseDown { position, item_index })
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::MouseMove { position })
    }

    pub fn mouse_up(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::MouseUp { position })
    }

    pub fn touch_start(
        &mut self,
        x: f64,
        y: f64,
        item_index: Option<usize>,
        fingers: usize,
    ) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::TouchStart {
            position,
            item_index,
            fingers,
        })
    }

    pub fn touch_move(&mut self, x: f64, y: f64, fingers: usize) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::TouchMove { position, fingers })
    }

    pub fn touch_end(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let position = self.to_grid(x, y)?;
        self.input(PointerEvent::TouchEnd { position })
    }

    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.input(PointerEvent::Cancel)
    }

    /// Call from `requestAnimationFrame` to fire timers.
    pub fn tick(&mut self) -> Result<(), JsValue> {
        self.engine.tick(Instant::now());
        self.dispatch_events()
    }

    /// Measure, lay out, write styles and dispatch callbacks.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.measure()?;
        if let Some(top) = boundary_top(&document()?) {
            self.engine.set_wrapper_top(top);
        }
        if let Err(err) = self.engine.recompute() {
            // Retried on the next render once the element is in the DOM.
            log::debug!("Layout deferred: {}", err);
        }

        let frame = self.engine.frame();
        self.renderer
            .build_scene(&RenderContext::new(&frame, self.engine.config()))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let document = document()?;
        for node in self.renderer.nodes() {
            let Some(element) = html_element(&document, &node.key) else {
                continue;
            };
            let style = element.style();
            for (property, value) in &node.style {
                style.set_property(property, value)?;
            }
        }

        self.dispatch_events()
    }

    /// Current frame as a plain object.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.engine.frame())?)
    }

    pub fn set_on_rearrange(&mut self, callback: Option<js_sys::Function>) {
        self.on_rearrange = callback;
    }

    pub fn set_on_endline_enter(&mut self, callback: Option<js_sys::Function>) {
        self.on_endline_enter = callback;
    }

    pub fn set_on_width_resize(&mut self, callback: Option<js_sys::Function>) {
        self.on_width_resize = callback;
    }

    pub fn set_on_item_click(&mut self, callback: Option<js_sys::Function>) {
        self.on_item_click = callback;
    }

    /// Detach from the page and restore its scroll style.
    pub fn teardown(&mut self) {
        self.engine.teardown();
    }
}

impl WasmMasonry {
    fn input(&mut self, event: PointerEvent) -> Result<(), JsValue> {
        self.engine.handle_input(event, Instant::now());
        self.dispatch_events()
    }

    /// Client coordinates to grid coordinates.
    fn to_grid(&self, x: f64, y: f64) -> Result<Point, JsValue> {
        let document = document()?;
        let origin = document
            .get_element_by_id(BOUNDARY_ID)
            .map(|boundary| {
                let rect = boundary.get_bounding_client_rect();
                Point::new(rect.left(), rect.top())
            })
            .unwrap_or(Point::ZERO);
        Ok(Point::new(x - origin.x, y - origin.y))
    }

    fn dispatch_events(&mut self) -> Result<(), JsValue> {
        for event in self.engine.poll_events() {
            let callback = match &event {
                MasonryEvent::Rearranged { .. } => &self.on_rearrange,
                MasonryEvent::EndlineEntered { .. } => &self.on_endline_enter,
                MasonryEvent::WidthResized { .. } => &self.on_width_resize,
                MasonryEvent::ItemClicked { .. } => &self.on_item_click,
            };
            if let Some(callback) = callback {
                callback.call1(&JsValue::NULL, &serde_wasm_bindgen::to_value(&event)?)?;
            }
        }
        Ok(())
    }
}
