//! Inline styles for the DOM leaf components.

use crate::renderer::{RenderContext, RenderResult, Renderer};
use cardmason_core::engine::ItemFrame;
use cardmason_core::items::ItemId;
use kurbo::Point;

/// Key of the bounding box that holds every card.
pub const BOUNDARY_KEY: &str = "masonry-boundary";
/// Key of the header above the bounding box.
pub const HEADER_KEY: &str = "masonry-header";
/// Key of the floating ghost.
pub const GHOST_KEY: &str = "masonry-ghost";
/// Keys of the two endline sensors.
pub const ENDLINE_START_KEY: &str = "endline-start";
pub const ENDLINE_END_KEY: &str = "endline-end";

const GHOST_Z_INDEX: &str = "1000";

/// One DOM element and the inline style it should carry.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledNode {
    pub key: String,
    pub style: Vec<(&'static str, String)>,
}

impl StyledNode {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            style: Vec::new(),
        }
    }

    fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.style.push((property, value.into()));
        self
    }

    /// Value of a property, if set.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }

    /// `style` attribute text.
    pub fn css_text(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Renders a frame into inline styles keyed by DOM key.
#[derive(Debug, Default)]
pub struct CssRenderer {
    nodes: Vec<StyledNode>,
}

impl CssRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes from the last [`build_scene`](Renderer::build_scene).
    pub fn nodes(&self) -> &[StyledNode] {
        &self.nodes
    }

    pub fn node(&self, key: &str) -> Option<&StyledNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    /// Style of an item's wrapper.
    pub fn item(&self, id: &ItemId) -> Option<&StyledNode> {
        self.node(&id.wrapper_key())
    }

    fn item_node(item: &ItemFrame, transition: &str) -> StyledNode {
        let node = StyledNode::new(item.item.id.wrapper_key()).set("position", "absolute");
        let Some(element) = item.layout_element else {
            // Not measured yet: keep it out of sight rather than at the origin.
            return node.set("visibility", "hidden");
        };
        node.set("width", px(element.wrapper.width))
            .set("height", px(element.wrapper.height))
            .set("transform", translate(element.origin()))
            .set("transition", transition)
            .set("visibility", if item.is_dragged { "hidden" } else { "visible" })
    }
}

impl Renderer for CssRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let frame = ctx.frame;
        let layout_transition = ctx.layout_transition();
        let transform_transition = layout_transition
            .as_ref()
            .map_or_else(|| "none".to_string(), |transition| transition.css("transform"));

        let mut nodes = Vec::with_capacity(frame.items.len() + 5);

        if let Some(header) = &frame.header {
            nodes.push(StyledNode::new(HEADER_KEY).set("width", px(header.width)));
        }

        let box_transition = layout_transition.as_ref().map_or_else(
            || "none".to_string(),
            |transition| format!("{}, {}", transition.css("width"), transition.css("height")),
        );
        nodes.push(
            StyledNode::new(BOUNDARY_KEY)
                .set("position", "relative")
                .set("width", px(frame.width))
                .set("height", px(frame.height))
                .set("transition", box_transition),
        );

        nodes.extend(
            frame
                .items
                .iter()
                .map(|item| Self::item_node(item, &transform_transition)),
        );

        // Ghost and sensors are always emitted so a host that only writes the
        // emitted nodes also hides them.
        let ghost = &frame.ghost;
        nodes.push(if ghost.is_active {
            StyledNode::new(GHOST_KEY)
                .set("display", "block")
                .set("position", "absolute")
                .set("width", px(ghost.size.width))
                .set("height", px(ghost.size.height))
                .set("transform", translate(ghost.position))
                .set("transition", ghost.transition.css("transform"))
                .set("z-index", GHOST_Z_INDEX)
                .set("pointer-events", "none")
        } else {
            StyledNode::new(GHOST_KEY).set("display", "none")
        });

        let sensors = frame
            .endline
            .map(|endline| [endline.start, endline.end]);
        for (index, key) in [ENDLINE_START_KEY, ENDLINE_END_KEY].into_iter().enumerate() {
            nodes.push(match sensors {
                Some(points) => StyledNode::new(key)
                    .set("display", "block")
                    .set("position", "absolute")
                    .set("width", "1px")
                    .set("height", "1px")
                    .set("transform", translate(points[index])),
                None => StyledNode::new(key).set("display", "none"),
            });
        }

        log::trace!("CSS frame with {} nodes", nodes.len());
        self.nodes = nodes;
        Ok(())
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn translate(point: Point) -> String {
    format!("translate({}px, {}px)", point.x, point.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardmason_core::{ItemSource, MasonryConfig, MasonryEngine, Measurement, PointerEvent};
    use kurbo::Size;
    use std::time::Instant;

    fn engine() -> MasonryEngine {
        let mut engine = MasonryEngine::headless(MasonryConfig::default(), Size::new(200.0, 400.0));
        engine.set_wrapper_width(200.0);
        engine.set_children(vec![ItemSource::card("a"), ItemSource::card("b"), ItemSource::card("c")]);
        engine.measure("a".into(), Measurement::filled(100.0, 120.0));
        engine.measure("b".into(), Measurement::filled(100.0, 80.0));
        engine.measure("c".into(), Measurement::filled(100.0, 50.0));
        engine.recompute().unwrap();
        engine
    }

    fn render(engine: &MasonryEngine) -> CssRenderer {
        let frame = engine.frame();
        let mut renderer = CssRenderer::new();
        renderer
            .build_scene(&RenderContext::new(&frame, engine.config()))
            .unwrap();
        renderer
    }

    #[test]
    fn test_item_wrappers_are_translated() {
        let renderer = render(&engine());
        let c = renderer.item(&"c".into()).unwrap();
        assert_eq!(c.key, "c-wrapper");
        assert_eq!(c.get("transform"), Some("translate(100px, 80px)"));
        assert_eq!(c.get("height"), Some("50px"));
        // Initial layout never animates.
        assert_eq!(c.get("transition"), Some("none"));
    }

    #[test]
    fn test_boundary_and_endline() {
        let renderer = render(&engine());
        let boundary = renderer.node(BOUNDARY_KEY).unwrap();
        assert_eq!(boundary.get("width"), Some("200px"));
        assert_eq!(boundary.get("height"), Some("130px"));
        assert_eq!(
            renderer.node(ENDLINE_START_KEY).unwrap().get("transform"),
            Some("translate(0px, 120px)")
        );
        assert_eq!(
            renderer.node(ENDLINE_END_KEY).unwrap().get("transform"),
            Some("translate(100px, 130px)")
        );
        assert_eq!(renderer.node(GHOST_KEY).unwrap().css_text(), "display: none;");
        assert!(renderer.node(HEADER_KEY).is_none());
    }

    #[test]
    fn test_ghost_replaces_dragged_item() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.handle_input(
            PointerEvent::MouseDown {
                position: Point::new(10.0, 10.0),
                item_index: None,
            },
            t0,
        );
        engine.handle_input(
            PointerEvent::MouseMove {
                position: Point::new(10.0, 20.0),
            },
            t0,
        );
        let renderer = render(&engine);
        let ghost = renderer.node(GHOST_KEY).unwrap();
        assert_eq!(ghost.get("transform"), Some("translate(0px, 10px)"));
        assert_eq!(ghost.get("transition"), Some("transform 200ms ease"));
        assert_eq!(renderer.item(&"a".into()).unwrap().get("visibility"), Some("hidden"));
    }

    #[test]
    fn test_ghost_hidden_after_release() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.handle_input(
            PointerEvent::MouseDown {
                position: Point::new(10.0, 10.0),
                item_index: None,
            },
            t0,
        );
        engine.handle_input(
            PointerEvent::MouseMove {
                position: Point::new(20.0, 10.0),
            },
            t0,
        );
        assert_eq!(render(&engine).node(GHOST_KEY).unwrap().get("display"), Some("block"));

        engine.handle_input(
            PointerEvent::MouseUp {
                position: Point::new(20.0, 10.0),
            },
            t0,
        );
        let renderer = render(&engine);
        let ghost = renderer.node(GHOST_KEY).unwrap();
        assert_eq!(ghost.get("display"), Some("none"));
        assert_eq!(ghost.get("transform"), None);
        assert_eq!(renderer.item(&"a".into()).unwrap().get("visibility"), Some("visible"));
    }

    #[test]
    fn test_endline_hidden_without_layout() {
        let engine = MasonryEngine::headless(MasonryConfig::default(), Size::new(200.0, 400.0));
        let renderer = render(&engine);
        for key in [ENDLINE_START_KEY, ENDLINE_END_KEY] {
            assert_eq!(renderer.node(key).unwrap().get("display"), Some("none"));
        }
    }

    #[test]
    fn test_unmeasured_item_is_hidden() {
        let mut engine = engine();
        engine.set_children(vec![
            ItemSource::card("a"),
            ItemSource::card("b"),
            ItemSource::card("c"),
            ItemSource::card("d"),
        ]);
        assert!(engine.recompute().is_err());
        let renderer = render(&engine);
        let d = renderer.item(&"d".into()).unwrap();
        assert_eq!(d.get("visibility"), Some("hidden"));
        assert_eq!(d.get("transform"), None);
    }

    #[test]
    fn test_css_text() {
        let node = StyledNode::new("x").set("width", "10px").set("height", "5px");
        assert_eq!(node.css_text(), "width: 10px; height: 5px;");
    }
}
