//! Static SVG snapshots of a frame.

use crate::renderer::{RenderContext, RenderResult, Renderer};
use std::fmt::Write;

const CARD_FILL: &str = "#e8eef7";
const CARD_STROKE: &str = "#4a6fa5";
const SEPARATOR_FILL: &str = "#d9d9d9";
const GHOST_STROKE: &str = "#3b82f6";
const ENDLINE_STROKE: &str = "#e4572e";

/// Renders a frame as an SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup from the last [`build_scene`](Renderer::build_scene).
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_document(self) -> String {
        self.document
    }
}

impl Renderer for SvgRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let frame = ctx.frame;
        let scale = ctx.scale_factor;
        let mut out = String::new();

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            frame.width * scale,
            frame.height * scale,
            frame.width,
            frame.height
        )?;
        if let Some(header) = &frame.header {
            writeln!(out, "  <title>{}</title>", escape(&header.content))?;
        }

        for item in &frame.items {
            let Some(element) = item.layout_element else {
                continue;
            };
            let card = element.card_rect();
            let fill = if item.item.is_separator { SEPARATOR_FILL } else { CARD_FILL };
            let opacity = if item.is_dragged { 0.3 } else { 1.0 };
            writeln!(
                out,
                r#"  <rect id="{}" x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" opacity="{}"/>"#,
                escape(&item.item.id.wrapper_key()),
                card.x0,
                card.y0,
                card.width(),
                card.height(),
                fill,
                CARD_STROKE,
                opacity
            )?;
            if ctx.show_labels {
                writeln!(
                    out,
                    r#"  <text x="{}" y="{}" font-size="12" font-family="sans-serif">{}</text>"#,
                    card.x0 + 4.0,
                    card.y0 + 14.0,
                    escape(item.item.id.as_str())
                )?;
            }
        }

        let ghost = &frame.ghost;
        if ghost.is_active {
            let rect = ghost.rect();
            writeln!(
                out,
                r#"  <rect id="masonry-ghost" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-dasharray="4 2"/>"#,
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                GHOST_STROKE
            )?;
        }

        if ctx.show_endline
            && let Some(endline) = frame.endline
        {
            writeln!(
                out,
                r#"  <line id="endline" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-dasharray="2 2"/>"#,
                endline.start.x, endline.start.y, endline.end.x, endline.end.y, ENDLINE_STROKE
            )?;
        }

        out.push_str("</svg>\n");
        log::debug!("SVG snapshot of {} items, {} bytes", frame.items.len(), out.len());
        self.document = out;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
