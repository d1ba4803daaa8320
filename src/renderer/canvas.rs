//! Canvas 2D painter

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCommand, Frame};

/// Paints frames onto a `<canvas>` element
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
}

impl CanvasPainter {
    /// Grab the 2D context; without one painting is a logged no-op
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        if ctx.is_none() {
            log::error!("Canvas has no 2D context - nothing will be drawn");
        }
        Self { canvas, ctx }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn paint(&self, frame: &Frame) {
        let Some(ctx) = &self.ctx else { return };
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;

        for command in &frame.commands {
            match command {
                DrawCommand::Clear { color } => {
                    ctx.clear_rect(0.0, 0.0, width, height);
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(0.0, 0.0, width, height);
                }
                DrawCommand::StrokeRect {
                    min,
                    size,
                    color,
                    line_width,
                } => {
                    ctx.set_stroke_style_str(color);
                    ctx.set_line_width(*line_width as f64);
                    ctx.stroke_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.begin_path();
                    if ctx
                        .arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)
                        .is_ok()
                    {
                        ctx.set_fill_style_str(color);
                        ctx.fill();
                    }
                }
                DrawCommand::Text {
                    text,
                    pos,
                    size,
                    color,
                    align,
                } => {
                    ctx.set_font(&format!("{}px monospace", size.round()));
                    ctx.set_text_align(align.as_str());
                    ctx.set_fill_style_str(color);
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }
}
