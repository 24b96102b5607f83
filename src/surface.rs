//! # Rendering Surface
//!
//! The capability set the renderer draws through. A surface knows how to
//! place text and lines on the current page and how to open a new page;
//! it knows nothing about parts, rows or aggregates.
//!
//! Coordinates are page points with the origin at the top-left corner and
//! y growing downward. Text is positioned by its baseline.

use crate::font::FontSpec;

pub trait RenderSurface {
    /// Draw `text` with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec);

    /// Width of `text` in points when drawn with `font`.
    fn measure_text_width(&self, text: &str, font: &FontSpec) -> f64 {
        font.measure(text)
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Finish the current page and continue on a fresh one.
    fn start_new_page(&mut self);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f64,
        y: f64,
        font: FontSpec,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    NewPage,
}

/// A surface that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawn strings in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pages touched so far, counting the initial page.
    pub fn page_count(&self) -> usize {
        1 + self
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::NewPage))
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: *font,
        });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2 });
    }

    fn start_new_page(&mut self) {
        self.ops.push(DrawOp::NewPage);
    }
}
