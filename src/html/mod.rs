//! # HTML Surface
//!
//! A [`RenderSurface`] that builds a standalone HTML preview. Each page is a
//! fixed-size `div`; text and lines are absolutely positioned inside it in
//! the same point coordinates the PDF surface uses, so the preview lines up
//! with the printed report.

use std::fmt::Write;

use crate::font::FontSpec;
use crate::schema::PageConfig;
use crate::surface::RenderSurface;

pub struct HtmlSurface {
    width: f64,
    height: f64,
    /// Markup of each page's children.
    pages: Vec<String>,
}

impl HtmlSurface {
    pub fn new(page: &PageConfig) -> Self {
        Self {
            width: page.width(),
            height: page.height(),
            pages: vec![String::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut String {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Wrap the pages into a complete HTML document.
    pub fn finish(self, title: Option<&str>) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        if let Some(title) = title {
            let _ = writeln!(html, "<title>{}</title>", escape_html(title));
        }
        html.push_str(
            "<style>\n\
             body { background: #e5e5e5; margin: 0; padding: 16pt 0; }\n\
             .page { position: relative; overflow: hidden; background: #fff; margin: 0 auto 16pt; \
             font-family: Helvetica, Arial, sans-serif; }\n\
             .page > div { position: absolute; white-space: pre; line-height: 1; }\n\
             </style>\n</head>\n<body>\n",
        );

        for content in &self.pages {
            let _ = writeln!(
                html,
                "<div class=\"page\" style=\"width: {:.2}pt; height: {:.2}pt\">",
                self.width, self.height
            );
            html.push_str(content);
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl RenderSurface for HtmlSurface {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec) {
        if text.is_empty() {
            return;
        }
        let mut style = format!(
            "left: {:.2}pt; top: {:.2}pt; font-size: {:.1}pt",
            x,
            y - font.size,
            font.size
        );
        if font.style.is_bold() {
            style.push_str("; font-weight: bold");
        }
        if font.style.is_italic() {
            style.push_str("; font-style: italic");
        }
        let _ = writeln!(self.current(), "<div style=\"{}\">{}</div>", style, escape_html(text));
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (left, right) = (x1.min(x2), x1.max(x2));
        let (top, bottom) = (y1.min(y2), y1.max(y2));
        let _ = writeln!(
            self.current(),
            "<div style=\"left: {:.2}pt; top: {:.2}pt; width: {:.2}pt; height: {:.2}pt; border-top: 1px solid #000\"></div>",
            left,
            top,
            right - left,
            bottom - top
        );
    }

    fn start_new_page(&mut self) {
        self.pages.push(String::new());
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
