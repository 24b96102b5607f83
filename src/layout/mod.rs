//! # Part Layout
//!
//! Draws one part at a time onto a [`RenderSurface`], top to bottom. The
//! renderer owns the vertical cursor: each part is checked against the
//! bottom margin before any of its elements are drawn, moved to a new page
//! if it does not fit, drawn at the cursor, and then the cursor advances by
//! the part's fixed height.
//!
//! Element geometry is always relative to the part: an element at
//! `(x, y)` in a part placed at `top` has its box at `(x, top + y)` and its
//! text baseline `fontSize` below that, whichever page the part lands on.

pub mod page_break;

use crate::aggregate::{format_amount, AggregateTable};
use crate::record::Record;
use crate::schema::{ElementDef, ElementKind, PageConfig, PartDef, PartName};
use crate::surface::RenderSurface;

use page_break::{decide_break, is_oversized, BreakDecision};

/// Gap between a text baseline and its underline.
const UNDERLINE_OFFSET: f64 = 2.0;

/// Where a part was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPart {
    pub part: PartName,
    /// Zero-based page index.
    pub page: usize,
    /// Top edge of the part on that page.
    pub y: f64,
}

/// The vertical layout position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f64,
}

/// A header re-printed at the top of every page opened by a page break.
struct RunningHeader<'a> {
    part: &'a PartDef,
    totals: &'a AggregateTable,
}

/// Draws parts onto a surface and tracks the cursor across pages.
pub struct PartRenderer<'a, S: RenderSurface + ?Sized> {
    surface: &'a mut S,
    page: &'a PageConfig,
    cursor: Cursor,
    running_header: Option<RunningHeader<'a>>,
    placed: Vec<PlacedPart>,
    warned_oversized: Vec<PartName>,
    warned_header_skipped: bool,
}

impl<'a, S: RenderSurface + ?Sized> PartRenderer<'a, S> {
    pub fn new(surface: &'a mut S, page: &'a PageConfig) -> Self {
        Self {
            surface,
            page,
            cursor: Cursor {
                page: 0,
                y: page.margin.top,
            },
            running_header: None,
            placed: Vec::new(),
            warned_oversized: Vec::new(),
            warned_header_skipped: false,
        }
    }

    /// Re-print `part` with `totals` after every automatic page break, on
    /// pages where it fits together with the part that caused the break.
    pub fn with_running_header(mut self, part: &'a PartDef, totals: &'a AggregateTable) -> Self {
        self.running_header = Some(RunningHeader { part, totals });
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of pages used so far.
    pub fn page_count(&self) -> usize {
        self.cursor.page + 1
    }

    pub fn into_placed(self) -> Vec<PlacedPart> {
        self.placed
    }

    /// Place one part at the cursor, breaking the page first if it does
    /// not fit. `row` feeds field elements, `scope` feeds calculations.
    pub fn render_part(
        &mut self,
        name: PartName,
        part: &PartDef,
        row: Option<&Record>,
        scope: Option<&AggregateTable>,
    ) -> PlacedPart {
        let height = part.layout_height();
        let top = self.page.margin.top;
        let bottom = self.page.content_bottom();

        if is_oversized(height, top, bottom) && !self.warned_oversized.contains(&name) {
            log::warn!(
                "Part '{}' is {:.1}pt tall but the page only has {:.1}pt between margins; it will overflow",
                name,
                height,
                self.page.content_height()
            );
            self.warned_oversized.push(name);
        }

        match decide_break(self.cursor.y, height, top, bottom) {
            BreakDecision::Place | BreakDecision::Overflow => {}
            BreakDecision::MoveToNextPage => self.break_page(height),
        }

        self.place(name, part, row, scope)
    }

    fn place(
        &mut self,
        name: PartName,
        part: &PartDef,
        row: Option<&Record>,
        scope: Option<&AggregateTable>,
    ) -> PlacedPart {
        let placed = PlacedPart {
            part: name,
            page: self.cursor.page,
            y: self.cursor.y,
        };
        for element in &part.elements {
            self.draw_element(element, placed.y, row, scope);
        }
        self.cursor.y += part.layout_height();
        self.placed.push(placed);
        placed
    }

    /// Open a new page for a part of `pending_height`.
    fn break_page(&mut self, pending_height: f64) {
        self.surface.start_new_page();
        self.cursor = Cursor {
            page: self.cursor.page + 1,
            y: self.page.margin.top,
        };
        log::debug!("Page break: now on page {}", self.cursor.page + 1);

        let Some(header) = self.running_header.as_ref() else {
            return;
        };
        let (part, totals) = (header.part, header.totals);

        // The pending part must still fit below the header, or the break gains nothing.
        if part.layout_height() + pending_height <= self.page.content_height() {
            self.place(PartName::Header, part, None, Some(totals));
        } else if !self.warned_header_skipped {
            log::warn!(
                "Header ({:.1}pt) and a {:.1}pt part do not fit on one page together; leaving the header off such pages",
                part.layout_height(),
                pending_height
            );
            self.warned_header_skipped = true;
        }
    }

    fn draw_element(
        &mut self,
        element: &ElementDef,
        part_top: f64,
        row: Option<&Record>,
        scope: Option<&AggregateTable>,
    ) {
        let text = resolve_text(&element.kind, row, scope);
        let font = element.font();
        let x = element.x;
        let baseline = part_top + element.y + font.size;

        self.surface.draw_text(&text, x, baseline, &font);

        if element.underline {
            let width = self.surface.measure_text_width(&text, &font);
            if width > 0.0 {
                let y = baseline + UNDERLINE_OFFSET;
                self.surface.draw_line(x, y, x + width, y);
            }
        }
    }
}

/// The display text of an element.
///
/// Fields read the current row and print nothing outside a row context.
/// Calculations read the part's aggregate scope; a missing scope or field
/// prints as zero.
pub fn resolve_text(kind: &ElementKind, row: Option<&Record>, scope: Option<&AggregateTable>) -> String {
    match kind {
        ElementKind::Label { content } => content.clone(),
        ElementKind::Field { .. } => match (row, kind.field_key()) {
            (Some(row), Some(key)) => row.text(&key),
            _ => String::new(),
        },
        ElementKind::Calculation { function, field } => {
            let value = scope.map_or(0.0, |totals| totals.value(function, field));
            format_amount(value)
        }
    }
}
