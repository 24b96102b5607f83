//! # Report Driver
//!
//! Walks a [`ReportPlan`] and prints parts in report order:
//!
//! ```text
//! header
//! for each segment:
//!     group-header   (grouped reports only)
//!     body           (once per record)
//!     group-footer   (grouped reports only; the last group included)
//! footer
//! ```
//!
//! A part missing from the schema is skipped without complaint, which is how
//! an author drops group headers or footers. Each run owns its own cursor
//! and reads the plan and schema immutably, so independent reports can be
//! rendered side by side.

use crate::aggregate::AggregateTable;
use crate::group::{Group, ReportPlan};
use crate::layout::{PartRenderer, PlacedPart};
use crate::record::Record;
use crate::schema::{LayoutSchema, PartName};
use crate::surface::RenderSurface;

/// Progress of a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    HeaderEmitted,
    GroupOpen,
    BodyRow,
    GroupsClosed,
    FooterEmitted,
    Done,
}

impl DriverState {
    fn can_advance_to(self, next: DriverState) -> bool {
        use DriverState::*;
        matches!(
            (self, next),
            (Idle, HeaderEmitted)
                | (HeaderEmitted, GroupOpen)
                | (HeaderEmitted, GroupsClosed)
                | (GroupOpen, BodyRow)
                | (GroupOpen, GroupOpen)
                | (GroupOpen, GroupsClosed)
                | (BodyRow, BodyRow)
                | (BodyRow, GroupOpen)
                | (BodyRow, GroupsClosed)
                | (GroupsClosed, FooterEmitted)
                | (FooterEmitted, Done)
        )
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub pages: usize,
    /// Every part printed, in order, with its page and position.
    pub parts: Vec<PlacedPart>,
    pub records: usize,
    pub groups: usize,
}

impl RenderSummary {
    /// Part names in print order.
    pub fn part_names(&self) -> Vec<PartName> {
        self.parts.iter().map(|p| p.part).collect()
    }

    pub fn count(&self, name: PartName) -> usize {
        self.parts.iter().filter(|p| p.part == name).count()
    }
}

/// Drives one report run over a surface.
pub struct ReportDriver<'a, S: RenderSurface + ?Sized> {
    schema: &'a LayoutSchema,
    plan: &'a ReportPlan,
    renderer: PartRenderer<'a, S>,
    state: DriverState,
}

impl<'a, S: RenderSurface + ?Sized> ReportDriver<'a, S> {
    pub fn new(surface: &'a mut S, schema: &'a LayoutSchema, plan: &'a ReportPlan) -> Self {
        let mut renderer = PartRenderer::new(surface, &schema.page);
        if schema.page.repeat_header {
            if let Some(header) = schema.part(PartName::Header) {
                renderer = renderer.with_running_header(header, &plan.global_totals);
            }
        }
        Self {
            schema,
            plan,
            renderer,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Print the whole report.
    pub fn run(mut self) -> RenderSummary {
        let plan = self.plan;

        self.emit(PartName::Header, None, Some(&plan.global_totals));
        self.advance(DriverState::HeaderEmitted);

        for group in plan.groups() {
            self.print_group(group);
        }
        self.advance(DriverState::GroupsClosed);

        self.emit(PartName::Footer, None, Some(&plan.global_totals));
        self.advance(DriverState::FooterEmitted);
        self.advance(DriverState::Done);

        RenderSummary {
            pages: self.renderer.page_count(),
            parts: self.renderer.into_placed(),
            records: plan.sorted.len(),
            groups: plan.segments.len(),
        }
    }

    fn print_group(&mut self, group: Group<'a>) {
        let grouped = self.plan.is_grouped();

        self.advance(DriverState::GroupOpen);
        if grouped {
            log::debug!("Opening group {:?} ({} rows)", group.key.to_string(), group.records.len());
            self.emit(PartName::GroupHeader, group.records.first(), Some(group.totals));
        }

        for record in group.records {
            self.advance(DriverState::BodyRow);
            self.emit(PartName::Body, Some(record), None);
        }

        if grouped {
            self.emit(PartName::GroupFooter, None, Some(group.totals));
        }
    }

    fn emit(&mut self, name: PartName, row: Option<&Record>, scope: Option<&AggregateTable>) {
        if let Some(part) = self.schema.part(name) {
            self.renderer.render_part(name, part, row, scope);
        }
    }

    fn advance(&mut self, next: DriverState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal report transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

/// Render a planned report onto `surface`.
pub fn render_report<S: RenderSurface + ?Sized>(
    surface: &mut S,
    schema: &LayoutSchema,
    plan: &ReportPlan,
) -> RenderSummary {
    ReportDriver::new(surface, schema, plan).run()
}
