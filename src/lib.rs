//! # Folio
//!
//! A data-driven banded report engine.
//!
//! A report is a stack of fixed-height parts (header, group header, body,
//! group footer, footer) described by a [`LayoutSchema`]. Folio takes flat
//! delimited rows plus that schema, groups and totals the rows, and prints
//! the parts down the page, moving a part to the next page whenever it would
//! cross the bottom margin. Parts never split across pages.
//!
//! Every aggregate is computed before the first part is drawn, which is what
//! lets a header show a grand total, or a group header show its group's
//! subtotal, above the rows it summarizes.
//!
//! ## Architecture
//!
//! ```text
//! Payload (JSON: columnHeader, bodyData, schemaJson)
//!       ↓
//!   [record]       Split rows into typed records
//!       ↓
//!   [group]        Sort, segment, pre-compute totals  ([aggregate])
//!       ↓
//!   [report]       Walk the plan: header, groups, footer
//!       ↓
//!   [layout]       Place parts, break pages
//!       ↓
//!   [surface]      Draw: [pdf] bytes, [html] preview, or a recording
//! ```

pub mod aggregate;
pub mod error;
pub mod font;
pub mod group;
pub mod html;
pub mod layout;
pub mod payload;
pub mod pdf;
pub mod record;
pub mod report;
pub mod schema;
pub mod surface;

use std::time::Instant;

pub use error::FolioError;
pub use payload::Payload;
pub use report::RenderSummary;
pub use schema::LayoutSchema;

use html::HtmlSurface;
use pdf::PdfSurface;
use record::{parse_rows, DEFAULT_SEPARATOR};
use surface::RenderSurface;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
}

/// How to turn a payload into output bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Character joining the values of one row.
    pub separator: char,
    /// Written to the PDF metadata or the HTML `<title>`.
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            separator: DEFAULT_SEPARATOR,
            title: None,
        }
    }
}

/// Parse rows, plan the report, and draw it onto `surface`.
///
/// This is the core entry point; the other `render_*` functions wrap it
/// with a concrete surface.
pub fn generate<S: RenderSurface + ?Sized>(
    surface: &mut S,
    schema: &LayoutSchema,
    manifest: &[String],
    rows: &[String],
    separator: char,
) -> RenderSummary {
    let records = parse_rows(manifest, rows, separator);
    let plan = group::plan(records, &schema.grouping);
    report::render_report(surface, schema, &plan)
}

/// Render a report to PDF bytes.
pub fn render_pdf(
    schema: &LayoutSchema,
    manifest: &[String],
    rows: &[String],
    options: &RenderOptions,
) -> (Vec<u8>, RenderSummary) {
    let mut surface = PdfSurface::new(&schema.page);
    let summary = generate(&mut surface, schema, manifest, rows, options.separator);
    (surface.finish(options.title.as_deref()), summary)
}

/// Render a report to a standalone HTML document.
pub fn render_html(
    schema: &LayoutSchema,
    manifest: &[String],
    rows: &[String],
    options: &RenderOptions,
) -> (String, RenderSummary) {
    let mut surface = HtmlSurface::new(&schema.page);
    let summary = generate(&mut surface, schema, manifest, rows, options.separator);
    (surface.finish(options.title.as_deref()), summary)
}

/// Render a host payload to output bytes in the requested format.
pub fn render_payload(payload: Payload, options: &RenderOptions) -> Result<Vec<u8>, FolioError> {
    let t0 = Instant::now();

    let (manifest, rows, schema) = payload.into_parts()?;
    let t_decode = t0.elapsed();

    let (bytes, summary) = match options.format {
        OutputFormat::Pdf => render_pdf(&schema, &manifest, &rows, options),
        OutputFormat::Html => {
            let (html, summary) = render_html(&schema, &manifest, &rows, options);
            (html.into_bytes(), summary)
        }
    };
    let t_total = t0.elapsed();

    log::info!(
        "Rendered {} records in {} groups onto {} pages: decode={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes)",
        summary.records,
        summary.groups,
        summary.pages,
        t_decode.as_secs_f64() * 1000.0,
        (t_total - t_decode).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

/// Render a payload described as JSON.
pub fn render_payload_json(json: &str, options: &RenderOptions) -> Result<Vec<u8>, FolioError> {
    render_payload(Payload::from_json(json)?, options)
}
