//! # PDF Surface
//!
//! A [`RenderSurface`] that writes a PDF 1.7 file directly.
//!
//! Every surface call appends operators to the current page's content
//! stream. When the report is done, [`PdfSurface::finish`] assembles the
//! objects, compresses the streams and writes the cross-reference table.
//! Text uses the standard Helvetica faces, so nothing is embedded.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, content streams
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Report coordinates have y growing down from the top edge; PDF user space
//! has y growing up from the bottom, so every y is flipped on the way out.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{FontSpec, StandardFont};
use crate::schema::PageConfig;
use crate::surface::RenderSurface;

/// Stroke width for underlines.
const LINE_WIDTH: f64 = 0.5;

/// Draws a report into PDF content streams.
pub struct PdfSurface {
    width: f64,
    height: f64,
    /// Uncompressed content stream of each page.
    pages: Vec<Vec<u8>>,
    fonts: BTreeSet<StandardFont>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }
}

impl PdfSurface {
    pub fn new(page: &PageConfig) -> Self {
        Self {
            width: page.width(),
            height: page.height(),
            pages: vec![Vec::new()],
            fonts: BTreeSet::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut Vec<u8> {
        // `pages` starts with one entry and only ever grows.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Write the finished document.
    pub fn finish(self, title: Option<&str>) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then a content stream and page object per page
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        let mut fonts: Vec<StandardFont> = self.fonts.iter().copied().collect();
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }
        let font_resources: String = fonts
            .iter()
            .map(|font| {
                let obj_id = builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                );
                format!("/{} {} 0 R", resource_name(*font), obj_id)
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for content in &self.pages {
            let compressed = compress_to_vec_zlib(content, 6);
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                self.width, self.height, content_obj_id, font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = title.map(|title| {
            let mut info: Vec<u8> = b"<< /Title (".to_vec();
            info.extend(escape_pdf_string(&to_winansi_bytes(title)));
            info.extend_from_slice(b") /Producer (Folio) >>");
            builder.push(info)
        });

        serialize(&builder, info_obj_id)
    }
}

impl RenderSurface for PdfSurface {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec) {
        if text.is_empty() {
            return;
        }
        let standard = font.standard_font();
        self.fonts.insert(standard);

        let pdf_y = self.height - y;
        let mut ops = String::new();
        let _ = write!(
            ops,
            "BT\n/{} {:.1} Tf\n{:.2} {:.2} Td\n(",
            resource_name(standard),
            font.size,
            x,
            pdf_y
        );

        let stream = self.current();
        stream.extend_from_slice(ops.as_bytes());
        stream.extend(escape_pdf_string(&to_winansi_bytes(text)));
        stream.extend_from_slice(b") Tj\nET\n");
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let height = self.height;
        let _ = write!(
            self.current(),
            "q\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            LINE_WIDTH,
            x1,
            height - y1,
            x2,
            height - y2
        );
    }

    fn start_new_page(&mut self) {
        self.pages.push(Vec::new());
    }
}

/// Resource name of a font in every page's font dictionary.
fn resource_name(font: StandardFont) -> &'static str {
    match font {
        StandardFont::Helvetica => "F0",
        StandardFont::HelveticaBold => "F1",
        StandardFont::HelveticaOblique => "F2",
        StandardFont::HelveticaBoldOblique => "F3",
    }
}

/// Encode text for a WinAnsiEncoding font. Unmappable characters become `?`.
fn to_winansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7E}' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
    if let Some(info_id) = info_obj_id {
        let _ = write!(output, " /Info {} 0 R", info_id);
    }
    let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

    output
}
