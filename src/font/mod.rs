//! # Fonts
//!
//! Reports use the standard PDF Helvetica family, which needs no embedding.
//! An element picks one of four faces from its `bold` / `italic` flags, and
//! text is measured with the built-in AFM advance widths so underlines and
//! HTML boxes line up with what a PDF viewer draws.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The four style combinations an element can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FontStyle::BoldItalic,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (false, false) => FontStyle::Normal,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

/// The standard PDF fonts used for report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => StandardFont::Helvetica,
            FontStyle::Bold => StandardFont::HelveticaBold,
            FontStyle::Italic => StandardFont::HelveticaOblique,
            FontStyle::BoldItalic => StandardFont::HelveticaBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Oblique faces share the advance widths of their upright counterparts.
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Size and style of one piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub style: FontStyle,
}

impl FontSpec {
    pub fn new(size: f64, bold: bool, italic: bool) -> Self {
        Self {
            size,
            style: FontStyle::from_flags(bold, italic),
        }
    }

    pub fn standard_font(&self) -> StandardFont {
        StandardFont::for_style(self.style)
    }

    /// Width of `text` in points.
    pub fn measure(&self, text: &str) -> f64 {
        self.standard_font().metrics().measure_string(text, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_width() {
        let font = FontSpec::new(12.0, false, false);
        assert!((font.measure(" ") - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider() {
        let regular = FontSpec::new(12.0, false, false).measure("Amount");
        let bold = FontSpec::new(12.0, true, false).measure("Amount");
        assert!(bold > regular, "Bold text should be wider than regular");
    }

    #[test]
    fn test_oblique_shares_upright_widths() {
        let upright = FontSpec::new(14.0, true, false).measure("Total");
        let oblique = FontSpec::new(14.0, true, true).measure("Total");
        assert!((upright - oblique).abs() < 0.001);
    }

    #[test]
    fn test_style_flags() {
        assert_eq!(FontStyle::from_flags(true, true), FontStyle::BoldItalic);
        assert_eq!(
            StandardFont::for_style(FontStyle::Italic).pdf_name(),
            "Helvetica-Oblique"
        );
        assert!(FontStyle::BoldItalic.is_bold() && FontStyle::BoldItalic.is_italic());
    }

    #[test]
    fn test_empty_string_has_no_width() {
        assert_eq!(FontSpec::new(12.0, false, false).measure(""), 0.0);
    }
}
