//! # Layout Schema
//!
//! The declarative description of a report: a grouping configuration, up to
//! five fixed-height parts, and the positioned elements inside each part.
//! Schemas are authored elsewhere and are read-only input here. The serde
//! model matches the JSON the authoring tool exports, so a schema survives
//! `JSON -> LayoutSchema -> JSON` without losing geometry, style or content.
//!
//! Deserialization is defensive: missing properties take defaults, `null`
//! is accepted wherever a string is expected, and unknown part names or
//! element properties are ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregate::AggregateFunction;
use crate::error::FolioError;
use crate::font::FontSpec;

/// A complete report layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSchema {
    #[serde(default)]
    pub grouping: Grouping,

    #[serde(default)]
    pub parts: Parts,

    /// Page size, margins and pagination policy.
    #[serde(default)]
    pub page: PageConfig,
}

impl LayoutSchema {
    /// Import a schema from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Export the schema as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, FolioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The grouping field, when grouping is in effect.
    pub fn grouping_field(&self) -> Option<&str> {
        self.grouping.active_field()
    }

    pub fn part(&self, name: PartName) -> Option<&PartDef> {
        self.parts.get(name)
    }
}

/// Grouping configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub field: Option<String>,
}

impl Grouping {
    pub fn by(field: &str) -> Self {
        Self {
            enabled: true,
            field: Some(field.to_string()),
        }
    }

    /// `enabled` with an empty or missing field counts as disabled.
    pub fn active_field(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.field.as_deref().filter(|f| !f.is_empty())
    }
}

/// The five part slots, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartName {
    Header,
    GroupHeader,
    Body,
    GroupFooter,
    Footer,
}

impl PartName {
    pub const ALL: [PartName; 5] = [
        PartName::Header,
        PartName::GroupHeader,
        PartName::Body,
        PartName::GroupFooter,
        PartName::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartName::Header => "header",
            PartName::GroupHeader => "group-header",
            PartName::Body => "body",
            PartName::GroupFooter => "group-footer",
            PartName::Footer => "footer",
        }
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authored parts. An absent part is simply not printed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<PartDef>,
    #[serde(rename = "group-header", default, skip_serializing_if = "Option::is_none")]
    pub group_header: Option<PartDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PartDef>,
    #[serde(rename = "group-footer", default, skip_serializing_if = "Option::is_none")]
    pub group_footer: Option<PartDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<PartDef>,
}

impl Parts {
    pub fn get(&self, name: PartName) -> Option<&PartDef> {
        match name {
            PartName::Header => self.header.as_ref(),
            PartName::GroupHeader => self.group_header.as_ref(),
            PartName::Body => self.body.as_ref(),
            PartName::GroupFooter => self.group_footer.as_ref(),
            PartName::Footer => self.footer.as_ref(),
        }
    }

    pub fn set(&mut self, name: PartName, part: PartDef) {
        let slot = match name {
            PartName::Header => &mut self.header,
            PartName::GroupHeader => &mut self.group_header,
            PartName::Body => &mut self.body,
            PartName::GroupFooter => &mut self.group_footer,
            PartName::Footer => &mut self.footer,
        };
        *slot = Some(part);
    }

    /// Authored parts in print order.
    pub fn iter(&self) -> impl Iterator<Item = (PartName, &PartDef)> {
        PartName::ALL
            .into_iter()
            .filter_map(move |name| self.get(name).map(|part| (name, part)))
    }
}

/// One fixed-height horizontal band of the layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

impl PartDef {
    pub fn new(height: f64, elements: Vec<ElementDef>) -> Self {
        Self { height, elements }
    }

    /// The height used for layout. Negative or non-finite heights count as 0.
    pub fn layout_height(&self) -> f64 {
        if self.height.is_finite() {
            self.height.max(0.0)
        } else {
            0.0
        }
    }
}

/// A positioned, styled piece of content inside a part.
///
/// `x` / `y` are offsets from the part's top-left corner. `w` / `h` are the
/// authored box size; they are kept for round-tripping and HTML output but
/// never influence pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDef {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default = "default_font_size", deserialize_with = "positive_or_default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

/// What an element prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Fixed text.
    Label {
        #[serde(default, deserialize_with = "nullable")]
        content: String,
    },
    /// A field of the current row.
    Field {
        #[serde(default, deserialize_with = "nullable")]
        key: String,
        /// Display placeholder written by the authoring tool, e.g. `[Amount]`.
        #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
        content: String,
    },
    /// A pre-computed aggregate of the part's scope.
    Calculation {
        #[serde(default, deserialize_with = "nullable")]
        function: AggregateFunction,
        #[serde(default, deserialize_with = "nullable")]
        field: String,
    },
}

impl ElementDef {
    fn with_kind(kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            w: None,
            h: None,
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn label(content: &str, x: f64, y: f64) -> Self {
        Self::with_kind(
            ElementKind::Label {
                content: content.to_string(),
            },
            x,
            y,
        )
    }

    pub fn field(key: &str, x: f64, y: f64) -> Self {
        Self::with_kind(
            ElementKind::Field {
                key: key.to_string(),
                content: format!("[{}]", key),
            },
            x,
            y,
        )
    }

    pub fn calculation(function: AggregateFunction, field: &str, x: f64, y: f64) -> Self {
        Self::with_kind(
            ElementKind::Calculation {
                function,
                field: field.to_string(),
            },
            x,
            y,
        )
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_size, self.bold, self.italic)
    }
}

impl ElementKind {
    /// The row key a field element reads. Falls back to the placeholder
    /// content with its brackets stripped when no key was stored.
    pub fn field_key(&self) -> Option<String> {
        match self {
            ElementKind::Field { key, .. } if !key.is_empty() => Some(key.clone()),
            ElementKind::Field { content, .. } => {
                Some(content.chars().filter(|c| *c != '[' && *c != ']').collect())
            }
            _ => None,
        }
    }
}

const DEFAULT_FONT_SIZE: f64 = 12.0;

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn positive_or_default_font_size<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let size = Option::<f64>::deserialize(deserializer)?;
    Ok(size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE))
}

/// Read `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Page configuration ─────────────────────────────────────────

/// Page size, margins and pagination policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,

    /// Re-print the report header at the top of every page opened by an
    /// automatic page break.
    #[serde(default)]
    pub repeat_header: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
            repeat_header: false,
        }
    }
}

fn default_margin() -> Edges {
    Edges {
        top: 20.0,
        right: 0.0,
        bottom: 40.0,
        left: 0.0,
    }
}

impl PageConfig {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    /// The lowest y a part may reach before it must move to a new page.
    pub fn content_bottom(&self) -> f64 {
        self.height() - self.margin.bottom
    }

    /// Vertical space between the margins.
    pub fn content_height(&self) -> f64 {
        self.height() - self.margin.vertical()
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}
