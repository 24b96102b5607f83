//! # Host Payload
//!
//! The JSON a host application hands over for one report:
//!
//! ```json
//! {
//!   "columnHeader": ["Region_t", "Paid_n"],
//!   "bodyData": ["North^1500", "South^300"],
//!   "schemaJson": { "grouping": { ... }, "parts": { ... } }
//! }
//! ```
//!
//! Hosts that cannot nest JSON send `schemaJson` as a JSON-encoded string
//! instead of an object; both forms are accepted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FolioError;
use crate::record::{parse_rows, Record};
use crate::schema::LayoutSchema;

/// A decoded host payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Field names, one per column of every row.
    #[serde(default)]
    pub column_header: Option<Vec<String>>,

    /// Rows, each one string of separator-joined values.
    #[serde(default)]
    pub body_data: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_json: Option<SchemaSource>,
}

/// The two ways a schema can travel inside a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Inline(LayoutSchema),
    /// The schema's JSON text, decoded on demand.
    Encoded(String),
}

impl SchemaSource {
    pub fn into_schema(self) -> Result<LayoutSchema, FolioError> {
        match self {
            SchemaSource::Inline(schema) => Ok(schema),
            SchemaSource::Encoded(json) => LayoutSchema::from_json(&json),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Buffer first so an object that fails to decode reports its own error.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(json) => Ok(SchemaSource::Encoded(json)),
            value => serde_json::from_value(value)
                .map(SchemaSource::Inline)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for SchemaSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaSource::Inline(schema) => schema.serialize(serializer),
            SchemaSource::Encoded(json) => serializer.serialize_str(json),
        }
    }
}

impl Payload {
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a payload from parts already in hand.
    pub fn new(manifest: Vec<String>, rows: Vec<String>, schema: LayoutSchema) -> Self {
        Self {
            column_header: Some(manifest),
            body_data: Some(rows),
            schema_json: Some(SchemaSource::Inline(schema)),
        }
    }

    /// Check the payload and decode its schema. A payload without a schema
    /// renders with the empty default schema.
    pub fn into_parts(self) -> Result<(Vec<String>, Vec<String>, LayoutSchema), FolioError> {
        let manifest = self
            .column_header
            .ok_or_else(|| FolioError::MalformedPayload("missing columnHeader".to_string()))?;
        let rows = self
            .body_data
            .ok_or_else(|| FolioError::MalformedPayload("missing bodyData".to_string()))?;
        let schema = match self.schema_json {
            Some(source) => source.into_schema()?,
            None => LayoutSchema::default(),
        };
        Ok((manifest, rows, schema))
    }

    /// Decode the schema and parse every row into records.
    pub fn into_records(self, separator: char) -> Result<(Vec<Record>, LayoutSchema), FolioError> {
        let (manifest, rows, schema) = self.into_parts()?;
        Ok((parse_rows(&manifest, &rows, separator), schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PartName;

    #[test]
    fn test_inline_schema() {
        let json = r#"{
            "columnHeader": ["A", "B"],
            "bodyData": ["x^1"],
            "schemaJson": { "grouping": { "enabled": true, "field": "A" } }
        }"#;
        let (manifest, rows, schema) = Payload::from_json(json).unwrap().into_parts().unwrap();
        assert_eq!(manifest, vec!["A", "B"]);
        assert_eq!(rows, vec!["x^1"]);
        assert_eq!(schema.grouping_field(), Some("A"));
    }

    #[test]
    fn test_string_encoded_schema() {
        let json = r#"{
            "columnHeader": ["A"],
            "bodyData": [],
            "schemaJson": "{\"parts\": {\"body\": {\"height\": 20, \"elements\": []}}}"
        }"#;
        let (_, _, schema) = Payload::from_json(json).unwrap().into_parts().unwrap();
        assert_eq!(schema.part(PartName::Body).map(|p| p.height), Some(20.0));
    }

    #[test]
    fn test_missing_rows_is_malformed() {
        let payload = Payload::from_json(r#"{"columnHeader": ["A"]}"#).unwrap();
        let err = payload.into_parts().unwrap_err();
        assert!(matches!(err, FolioError::MalformedPayload(ref m) if m.contains("bodyData")));
    }

    #[test]
    fn test_null_manifest_is_malformed() {
        let payload = Payload::from_json(r#"{"columnHeader": null, "bodyData": []}"#).unwrap();
        assert!(matches!(payload.into_parts(), Err(FolioError::MalformedPayload(_))));
    }

    #[test]
    fn test_missing_schema_uses_default() {
        let payload = Payload::from_json(r#"{"columnHeader": [], "bodyData": []}"#).unwrap();
        let (_, _, schema) = payload.into_parts().unwrap();
        assert_eq!(schema, LayoutSchema::default());
    }

    #[test]
    fn test_bad_encoded_schema_is_a_parse_error() {
        let json = r#"{"columnHeader": [], "bodyData": [], "schemaJson": "{not json"}"#;
        let payload = Payload::from_json(json).unwrap();
        assert!(matches!(payload.into_parts(), Err(FolioError::Parse { .. })));
    }

    #[test]
    fn test_into_records_uses_separator() {
        let payload = Payload::new(
            vec!["A".to_string(), "B".to_string()],
            vec!["x|2".to_string()],
            LayoutSchema::default(),
        );
        let (records, _) = payload.into_records('|').unwrap();
        assert_eq!(records[0].text("A"), "x");
        assert_eq!(records[0].get("B").and_then(|v| v.as_number()), Some(2.0));
    }
}
