//! Row extraction collaborator.
//!
//! A `RowSource` looks up one record by key in some tabular source. Records
//! are passed through as slide content and never interpreted.

use crate::error::Result;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single cell value.
///
/// Numeric variants are only produced when the cell text round-trips exactly,
/// so `Display` always yields the original cell text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Classifies raw cell text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i64>() {
            if int.to_string() == raw {
                return Self::Integer(int);
            }
        }
        if let Ok(float) = raw.parse::<f64>() {
            if float.is_finite() && float.to_string() == raw {
                return Self::Float(float);
            }
        }
        Self::Text(raw.to_string())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// One row, as header name to value, in source column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.fields.push((header.into(), value));
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders `header: value` lines, one per field.
    pub fn to_lines(&self) -> String {
        self.iter()
            .map(|(header, value)| format!("{header}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (header, value) in &self.fields {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// A keyed lookup over tabular data.
///
/// A key that matches nothing is `Ok(None)`, never an error. Lookups never
/// mutate the source.
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<Option<Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_parse() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("-3"), CellValue::Integer(-3));
        assert_eq!(CellValue::parse("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::parse("Acme"), CellValue::Text("Acme".into()));
    }

    #[test]
    fn test_cell_value_keeps_non_canonical_numbers_as_text() {
        assert_eq!(CellValue::parse("007"), CellValue::Text("007".into()));
        assert_eq!(CellValue::parse("1.50"), CellValue::Text("1.50".into()));
        assert_eq!(CellValue::parse("+5"), CellValue::Text("+5".into()));
        assert_eq!(CellValue::parse("NaN"), CellValue::Text("NaN".into()));
        assert_eq!(CellValue::parse(""), CellValue::Text(String::new()));
    }

    #[test]
    fn test_record_preserves_column_order() {
        let mut record = Record::new();
        record.push("Company", CellValue::parse("Acme"));
        record.push("Employees", CellValue::parse("120"));
        record.push("Revenue", CellValue::parse("3.5"));

        let headers: Vec<&str> = record.headers().collect();
        assert_eq!(headers, vec!["Company", "Employees", "Revenue"]);
        assert_eq!(record.to_lines(), "Company: Acme\nEmployees: 120\nRevenue: 3.5");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Company":"Acme","Employees":120,"Revenue":3.5}"#);
    }
}
