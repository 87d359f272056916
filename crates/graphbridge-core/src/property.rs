//! Property Types, Schemas and Columnar Storage
//!
//! Properties are attached to the node-ID axis or the edge-ID axis of a
//! property graph rather than stored inline on each node or edge. A
//! [`Schema`] is the ordered list of named, typed fields on one axis and a
//! [`PropertyColumn`] holds the values of one field for every ID on that axis.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Types and Values
// ============================================================================

/// Data type of a property column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Boolean flag
    Boolean,
    /// UTF-8 string
    String,
}

impl PropertyType {
    /// Get the string representation used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Int64 => "int64",
            PropertyType::Float64 => "float64",
            PropertyType::Boolean => "boolean",
            PropertyType::String => "string",
        }
    }

    /// Parse a storage type name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "int64" => Some(PropertyType::Int64),
            "float64" => Some(PropertyType::Float64),
            "boolean" => Some(PropertyType::Boolean),
            "string" => Some(PropertyType::String),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl PropertyValue {
    /// The column type this value belongs to.
    pub fn data_type(&self) -> PropertyType {
        match self {
            PropertyValue::Int(_) => PropertyType::Int64,
            PropertyValue::Float(_) => PropertyType::Float64,
            PropertyValue::Bool(_) => PropertyType::Boolean,
            PropertyValue::Str(_) => PropertyType::String,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// A named, typed field in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyField {
    pub name: String,
    pub data_type: PropertyType,
}

impl PropertyField {
    pub fn new(name: impl Into<String>, data_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of property fields attached to one axis of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<PropertyField>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Returns `false` if a field with that name already exists.
    pub fn push(&mut self, field: PropertyField) -> bool {
        if self.index_of(&field.name).is_some() {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the field with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field at a schema position
    pub fn field(&self, index: usize) -> Option<&PropertyField> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyField> {
        self.fields.iter()
    }

    /// Field names in schema order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl std::ops::Index<usize> for Schema {
    type Output = PropertyField;

    fn index(&self, index: usize) -> &Self::Output {
        &self.fields[index]
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Values of one property for every ID on an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum PropertyColumn {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Boolean(Vec<bool>),
    String(Vec<String>),
}

impl PropertyColumn {
    /// Create an empty column of the given type
    pub fn empty(data_type: PropertyType) -> Self {
        Self::with_capacity(data_type, 0)
    }

    pub fn with_capacity(data_type: PropertyType, capacity: usize) -> Self {
        match data_type {
            PropertyType::Int64 => PropertyColumn::Int64(Vec::with_capacity(capacity)),
            PropertyType::Float64 => PropertyColumn::Float64(Vec::with_capacity(capacity)),
            PropertyType::Boolean => PropertyColumn::Boolean(Vec::with_capacity(capacity)),
            PropertyType::String => PropertyColumn::String(Vec::with_capacity(capacity)),
        }
    }

    /// Build a column from values that must all share one type.
    ///
    /// Returns the first value whose type differs from `data_type`.
    pub fn from_values(
        data_type: PropertyType,
        values: impl IntoIterator<Item = PropertyValue>,
    ) -> Result<Self, PropertyValue> {
        let mut column = Self::empty(data_type);
        for value in values {
            column.push(value)?;
        }
        Ok(column)
    }

    pub fn data_type(&self) -> PropertyType {
        match self {
            PropertyColumn::Int64(_) => PropertyType::Int64,
            PropertyColumn::Float64(_) => PropertyType::Float64,
            PropertyColumn::Boolean(_) => PropertyType::Boolean,
            PropertyColumn::String(_) => PropertyType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PropertyColumn::Int64(v) => v.len(),
            PropertyColumn::Float64(v) => v.len(),
            PropertyColumn::Boolean(v) => v.len(),
            PropertyColumn::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at a row
    pub fn get(&self, row: usize) -> Option<PropertyValue> {
        match self {
            PropertyColumn::Int64(v) => v.get(row).map(|x| PropertyValue::Int(*x)),
            PropertyColumn::Float64(v) => v.get(row).map(|x| PropertyValue::Float(*x)),
            PropertyColumn::Boolean(v) => v.get(row).map(|x| PropertyValue::Bool(*x)),
            PropertyColumn::String(v) => v.get(row).map(|x| PropertyValue::Str(x.clone())),
        }
    }

    /// All values in row order
    pub fn values(&self) -> Vec<PropertyValue> {
        (0..self.len()).filter_map(|row| self.get(row)).collect()
    }

    /// Integer view of the column, if it is an `Int64` column
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            PropertyColumn::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Reserve space for `additional` more rows
    pub fn reserve(&mut self, additional: usize) {
        match self {
            PropertyColumn::Int64(v) => v.reserve(additional),
            PropertyColumn::Float64(v) => v.reserve(additional),
            PropertyColumn::Boolean(v) => v.reserve(additional),
            PropertyColumn::String(v) => v.reserve(additional),
        }
    }

    /// Append a value, rejecting it (and handing it back) on a type mismatch.
    pub fn push(&mut self, value: PropertyValue) -> Result<(), PropertyValue> {
        match (self, value) {
            (PropertyColumn::Int64(v), PropertyValue::Int(x)) => v.push(x),
            (PropertyColumn::Float64(v), PropertyValue::Float(x)) => v.push(x),
            (PropertyColumn::Boolean(v), PropertyValue::Bool(x)) => v.push(x),
            (PropertyColumn::String(v), PropertyValue::Str(x)) => v.push(x),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// New column whose row `i` is this column's row `order[i]`.
    ///
    /// Every index in `order` must be in bounds.
    pub fn gather(&self, order: &[usize]) -> Self {
        match self {
            PropertyColumn::Int64(v) => PropertyColumn::Int64(order.iter().map(|&i| v[i]).collect()),
            PropertyColumn::Float64(v) => {
                PropertyColumn::Float64(order.iter().map(|&i| v[i]).collect())
            }
            PropertyColumn::Boolean(v) => {
                PropertyColumn::Boolean(order.iter().map(|&i| v[i]).collect())
            }
            PropertyColumn::String(v) => {
                PropertyColumn::String(order.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_round_trips_through_storage_name() {
        for ty in [
            PropertyType::Int64,
            PropertyType::Float64,
            PropertyType::Boolean,
            PropertyType::String,
        ] {
            assert_eq!(PropertyType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(PropertyType::parse("decimal"), None);
    }

    #[test]
    fn test_property_value_untagged_json() {
        assert_eq!(serde_json::to_string(&PropertyValue::Int(4)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&PropertyValue::from("x")).unwrap(),
            "\"x\""
        );
        let value: PropertyValue = serde_json::from_str("7").unwrap();
        assert_eq!(value, PropertyValue::Int(7));
        let value: PropertyValue = serde_json::from_str("0.5").unwrap();
        assert_eq!(value, PropertyValue::Float(0.5));
    }

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let mut schema = Schema::new();
        assert!(schema.push(PropertyField::new("value", PropertyType::Int64)));
        assert!(!schema.push(PropertyField::new("value", PropertyType::Float64)));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.index_of("value"), Some(0));
        assert_eq!(schema[0].data_type, PropertyType::Int64);
    }

    #[test]
    fn test_column_push_checks_type() {
        let mut column = PropertyColumn::empty(PropertyType::Int64);
        column.push(PropertyValue::Int(1)).unwrap();
        let rejected = column.push(PropertyValue::Bool(true)).unwrap_err();
        assert_eq!(rejected, PropertyValue::Bool(true));
        assert_eq!(column.len(), 1);
    }

    #[test]
    fn test_column_gather_permutes_rows() {
        let column = PropertyColumn::String(vec!["a".into(), "b".into(), "c".into()]);
        let gathered = column.gather(&[2, 0, 0]);
        assert_eq!(
            gathered,
            PropertyColumn::String(vec!["c".into(), "a".into(), "a".into()])
        );
    }

    #[test]
    fn test_column_json_is_tagged() {
        let column = PropertyColumn::Int64(vec![4, 2]);
        let json = serde_json::to_string(&column).unwrap();
        assert_eq!(json, r#"{"type":"int64","values":[4,2]}"#);
        let back: PropertyColumn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, column);
    }
}
