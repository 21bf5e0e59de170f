//! Firestore REST API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Firestore document value types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    pub create_time: Option<String>,
    /// Update time
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Document id: the last path segment of the resource name.
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Look up a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(name))
    }

    /// Look up and convert a field value.
    pub fn get<T: FromFirestoreValue>(&self, name: &str) -> Option<T> {
        self.field(name).and_then(T::from_firestore_value)
    }
}

// ============================================================================
// Structured Queries
// ============================================================================

/// Structured query for `documents:runQuery`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub order_by: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}

/// Pagination cursor: values matching the order-by fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<bool>,
}

impl StructuredQuery {
    /// Query a single collection.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
            }],
            ..Default::default()
        }
    }

    /// Filter on field equality.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter = Some(Filter {
            field_filter: Some(FieldFilter {
                field: FieldReference {
                    field_path: field.into(),
                },
                op: "EQUAL".to_string(),
                value,
            }),
        });
        self
    }

    /// Order descending on a field.
    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by.push(Order {
            field: FieldReference {
                field_path: field.into(),
            },
            direction: "DESCENDING".to_string(),
        });
        self
    }

    /// Limit the result count.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume strictly after the given cursor values.
    pub fn start_after(mut self, values: Vec<Value>) -> Self {
        self.start_at = Some(Cursor {
            values,
            before: Some(false),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

// ============================================================================
// Value Conversion
// ============================================================================

/// Convert a Rust value to Firestore Value.
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

impl ToFirestoreValue for String {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToFirestoreValue for &str {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToFirestoreValue for i64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for i32 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue((*self as i64).to_string())
    }
}

impl ToFirestoreValue for u32 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue((*self as i64).to_string())
    }
}

impl ToFirestoreValue for f64 {
    fn to_firestore_value(&self) -> Value {
        Value::DoubleValue(*self)
    }
}

impl ToFirestoreValue for bool {
    fn to_firestore_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToFirestoreValue for DateTime<Utc> {
    fn to_firestore_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        match self {
            Some(v) => v.to_firestore_value(),
            None => Value::NullValue(()),
        }
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Vec<T> {
    fn to_firestore_value(&self) -> Value {
        Value::ArrayValue(ArrayValue {
            values: Some(self.iter().map(|v| v.to_firestore_value()).collect()),
        })
    }
}

/// Convert Firestore Value to Rust type.
pub trait FromFirestoreValue: Sized {
    fn from_firestore_value(value: &Value) -> Option<Self>;
}

impl FromFirestoreValue for String {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for i64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for f64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::DoubleValue(f) => Some(*f),
            Value::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromFirestoreValue for bool {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromFirestoreValue for DateTime<Utc> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.into()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for Vec<String> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::ArrayValue(arr) => Some(
                arr.values
                    .as_ref()
                    .map(|vs| vs.iter().filter_map(String::from_firestore_value).collect())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_roundtrip_as_string() {
        let v = 42i64.to_firestore_value();
        assert!(matches!(&v, Value::IntegerValue(s) if s == "42"));
        assert_eq!(i64::from_firestore_value(&v), Some(42));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let now = Utc::now();
        let v = now.to_firestore_value();
        let back = DateTime::<Utc>::from_firestore_value(&v).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_string_array_conversion() {
        let v = vec!["a".to_string(), "b".to_string()].to_firestore_value();
        assert_eq!(
            Vec::<String>::from_firestore_value(&v),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_doc_id_from_resource_name() {
        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/videos/abc".to_string()),
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.doc_id(), Some("abc"));
    }

    #[test]
    fn test_query_builder_shape() {
        let q = StructuredQuery::collection("comments")
            .where_eq("video_id", Value::StringValue("v1".into()))
            .order_desc("created_at")
            .with_limit(20);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["from"][0]["collectionId"], "comments");
        assert_eq!(json["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(json["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(json["limit"], 20);
    }
}
