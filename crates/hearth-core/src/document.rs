//! Document model for the hosted document store
//!
//! Collections hold schemaless JSON documents keyed by [`DocId`]. Writes
//! may ask the store to fill in server-assigned timestamps, and queries
//! order documents by a single field the way the hosted database does:
//! documents lacking the field are excluded, ties fall back to document id.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Field map of a stored document
pub type Fields = serde_json::Map<String, Value>;

/// Identifier of a document within its collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random 20-character document id
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        Self(raw[..20].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: DocId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Get a single field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Decode the document's fields into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| StoreError::Deserialization(format!("document {}: {}", self.id, e)))
    }
}

/// Encode a timestamp the way the store persists server timestamps
///
/// Fixed-width RFC 3339 with nanoseconds, so lexicographic order matches
/// chronological order.
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// A pending write: literal fields plus fields the server should timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Write {
    fields: Fields,
    server_timestamps: Vec<String>,
}

impl Write {
    /// Create an empty write
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a write from a serializable record (must serialize to an object)
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => Ok(Self {
                fields,
                server_timestamps: Vec::new(),
            }),
            Ok(other) => Err(StoreError::Serialization(format!(
                "expected an object, got {}",
                other
            ))),
            Err(e) => Err(StoreError::Serialization(e.to_string())),
        }
    }

    /// Set a literal field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Ask the server to fill `name` with its commit timestamp
    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.fields.remove(&name);
        self.server_timestamps.push(name);
        self
    }

    /// Fields that will be server-timestamped
    pub fn server_timestamp_fields(&self) -> &[String] {
        &self.server_timestamps
    }

    /// Literal fields of the write
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Resolve server timestamps against the commit time
    pub fn commit(self, commit_time: DateTime<Utc>) -> Fields {
        let mut fields = self.fields;
        let encoded = encode_timestamp(commit_time);
        for name in self.server_timestamps {
            fields.insert(name, Value::String(encoded.clone()));
        }
        fields
    }
}

/// A query over one collection, optionally ordered by one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    /// Field to sort ascending by
    pub order_by: Option<String>,
}

impl Query {
    /// Query every document of a collection
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            order_by: None,
        }
    }

    /// Order ascending by a field
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Apply the query to a set of documents
    ///
    /// Without an order, documents keep their given order. With an order,
    /// documents lacking the field are dropped and the rest are sorted by
    /// field value, then by id.
    pub fn apply(&self, mut docs: Vec<Document>) -> Vec<Document> {
        let Some(field) = &self.order_by else {
            return docs;
        };

        docs.retain(|d| d.fields.contains_key(field));
        docs.sort_by(|a, b| {
            compare_values(&a.fields[field], &b.fields[field]).then_with(|| a.id.cmp(&b.id))
        });
        docs
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over field values: by type first, then by value
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// One delivery of a live query: the complete ordered result set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Decode every document into a typed record, in snapshot order
    pub fn decode_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        self.docs.iter().map(Document::decode).collect()
    }
}
