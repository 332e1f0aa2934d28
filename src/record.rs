//! Entity kinds and the schema-free record shape served by the API.

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use strum::{Display, EnumString};

/// Field the document store uses for its internal identifier.
pub const STORE_ID_FIELD: &str = "_id";

/// The record kind being listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Prediction event (groups one or more markets).
    #[strum(serialize = "event", serialize = "events")]
    Event,
    /// Tradable market.
    #[strum(serialize = "market", serialize = "markets")]
    Market,
}

impl EntityKind {
    /// All entity kinds.
    pub const ALL: [EntityKind; 2] = [EntityKind::Event, EntityKind::Market];

    /// Default collection / dataset name for this kind.
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Event => "events",
            EntityKind::Market => "markets",
        }
    }
}

/// One schema-free data item: a plain JSON attribute map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap an attribute map.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Look up one attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the attribute map.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the attribute map.
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }

    /// Normalize a raw store document into a fresh record.
    ///
    /// The store identifier is dropped and every BSON value is converted to a
    /// JSON-safe equivalent.
    pub fn from_document(document: Document) -> Self {
        let attributes = document
            .into_iter()
            .filter(|(key, _)| key != STORE_ID_FIELD)
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect();
        Self(attributes)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

/// Convert one BSON value to plain JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Number(n.into()),
        Bson::Int64(n) => Value::Number(n.into()),
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::Number(dt.timestamp_millis().into()),
        },
        Bson::Timestamp(ts) => json!({ "t": ts.time, "i": ts.increment }),
        Bson::Binary(binary) => Value::String(hex::encode(binary.bytes)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        other => other.into_relaxed_extjson(),
    }
}
