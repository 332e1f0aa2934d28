//! Immutable record collections bundled with the deployment.

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use crate::error::DataError;
use crate::record::{EntityKind, Record};

const BUNDLED_EVENTS: &str = include_str!("../../data/events.json");
const BUNDLED_MARKETS: &str = include_str!("../../data/markets.json");

static BUNDLED: OnceCell<StaticStore> = OnceCell::new();

/// In-memory, preloaded `events` and `markets` arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticStore {
    events: Vec<Record>,
    markets: Vec<Record>,
}

impl StaticStore {
    /// Create a store from already parsed collections.
    pub fn new(events: Vec<Record>, markets: Vec<Record>) -> Self {
        Self { events, markets }
    }

    /// Parse both collections from JSON array text.
    pub fn from_json(events: &str, markets: &str) -> Result<Self, DataError> {
        Ok(Self {
            events: parse_dataset("events", events)?,
            markets: parse_dataset("markets", markets)?,
        })
    }

    /// The dataset compiled into the binary, parsed on first use.
    pub fn bundled() -> Result<&'static StaticStore, DataError> {
        BUNDLED.get_or_try_init(|| {
            let store = Self::from_json(BUNDLED_EVENTS, BUNDLED_MARKETS)?;
            debug!(
                events = store.events.len(),
                markets = store.markets.len(),
                "Loaded bundled dataset"
            );
            Ok(store)
        })
    }

    /// Borrow the resident collection for a kind.
    pub fn records(&self, kind: EntityKind) -> &[Record] {
        match kind {
            EntityKind::Event => &self.events,
            EntityKind::Market => &self.markets,
        }
    }

    /// Number of records held for a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.records(kind).len()
    }
}

fn parse_dataset(dataset: &'static str, text: &str) -> Result<Vec<Record>, DataError> {
    let values: Vec<Value> =
        serde_json::from_str(text).map_err(|source| DataError::Parse { dataset, source })?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(attributes) => Ok(Record::new(attributes)),
            _ => Err(DataError::NotAnObject { dataset, index }),
        })
        .collect()
}
