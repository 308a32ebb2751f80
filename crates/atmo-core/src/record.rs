// The emitted record type.

use serde::Serialize;
use serde_json::{Map, Value};

/// A flat, normalized telemetry record for one physical device or module.
///
/// Serializes as a single JSON object -- the published payload IS the
/// record. Keys follow the presence rule: a field absent from the vendor
/// payload never appears here, preserving the vendor's "not applicable
/// for this device" signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The device/module identifier records are keyed by.
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_owned(), value.into());
    }

    /// Insert only when the source value is present. Presence, not
    /// truthiness: `Some(0)` and `Some(false)` are copied.
    pub(crate) fn insert_opt(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }
}
