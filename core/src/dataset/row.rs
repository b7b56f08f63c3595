use serde_json::{Map, Value};

/// One record of a [`super::Dataset`].
///
/// The field map is fixed at construction; `index` is the row's position in
/// the dataset and serves as its stable identifier in logs and events.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: usize,
    fields: Map<String, Value>,
}

impl Row {
    pub fn new(index: usize, fields: Map<String, Value>) -> Self {
        Self { index, fields }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of `field`, `None` when absent or not a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
