use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::leaf::Leaf;
use super::source::FetchError;

/// A named group of configuration leaves, e.g. `general` or `maintenance`.
pub type Section = Map<String, Value>;

/// The configuration document served by `/api/v1/configurations`, grouped
/// into named sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationDocument(Map<String, Value>);

impl ConfigurationDocument {
    pub fn new(sections: Map<String, Value>) -> Self {
        Self(sections)
    }

    /// Strips the response envelope. The payload may be the raw body, wrapped
    /// under `data`, or wrapped under `{ success, data }`.
    pub fn from_envelope(body: Value) -> Result<Self, FetchError> {
        let mut body = match body {
            Value::Object(map) => map,
            other => {
                return Err(FetchError::Shape(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        if matches!(body.get("success"), Some(Value::Bool(false))) && !has_payload(&body) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request was not successful");
            return Err(FetchError::Shape(format!("endpoint reported failure: {message}")));
        }

        match body.remove("data") {
            Some(Value::Object(sections)) => Ok(Self(sections)),
            Some(Value::Null) | None => Ok(Self(body)),
            Some(other) => Err(FetchError::Shape(format!(
                "expected `data` to be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.0.get(name).and_then(Value::as_object)
    }

    /// Owned copy of a section, empty when the section is absent.
    pub fn section_or_empty(&self, name: &str) -> Section {
        self.section(name).cloned().unwrap_or_default()
    }

    pub fn leaf(&self, section: &str, key: &str) -> Option<Leaf<'_>> {
        self.section(section)
            .and_then(|entries| entries.get(key))
            .map(Leaf::decode)
    }

    /// Leaf stored directly at the document root. Group-filtered responses
    /// (`?group=join_us`) come back flat.
    pub fn root_leaf(&self, key: &str) -> Option<Leaf<'_>> {
        self.0.get(key).map(Leaf::decode)
    }

    pub fn text(&self, section: &str, key: &str) -> Option<String> {
        self.leaf(section, key).and_then(|leaf| leaf.as_text())
    }

    pub fn text_or_empty(&self, section: &str, key: &str) -> String {
        self.text(section, key).unwrap_or_default()
    }

    /// Strict boolean switch, see [`Leaf::as_flag`].
    pub fn flag(&self, section: &str, key: &str) -> Option<bool> {
        self.leaf(section, key).and_then(|leaf| leaf.as_flag())
    }
}

impl From<Map<String, Value>> for ConfigurationDocument {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

fn has_payload(body: &Map<String, Value>) -> bool {
    body.get("data").is_some_and(|data| !data.is_null())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
