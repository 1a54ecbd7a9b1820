use serde_json::Value;
use tracing::warn;

/// A terminal configuration value as delivered by the CMS.
///
/// The CMS is inconsistent about envelopes: the same key may arrive as a bare
/// scalar (`"Acme"`) or wrapped (`{"value": "Acme"}`). Every typed accessor goes
/// through [`Leaf::decode`] so both forms resolve identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    /// The payload found under a `{ "value": ... }` wrapper.
    Wrapped(&'a Value),
    /// Anything that is not a wrapper object.
    Raw(&'a Value),
}

impl<'a> Leaf<'a> {
    pub fn decode(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => match map.get("value") {
                Some(inner) => Leaf::Wrapped(inner),
                None => Leaf::Raw(value),
            },
            _ => Leaf::Raw(value),
        }
    }

    pub fn value(&self) -> &'a Value {
        match self {
            Leaf::Wrapped(value) | Leaf::Raw(value) => value,
        }
    }

    /// Non-empty text content. Numbers are rendered so phone numbers stored as
    /// integers still come through.
    pub fn as_text(&self) -> Option<String> {
        match self.value() {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Booleans, plus the `"true"`/`"false"`/`"1"`/`"0"` strings some CMS
    /// fields are stored as.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Value::Number(number) => number.as_i64().map(|raw| raw != 0),
            _ => None,
        }
    }

    /// Only a real JSON boolean. Switches that gate the whole site must not
    /// flip on a stray `"1"` or `"false"` string.
    pub fn as_flag(&self) -> Option<bool> {
        self.value().as_bool()
    }

    /// A list stored either as a JSON array or as a JSON-encoded string.
    ///
    /// Strings that fail to parse, or parse to something other than an array,
    /// are logged and resolve to `None`.
    pub fn as_list(&self, field: &str) -> Option<Vec<Value>> {
        match self.value() {
            Value::Array(items) => Some(items.clone()),
            Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Array(items)) => Some(items),
                Ok(_) => {
                    warn!(field, "encoded configuration list is not an array");
                    None
                }
                Err(err) => {
                    warn!(field, error = %err, "failed to parse encoded configuration list");
                    None
                }
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapped_and_raw_text_resolve_identically() {
        let wrapped = json!({ "value": "X" });
        let raw = json!("X");

        assert!(matches!(Leaf::decode(&wrapped), Leaf::Wrapped(_)));
        assert!(matches!(Leaf::decode(&raw), Leaf::Raw(_)));
        assert_eq!(Leaf::decode(&wrapped).as_text().as_deref(), Some("X"));
        assert_eq!(Leaf::decode(&raw).as_text().as_deref(), Some("X"));
    }

    #[test]
    fn blank_text_is_treated_as_absent() {
        let blank = json!({ "value": "   " });
        assert_eq!(Leaf::decode(&blank).as_text(), None);
        assert_eq!(Leaf::decode(&Value::Null).as_text(), None);
    }

    #[test]
    fn objects_without_value_key_stay_raw() {
        let object = json!({ "facebook": "http://fb" });
        let leaf = Leaf::decode(&object);
        assert_eq!(leaf, Leaf::Raw(&object));
        assert_eq!(leaf.as_text(), None);
    }

    #[test]
    fn booleans_accept_string_forms() {
        assert_eq!(Leaf::decode(&json!({ "value": true })).as_bool(), Some(true));
        assert_eq!(Leaf::decode(&json!("false")).as_bool(), Some(false));
        assert_eq!(Leaf::decode(&json!({ "value": "1" })).as_bool(), Some(true));
        assert_eq!(Leaf::decode(&json!(0)).as_bool(), Some(false));
        assert_eq!(Leaf::decode(&json!("maybe")).as_bool(), None);
    }

    #[test]
    fn flags_only_accept_json_booleans() {
        assert_eq!(Leaf::decode(&json!({ "value": false })).as_flag(), Some(false));
        assert_eq!(Leaf::decode(&json!(true)).as_flag(), Some(true));
        assert_eq!(Leaf::decode(&json!({ "value": "true" })).as_flag(), None);
        assert_eq!(Leaf::decode(&json!(1)).as_flag(), None);
    }

    #[test]
    fn lists_decode_from_arrays_and_encoded_strings() {
        let encoded = json!({ "value": "[1, 2]" });
        let array = json!([1, 2]);
        assert_eq!(
            Leaf::decode(&encoded).as_list("images"),
            Some(vec![json!(1), json!(2)])
        );
        assert_eq!(
            Leaf::decode(&array).as_list("images"),
            Some(vec![json!(1), json!(2)])
        );
    }

    #[test]
    fn malformed_encoded_list_resolves_to_none() {
        assert_eq!(Leaf::decode(&json!("[not json")).as_list("images"), None);
        assert_eq!(Leaf::decode(&json!("{\"a\":1}")).as_list("images"), None);
    }
}
