use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
// The @context property defines the vocabulary used in the JSON-LD document.
// It provides a way to map the keys in the JSON structure to specific terms,
// properties, and classes from external vocabularies.
pub enum Context {
    SingleString(String),
    SetOfString(Vec<String>),
    JsonObject(Value),
}

impl Context {
    /// Lists the context entries given by URI, in document order.
    ///
    /// Inline context definitions carry no URI and are skipped.
    pub fn uris(&self) -> Vec<&str> {
        match self {
            Context::SingleString(uri) => vec![uri.as_str()],
            Context::SetOfString(uris) => uris.iter().map(String::as_str).collect(),
            Context::JsonObject(Value::Array(entries)) => entries.iter().filter_map(Value::as_str).collect(),
            Context::JsonObject(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_uris_from_every_shape() {
        let single: Context = serde_json::from_value(json!("https://www.w3.org/2018/credentials/v1")).unwrap();
        assert_eq!(single.uris(), vec!["https://www.w3.org/2018/credentials/v1"]);

        let set: Context = serde_json::from_value(json!([
            "https://www.w3.org/2018/credentials/v1",
            "https://w3id.org/security/suites/ed25519-2020/v1"
        ]))
        .unwrap();
        assert_eq!(set.uris().len(), 2);

        let mixed: Context = serde_json::from_value(json!([
            "https://www.w3.org/2018/credentials/v1",
            { "name": "https://schema.org/name" }
        ]))
        .unwrap();
        assert_eq!(mixed.uris(), vec!["https://www.w3.org/2018/credentials/v1"]);

        let inline: Context = serde_json::from_value(json!({ "name": "https://schema.org/name" })).unwrap();
        assert!(inline.uris().is_empty());
    }
}
