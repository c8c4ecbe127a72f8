//! YAML loading for config documents
//!
//! Parses with yaml-rust2 and converts to `serde_json::Value`, so typed
//! deserialization of configs goes through serde_json.

use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::{Error, Result};

/// Parse a multi-document YAML string into one Value per document.
///
/// Empty documents (a bare `---`) are dropped.
pub fn parse_yaml_documents(input: &str) -> Result<Vec<Value>> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| Error::config(e.to_string()))?;
    docs.into_iter()
        .map(yaml_to_json)
        .filter(|doc| !matches!(doc, Ok(Value::Null)))
        .collect()
}

fn yaml_to_json(yaml: Yaml) -> Result<Value> {
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(b) => Ok(Value::Bool(b)),
        Yaml::Integer(i) => Ok(Value::Number(i.into())),
        Yaml::Real(s) => {
            let f: f64 = s
                .parse()
                .map_err(|e: std::num::ParseFloatError| Error::config(e.to_string()))?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Array(arr) => arr
            .into_iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Yaml::Hash(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = match k {
                    Yaml::String(s) => s,
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Real(r) => r,
                    Yaml::Boolean(b) => b.to_string(),
                    _ => return Err(Error::config("unsupported YAML key type")),
                };
                yaml_to_json(v).map(|v| (key, v))
            })
            .collect::<Result<Map<String, Value>>>()
            .map(Value::Object),
        Yaml::Alias(_) => Err(Error::config("YAML aliases not supported")),
        Yaml::BadValue => Err(Error::config("bad YAML value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Value {
        let mut docs = parse_yaml_documents(input).unwrap();
        assert_eq!(docs.len(), 1);
        docs.remove(0)
    }

    #[test]
    fn nested_mapping() {
        let value = parse_one("kind: Certificate\nspec:\n  dnsNames: [a.example.com]\n");
        assert_eq!(value["kind"], "Certificate");
        assert_eq!(value["spec"]["dnsNames"][0], "a.example.com");
    }

    #[test]
    fn multi_document_skips_empty() {
        let docs = parse_yaml_documents("---\nname: a\n---\n---\nname: b\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["name"], "b");
    }

    #[test]
    fn scalars_keep_their_types() {
        let value = parse_one("prune: true\nreplicas: 3\nratio: 0.5\nempty:\n");
        assert_eq!(value["prune"], true);
        assert_eq!(value["replicas"], 3);
        assert_eq!(value["ratio"], 0.5);
        assert!(value["empty"].is_null());
    }

    #[test]
    fn empty_input_has_no_documents() {
        assert!(parse_yaml_documents("").unwrap().is_empty());
        assert!(parse_yaml_documents("---\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = parse_yaml_documents("key: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
