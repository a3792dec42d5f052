use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{LoadError, SourceLocation};

/// Where the YAML document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Inline(String),
}

impl DocumentSource {
    /// Build a source from two optional inputs; exactly one must be set.
    pub fn from_parts(path: Option<PathBuf>, inline: Option<String>) -> Result<Self, LoadError> {
        match (path, inline) {
            (Some(path), None) => Ok(DocumentSource::Path(path)),
            (None, Some(text)) => Ok(DocumentSource::Inline(text)),
            (Some(_), Some(_)) => Err(LoadError::ConflictingSources),
            (None, None) => Err(LoadError::MissingSource),
        }
    }

    /// Short description used in messages (ex.: `file recipes/a.yaml`).
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Path(path) => format!("file {}", path.display()),
            DocumentSource::Inline(_) => "inline yaml".to_string(),
        }
    }

    /// Read and parse the document without any semantic checks.
    pub fn read(&self) -> Result<RawDocument, LoadError> {
        let origin = self.describe();
        let value = match self {
            DocumentSource::Path(path) => {
                let text = read_file(path)?;
                parse_yaml(&text, &origin)?
            }
            DocumentSource::Inline(text) => parse_yaml(text, &origin)?,
        };

        if value.is_null() {
            return Err(LoadError::Empty { origin });
        }

        tracing::debug!(event = "document_loaded", origin = %origin);
        Ok(RawDocument { origin, value })
    }
}

/// Untyped document tree; lives only until normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub origin: String,
    pub value: Value,
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse YAML text into a JSON value tree, resolving `<<` merge keys.
pub fn parse_yaml(text: &str, origin: &str) -> Result<Value, LoadError> {
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| parse_error(origin, &err))?;
    yaml.apply_merge().map_err(|err| parse_error(origin, &err))?;

    yaml_to_json(&yaml).map_err(|message| LoadError::Parse {
        origin: origin.to_string(),
        location: None,
        message,
    })
}

fn parse_error(origin: &str, err: &serde_yaml::Error) -> LoadError {
    LoadError::Parse {
        origin: origin.to_string(),
        location: err.location().map(|location| SourceLocation {
            line: location.line(),
            column: location.column(),
        }),
        message: err.to_string(),
    }
}

/// Convert the JSON-compatible subset of YAML; tags are dropped.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(value) => Ok(Value::Bool(*value)),
        serde_yaml::Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(Value::from(value))
            } else if let Some(value) = number.as_u64() {
                Ok(Value::from(value))
            } else if let Some(value) = number.as_f64() {
                serde_json::Number::from_f64(value)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent number {value} outside YAML"))
            } else {
                Err(format!("unsupported number: {number}"))
            }
        }
        serde_yaml::Value::String(value) => Ok(Value::String(value.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(key) => key.clone(),
                    serde_yaml::Value::Number(key) => key.to_string(),
                    serde_yaml::Value::Bool(key) => key.to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Ok(Value::Object(map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_keys_become_strings() {
        let value = parse_yaml("options:\n  1: poor\n  5: great\n", "inline yaml")
            .expect("parse yaml");
        assert_eq!(value, json!({"options": {"1": "poor", "5": "great"}}));
    }

    #[test]
    fn merge_keys_are_applied() {
        let value = parse_yaml(
            "defaults: &llm\n  model_alias: m1\n  prompt: base\ncolumn:\n  <<: *llm\n  prompt: hi\n",
            "inline yaml",
        )
        .expect("parse yaml");
        assert_eq!(value["column"], json!({"model_alias": "m1", "prompt": "hi"}));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let err = parse_yaml("timeout_sec: .inf\n", "inline yaml").expect_err("inf rejected");
        assert!(matches!(err, LoadError::Parse { location: None, .. }));
    }

    #[test]
    fn parse_error_carries_location() {
        let err = parse_yaml("columns:\n  - name: [unclosed\n", "inline yaml")
            .expect_err("invalid yaml");
        match err {
            LoadError::Parse { location, .. } => assert!(location.is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
