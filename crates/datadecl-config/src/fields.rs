use serde_json::{Map, Value};

use crate::errors::{EntryRef, NormalizeError};

/// Shape a declared field must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    NonNegativeInt,
    PositiveInt,
    Number,
    NonNegativeNumber,
    PositiveNumber,
    /// Number in `[0, 1]`.
    Probability,
    String,
    NonEmptyString,
    Mapping,
    /// Sequence of strings, possibly empty.
    StringList,
    /// Non-empty sequence of non-empty strings.
    NameList,
    NumberList,
    /// Non-empty sequence of any values.
    NonEmptyList,
    StringOrList,
    /// One of a closed set of strings.
    OneOf(&'static [&'static str]),
}

impl FieldKind {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Bool => as_bool(value).is_some(),
            FieldKind::Int => value.is_i64() || value.is_u64(),
            FieldKind::NonNegativeInt => value.is_u64(),
            FieldKind::PositiveInt => value
                .as_u64()
                .is_some_and(|value| value > 0 && value <= u64::from(u32::MAX)),
            FieldKind::Number => value.is_number(),
            FieldKind::NonNegativeNumber => value.as_f64().is_some_and(|value| value >= 0.0),
            FieldKind::PositiveNumber => value.as_f64().is_some_and(|value| value > 0.0),
            FieldKind::Probability => value
                .as_f64()
                .is_some_and(|value| (0.0..=1.0).contains(&value)),
            FieldKind::String => value.is_string(),
            FieldKind::NonEmptyString => value.as_str().is_some_and(|value| !value.trim().is_empty()),
            FieldKind::Mapping => value.is_object(),
            FieldKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::NameList => value.as_array().is_some_and(|items| {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|item| item.as_str().is_some_and(|item| !item.trim().is_empty()))
            }),
            FieldKind::NumberList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_number)),
            FieldKind::NonEmptyList => value.as_array().is_some_and(|items| !items.is_empty()),
            FieldKind::StringOrList => value.is_string() || FieldKind::StringList.accepts(value),
            FieldKind::OneOf(domain) => value.as_str().is_some_and(|value| domain.contains(&value)),
        }
    }

    /// Human description used in `SchemaType` errors.
    pub fn expected(self) -> String {
        match self {
            FieldKind::Bool => "must be a boolean".to_string(),
            FieldKind::Int => "must be an integer".to_string(),
            FieldKind::NonNegativeInt => "must be a non-negative integer".to_string(),
            FieldKind::PositiveInt => "must be a positive integer".to_string(),
            FieldKind::Number => "must be a number".to_string(),
            FieldKind::NonNegativeNumber => "must be a non-negative number".to_string(),
            FieldKind::PositiveNumber => "must be a positive number".to_string(),
            FieldKind::Probability => "must be a number between 0 and 1".to_string(),
            FieldKind::String => "must be a string".to_string(),
            FieldKind::NonEmptyString => "must be a non-empty string".to_string(),
            FieldKind::Mapping => "must be a mapping".to_string(),
            FieldKind::StringList => "must be a list of strings".to_string(),
            FieldKind::NameList => "must be a non-empty list of non-empty strings".to_string(),
            FieldKind::NumberList => "must be a list of numbers".to_string(),
            FieldKind::NonEmptyList => "must be a non-empty list".to_string(),
            FieldKind::StringOrList => "must be a string or a list of strings".to_string(),
            FieldKind::OneOf(domain) => format!("must be one of: {}", domain.join(", ")),
        }
    }
}

/// Booleans, plus the YAML 1.1 spellings (`yes`, `off`, ...) that recipes
/// written for 1.1 loaders still use. serde_yaml reads those as strings.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(value) => Some(*value),
        Value::String(text) => match text.as_str() {
            "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Some(true),
            "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => {
                Some(false)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Rewrite `Bool` fields of `map` as JSON booleans.
pub fn coerce_bools(map: &mut Map<String, Value>, specs: &[FieldSpec]) {
    for spec in specs.iter().filter(|spec| spec.kind == FieldKind::Bool) {
        if let Some(value) = map.get_mut(spec.key)
            && let Some(flag) = as_bool(value)
        {
            *value = Value::Bool(flag);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }
}

/// Mapping whose declared fields passed [`check_fields`].
///
/// Null values count as absent.
pub struct FieldMap<'a> {
    map: &'a Map<String, Value>,
    entry: &'a EntryRef,
    prefix: &'a str,
}

/// Check presence and shape of every field in `specs`.
///
/// Keys not named by `specs` are left alone; callers decide whether they are
/// forwarded or rejected. `prefix` is prepended to field names in errors.
pub fn check_fields<'a>(
    map: &'a Map<String, Value>,
    specs: &[FieldSpec],
    entry: &'a EntryRef,
    prefix: &'a str,
) -> Result<FieldMap<'a>, NormalizeError> {
    let fields = FieldMap { map, entry, prefix };

    for spec in specs {
        if spec.required && fields.value(spec.key).is_none() {
            return Err(fields.missing(spec.key));
        }
    }

    for spec in specs {
        if let Some(value) = fields.value(spec.key)
            && !spec.kind.accepts(value)
        {
            return Err(fields.type_error(spec.key, spec.kind.expected()));
        }
    }

    Ok(fields)
}

impl<'a> FieldMap<'a> {
    pub fn entry(&self) -> &'a EntryRef {
        self.entry
    }

    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.value(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.value(key).and_then(as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.value(key).and_then(Value::as_i64)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.value(key)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(Value::as_f64)
    }

    pub fn get_map(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.value(key).and_then(Value::as_object)
    }

    pub fn get_list(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.value(key).and_then(Value::as_array)
    }

    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.get_list(key)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn require_str(&self, key: &str) -> Result<&'a str, NormalizeError> {
        self.get_str(key).ok_or_else(|| self.missing(key))
    }

    pub fn require_map(&self, key: &str) -> Result<&'a Map<String, Value>, NormalizeError> {
        self.get_map(key).ok_or_else(|| self.missing(key))
    }

    pub fn require_list(&self, key: &str) -> Result<&'a Vec<Value>, NormalizeError> {
        self.get_list(key).ok_or_else(|| self.missing(key))
    }

    /// Keys present in the mapping that `specs` does not name.
    pub fn unknown_keys<'s>(&'s self, specs: &'s [FieldSpec]) -> impl Iterator<Item = &'a String> + 's {
        self.map
            .keys()
            .filter(move |key| !specs.iter().any(|spec| spec.key == key.as_str()))
    }

    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    pub fn missing(&self, key: &str) -> NormalizeError {
        NormalizeError::MissingField {
            entry: self.entry.clone(),
            field: self.path(key),
        }
    }

    pub fn type_error(&self, key: &str, expected: impl Into<String>) -> NormalizeError {
        NormalizeError::SchemaType {
            entry: self.entry.clone(),
            field: self.path(key),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPECS: &[FieldSpec] = &[
        FieldSpec::required("values", FieldKind::NonEmptyList),
        FieldSpec::optional("weights", FieldKind::NumberList),
    ];

    fn entry() -> EntryRef {
        EntryRef::Column {
            index: 0,
            name: Some("category".to_string()),
        }
    }

    #[test]
    fn missing_required_field_reports_prefixed_path() {
        let value = json!({"weights": [1.0]});
        let map = value.as_object().expect("object");
        let entry = entry();
        let err = check_fields(map, SPECS, &entry, "params")
            .err()
            .expect("missing values");
        assert_eq!(
            err,
            NormalizeError::MissingField {
                entry: entry.clone(),
                field: "params.values".to_string(),
            }
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let value = json!({"values": ["a"], "weights": null});
        let map = value.as_object().expect("object");
        let entry = entry();
        let fields = check_fields(map, SPECS, &entry, "params").expect("valid");
        assert!(fields.get_list("weights").is_none());
    }

    #[test]
    fn one_of_lists_domain_in_expectation() {
        let kind = FieldKind::OneOf(&["int", "str"]);
        assert!(kind.accepts(&json!("int")));
        assert!(!kind.accepts(&json!("float")));
        assert_eq!(kind.expected(), "must be one of: int, str");
    }

    #[test]
    fn yaml_1_1_booleans_are_accepted_and_rewritten() {
        assert!(FieldKind::Bool.accepts(&json!("yes")));
        assert!(FieldKind::Bool.accepts(&json!("Off")));
        assert!(!FieldKind::Bool.accepts(&json!("maybe")));

        let specs = [
            FieldSpec::optional("short_form", FieldKind::Bool),
            FieldSpec::optional("prefix", FieldKind::String),
        ];
        let mut map = json!({"short_form": "on", "prefix": "yes"})
            .as_object()
            .cloned()
            .expect("object");
        coerce_bools(&mut map, &specs);
        assert_eq!(Value::Object(map), json!({"short_form": true, "prefix": "yes"}));
    }

    #[test]
    fn positive_int_rejects_zero_and_floats() {
        assert!(FieldKind::PositiveInt.accepts(&json!(3)));
        assert!(!FieldKind::PositiveInt.accepts(&json!(0)));
        assert!(!FieldKind::PositiveInt.accepts(&json!(2.5)));
        assert!(!FieldKind::PositiveInt.accepts(&json!(-1)));
    }
}
