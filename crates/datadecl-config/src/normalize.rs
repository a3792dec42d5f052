use jsonschema::JSONSchema;
use serde_json::{Map, Value};

use crate::errors::{EntryRef, NormalizeError};
use crate::fields::{FieldMap, check_fields};
use crate::fields::coerce_bools;
use crate::kinds::{
    JUDGE_SCORE_FIELDS, KindSchema, LLM_FIELDS, TOOL_CONFIG_FIELDS, kind_schema,
    kinds_declaring, sampler_param_schema,
};
use crate::model::{
    CodeLang, ColumnKind, ColumnPayload, ColumnSpec, ConvertTo, ExpressionColumn,
    ExpressionDtype, JudgeScore, LlmCodeColumn, LlmJudgeColumn, LlmSettings,
    LlmStructuredColumn, LlmTextColumn, SamplerColumn, SamplerType, ToolConfigSpec,
    ValidationColumn, ValidatorType,
};

/// Typed declarations in document order, not yet cross-validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub columns: Vec<ColumnSpec>,
    pub tool_configs: Vec<ToolConfigSpec>,
}

/// Normalize a raw document into typed column and tool-config lists.
///
/// Accepts a mapping with a `columns` sequence (plus optional
/// `tool_configs`) or a bare sequence of columns. Stops at the first
/// malformed declaration.
pub fn normalize_document(raw: &Value, origin: &str) -> Result<NormalizedDocument, NormalizeError> {
    let (columns_value, tools_value) = match raw {
        Value::Object(map) => {
            let Some(columns) = map.get("columns") else {
                return Err(NormalizeError::MissingField {
                    entry: EntryRef::Document,
                    field: "columns".to_string(),
                });
            };
            (columns, map.get("tool_configs"))
        }
        Value::Array(_) => (raw, None),
        _ => {
            return Err(NormalizeError::SchemaType {
                entry: EntryRef::Document,
                field: "columns".to_string(),
                expected: "must be a mapping with a 'columns' list or a list of column definitions"
                    .to_string(),
            });
        }
    };

    let entries = match columns_value {
        Value::Array(entries) if !entries.is_empty() => entries,
        Value::Array(_) | Value::Null => {
            return Err(NormalizeError::NoColumns {
                origin: origin.to_string(),
            });
        }
        _ => {
            return Err(NormalizeError::SchemaType {
                entry: EntryRef::Document,
                field: "columns".to_string(),
                expected: "must be a list".to_string(),
            });
        }
    };

    let columns = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_column(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let tool_configs = match tools_value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| normalize_tool_config(index, entry))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(NormalizeError::SchemaType {
                entry: EntryRef::Document,
                field: "tool_configs".to_string(),
                expected: "must be a list".to_string(),
            });
        }
    };

    tracing::debug!(
        event = "columns_normalized",
        origin = %origin,
        columns = columns.len(),
        tool_configs = tool_configs.len()
    );

    Ok(NormalizedDocument {
        columns,
        tool_configs,
    })
}

/// Normalize one entry of the `columns` sequence.
pub fn normalize_column(index: usize, value: &Value) -> Result<ColumnSpec, NormalizeError> {
    let Value::Object(map) = value else {
        return Err(NormalizeError::SchemaType {
            entry: EntryRef::Column { index, name: None },
            field: format!("columns.{index}"),
            expected: "must be a mapping".to_string(),
        });
    };

    let entry = EntryRef::Column {
        index,
        name: map.get("name").and_then(Value::as_str).map(str::to_string),
    };

    let schema = resolve_kind(map, &entry)?;
    let specs = schema.all_fields();
    let fields = check_fields(map, &specs, &entry, "")?;

    if !schema.kind.is_llm()
        && let Some(spec) = LLM_FIELDS.iter().find(|spec| fields.value(spec.key).is_some())
    {
        return Err(fields.type_error(
            spec.key,
            format!("is only valid for llm-* columns, not {}", schema.kind),
        ));
    }

    for key in fields.unknown_keys(&specs) {
        let owners = kinds_declaring(key);
        if !owners.is_empty() {
            let owners: Vec<_> = owners.iter().map(|kind| kind.as_str()).collect();
            return Err(fields.type_error(
                key,
                format!(
                    "is only valid for {} columns, not {}",
                    owners.join(" or "),
                    schema.kind
                ),
            ));
        }
    }

    let payload = match schema.kind {
        ColumnKind::Sampler => ColumnPayload::Sampler(sampler_column(&fields)?),
        ColumnKind::LlmText => ColumnPayload::LlmText(LlmTextColumn {
            llm: llm_settings(&fields)?,
        }),
        ColumnKind::LlmCode => ColumnPayload::LlmCode(llm_code_column(&fields)?),
        ColumnKind::LlmStructured => {
            ColumnPayload::LlmStructured(llm_structured_column(&fields)?)
        }
        ColumnKind::LlmJudge => ColumnPayload::LlmJudge(llm_judge_column(&fields)?),
        ColumnKind::Expression => ColumnPayload::Expression(expression_column(&fields)?),
        ColumnKind::Validation => ColumnPayload::Validation(validation_column(&fields)?),
    };

    let mut extra = Map::new();
    for key in fields.unknown_keys(&specs) {
        if let Some(value) = map.get(key.as_str()) {
            tracing::debug!(event = "extra_field_forwarded", index, field = %key);
            extra.insert(key.clone(), value.clone());
        }
    }

    Ok(ColumnSpec {
        name: fields.require_str("name")?.to_string(),
        drop: fields.get_bool("drop").unwrap_or(false),
        payload,
        extra,
    })
}

/// `column_type` is resolved before any other field so an unknown kind wins
/// over every other problem in the entry.
fn resolve_kind(
    map: &Map<String, Value>,
    entry: &EntryRef,
) -> Result<&'static KindSchema, NormalizeError> {
    let raw = match map.get("column_type") {
        None | Some(Value::Null) => {
            return Err(NormalizeError::MissingField {
                entry: entry.clone(),
                field: "column_type".to_string(),
            });
        }
        Some(Value::String(raw)) => raw.as_str(),
        Some(other) => {
            return Err(NormalizeError::UnknownKind {
                entry: entry.clone(),
                column_type: other.to_string(),
            });
        }
    };

    kind_schema(raw.trim()).ok_or_else(|| NormalizeError::UnknownKind {
        entry: entry.clone(),
        column_type: raw.to_string(),
    })
}

fn llm_settings(fields: &FieldMap<'_>) -> Result<LlmSettings, NormalizeError> {
    Ok(LlmSettings {
        model_alias: fields.require_str("model_alias")?.to_string(),
        prompt: fields.require_str("prompt")?.to_string(),
        system_prompt: fields.get_str("system_prompt").map(str::to_string),
        tool_alias: fields.get_str("tool_alias").map(str::to_string),
    })
}

fn sampler_column(fields: &FieldMap<'_>) -> Result<SamplerColumn, NormalizeError> {
    let sampler_type = parse_enum(fields, "sampler_type", SamplerType::from_name)?;
    let params = fields.require_map("params")?;
    check_sampler_params(fields.entry(), sampler_type, params, "params")?;
    let mut params = params.clone();
    normalize_params(sampler_type, &mut params);

    let mut conditional_params = fields.get_map("conditional_params").cloned().unwrap_or_default();
    for (condition, value) in conditional_params.iter_mut() {
        let path = format!("conditional_params.{condition}");
        let Some(params) = value.as_object() else {
            return Err(NormalizeError::SchemaType {
                entry: fields.entry().clone(),
                field: path,
                expected: "must be a mapping of sampler params".to_string(),
            });
        };
        check_sampler_params(fields.entry(), sampler_type, params, &path)?;
        if let Some(params) = value.as_object_mut() {
            normalize_params(sampler_type, params);
        }
    }

    let convert_to = match fields.get_str("convert_to") {
        Some(_) => Some(parse_enum(fields, "convert_to", ConvertTo::from_name)?),
        None => None,
    };

    Ok(SamplerColumn {
        sampler_type,
        params,
        conditional_params,
        convert_to,
    })
}

fn normalize_params(sampler_type: SamplerType, params: &mut Map<String, Value>) {
    if let Some(schema) = sampler_param_schema(sampler_type) {
        coerce_bools(params, schema.params);
    }
}

/// Check the known parameters of a sampler, plus the cross-field bounds the
/// table cannot express.
fn check_sampler_params(
    entry: &EntryRef,
    sampler_type: SamplerType,
    params: &Map<String, Value>,
    prefix: &str,
) -> Result<(), NormalizeError> {
    let Some(schema) = sampler_param_schema(sampler_type) else {
        return Ok(());
    };
    let fields = check_fields(params, schema.params, entry, prefix)?;

    match sampler_type {
        SamplerType::Category => {
            if let (Some(values), Some(weights)) = (fields.get_list("values"), fields.get_list("weights")) {
                if weights.len() != values.len() {
                    return Err(fields.type_error(
                        "weights",
                        format!("must have one entry per value ({} values)", values.len()),
                    ));
                }
                if weights
                    .iter()
                    .any(|weight| weight.as_f64().is_some_and(|weight| weight < 0.0))
                {
                    return Err(fields.type_error("weights", "must not contain negative numbers"));
                }
            }
        }
        SamplerType::Subcategory => {
            let values = fields.require_map("values")?;
            if values.values().any(|options| !options.is_array()) {
                return Err(
                    fields.type_error("values", "must map each category value to a list")
                );
            }
        }
        SamplerType::Uniform => {
            if let (Some(low), Some(high)) = (fields.get_f64("low"), fields.get_f64("high"))
                && low > high
            {
                return Err(fields.type_error("low", "must be <= high"));
            }
        }
        SamplerType::Timedelta => {
            if let (Some(min), Some(max)) = (fields.get_i64("dt_min"), fields.get_i64("dt_max"))
                && min >= max
            {
                return Err(fields.type_error("dt_min", "must be < dt_max"));
            }
        }
        SamplerType::Person | SamplerType::PersonFromFaker => {
            if let Some(range) = fields.get_list("age_range")
                && (range.len() != 2 || !range.iter().all(|age| age.is_u64()))
            {
                return Err(fields.type_error("age_range", "must be a list of two non-negative integers"));
            }
        }
        _ => {}
    }

    Ok(())
}

fn llm_code_column(fields: &FieldMap<'_>) -> Result<LlmCodeColumn, NormalizeError> {
    Ok(LlmCodeColumn {
        llm: llm_settings(fields)?,
        code_lang: parse_enum(fields, "code_lang", CodeLang::from_name)?,
    })
}

fn llm_structured_column(fields: &FieldMap<'_>) -> Result<LlmStructuredColumn, NormalizeError> {
    let output_format = fields.require_map("output_format")?;
    let document = Value::Object(output_format.clone());
    if let Err(err) = JSONSchema::compile(&document) {
        return Err(fields.type_error(
            "output_format",
            format!("must be a valid JSON Schema document: {err}"),
        ));
    }

    Ok(LlmStructuredColumn {
        llm: llm_settings(fields)?,
        output_format: output_format.clone(),
    })
}

fn llm_judge_column(fields: &FieldMap<'_>) -> Result<LlmJudgeColumn, NormalizeError> {
    let entries = fields.require_list("scores")?;
    let mut scores = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.iter().enumerate() {
        let path = fields.path(&format!("scores.{idx}"));
        let Some(map) = entry.as_object() else {
            return Err(NormalizeError::SchemaType {
                entry: fields.entry().clone(),
                field: path,
                expected: "must be a mapping".to_string(),
            });
        };
        let score = check_fields(map, JUDGE_SCORE_FIELDS, fields.entry(), &path)?;
        let options = score.require_map("options")?;
        if options.is_empty() {
            return Err(score.type_error("options", "must not be empty"));
        }
        scores.push(JudgeScore {
            name: score.require_str("name")?.to_string(),
            description: score.require_str("description")?.to_string(),
            options: options.clone(),
        });
    }

    Ok(LlmJudgeColumn {
        llm: llm_settings(fields)?,
        scores,
    })
}

fn expression_column(fields: &FieldMap<'_>) -> Result<ExpressionColumn, NormalizeError> {
    let dtype = match fields.get_str("dtype") {
        Some(_) => parse_enum(fields, "dtype", ExpressionDtype::from_name)?,
        None => ExpressionDtype::Str,
    };
    Ok(ExpressionColumn {
        expr: fields.require_str("expr")?.to_string(),
        dtype,
    })
}

fn validation_column(fields: &FieldMap<'_>) -> Result<ValidationColumn, NormalizeError> {
    Ok(ValidationColumn {
        validator_type: parse_enum(fields, "validator_type", ValidatorType::from_name)?,
        target_columns: fields.get_strings("target_columns"),
        validator_params: fields.get_map("validator_params").cloned().unwrap_or_default(),
        batch_size: fields.get_u32("batch_size"),
    })
}

/// Normalize one entry of the `tool_configs` sequence. Unlike columns, tool
/// configs have no pass-through keys.
pub fn normalize_tool_config(index: usize, value: &Value) -> Result<ToolConfigSpec, NormalizeError> {
    let Value::Object(map) = value else {
        return Err(NormalizeError::SchemaType {
            entry: EntryRef::ToolConfig { index, alias: None },
            field: format!("tool_configs.{index}"),
            expected: "must be a mapping".to_string(),
        });
    };

    let entry = EntryRef::ToolConfig {
        index,
        alias: map.get("tool_alias").and_then(Value::as_str).map(str::to_string),
    };
    let fields = check_fields(map, TOOL_CONFIG_FIELDS, &entry, "")?;

    if let Some(key) = fields.unknown_keys(TOOL_CONFIG_FIELDS).next() {
        return Err(fields.type_error(key, "is not a recognized tool config field"));
    }

    Ok(ToolConfigSpec {
        tool_alias: fields.require_str("tool_alias")?.to_string(),
        providers: fields.get_strings("providers"),
        allow_tools: fields.get_strings("allow_tools"),
        max_tool_call_turns: fields.get_u32("max_tool_call_turns"),
        timeout_sec: fields.get_f64("timeout_sec"),
    })
}

fn parse_enum<T>(
    fields: &FieldMap<'_>,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, NormalizeError> {
    let raw = fields.require_str(key)?;
    parse(raw).ok_or_else(|| fields.type_error(key, format!("has unsupported value '{raw}'")))
}
