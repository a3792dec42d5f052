use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::errors::{IssueSeverity, ValidationError, ValidationIssue, ValidationReport};
use crate::model::{ColumnPayload, ColumnSpec, ToolConfigSpec};

/// Fail-fast cross-entity check; returns the first error found.
///
/// Checks run in a fixed order: column names, tool aliases, tool-alias
/// resolution, column references, self references.
pub fn validate_references(
    columns: &[ColumnSpec],
    tool_configs: &[ToolConfigSpec],
) -> Result<(), ValidationError> {
    match reference_errors(columns, tool_configs).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Every cross-entity error, in the same order `validate_references` uses.
pub fn reference_errors(
    columns: &[ColumnSpec],
    tool_configs: &[ToolConfigSpec],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(duplicate_names(columns));
    errors.extend(duplicate_tool_aliases(tool_configs));
    errors.extend(unresolved_tool_aliases(columns, tool_configs));
    errors.extend(unresolved_column_references(columns));
    errors.extend(self_references(columns));

    errors
}

/// Full report with every error plus warnings.
pub fn reference_report(
    columns: &[ColumnSpec],
    tool_configs: &[ToolConfigSpec],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for err in reference_errors(columns, tool_configs) {
        report.push_error(ValidationIssue::from(&err));
    }

    let referenced: HashSet<&str> = columns.iter().filter_map(ColumnSpec::tool_alias).collect();
    for (idx, tool_config) in tool_configs.iter().enumerate() {
        if !referenced.contains(tool_config.tool_alias.as_str()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "unused_tool_config",
                format!("/tool_configs/{idx}"),
                format!(
                    "tool config '{}' is not referenced by any column",
                    tool_config.tool_alias
                ),
                Some("set tool_alias on an llm column or remove the tool config".to_string()),
            ));
        }
    }

    report
}

fn duplicate_names(columns: &[ColumnSpec]) -> Vec<ValidationError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut errors = Vec::new();

    for (idx, column) in columns.iter().enumerate() {
        if let Some(first) = seen.get(column.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: column.name.clone(),
                first: *first,
                second: idx,
            });
        } else {
            seen.insert(column.name.as_str(), idx);
        }
    }

    errors
}

fn duplicate_tool_aliases(tool_configs: &[ToolConfigSpec]) -> Vec<ValidationError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut errors = Vec::new();

    for (idx, tool_config) in tool_configs.iter().enumerate() {
        if let Some(first) = seen.get(tool_config.tool_alias.as_str()) {
            errors.push(ValidationError::DuplicateToolAlias {
                alias: tool_config.tool_alias.clone(),
                first: *first,
                second: idx,
            });
        } else {
            seen.insert(tool_config.tool_alias.as_str(), idx);
        }
    }

    errors
}

fn unresolved_tool_aliases(
    columns: &[ColumnSpec],
    tool_configs: &[ToolConfigSpec],
) -> Vec<ValidationError> {
    let declared: HashSet<&str> = tool_configs
        .iter()
        .map(|tool_config| tool_config.tool_alias.as_str())
        .collect();

    columns
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| {
            let alias = column.tool_alias()?;
            (!declared.contains(alias)).then(|| ValidationError::UnresolvedToolAlias {
                column: column.name.clone(),
                index: idx,
                alias: alias.to_string(),
            })
        })
        .collect()
}

/// Structured references may point anywhere in the document; declaration
/// order only matters to the template engine.
fn unresolved_column_references(columns: &[ColumnSpec]) -> Vec<ValidationError> {
    let declared: HashSet<&str> = columns.iter().map(|column| column.name.as_str()).collect();
    let mut errors = Vec::new();

    for (idx, column) in columns.iter().enumerate() {
        for (field, reference) in column.column_references() {
            if reference == column.name {
                continue;
            }
            if !declared.contains(reference) {
                errors.push(ValidationError::UnresolvedColumnReference {
                    column: column.name.clone(),
                    index: idx,
                    field,
                    reference: reference.to_string(),
                });
            }
        }
    }

    errors
}

fn self_references(columns: &[ColumnSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (idx, column) in columns.iter().enumerate() {
        if let ColumnPayload::Expression(expression) = &column.payload
            && opens_placeholder(&expression.expr, &column.name)
        {
            errors.push(ValidationError::SelfReference {
                column: column.name.clone(),
                index: idx,
                field: "expr".to_string(),
            });
            continue;
        }

        if let Some((field, _)) = column
            .column_references()
            .into_iter()
            .find(|(_, reference)| *reference == column.name)
        {
            errors.push(ValidationError::SelfReference {
                column: column.name.clone(),
                index: idx,
                field,
            });
        }
    }

    errors
}

/// True when `text` has a `{{ name ... }}` placeholder whose expression
/// starts with `name`. Nothing else of the template grammar is interpreted.
fn opens_placeholder(text: &str, name: &str) -> bool {
    let pattern = format!(r"\{{\{{-?\s*{}(?:[^A-Za-z0-9_]|$)", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(regex) => regex.is_match(text),
        Err(err) => {
            tracing::warn!(event = "placeholder_pattern_invalid", error = %err);
            false
        }
    }
}
