use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::ColumnKind;

/// Location of a declaration inside the document, used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRef {
    /// The top level of the document.
    Document,
    /// An entry of the `columns` sequence.
    Column { index: usize, name: Option<String> },
    /// An entry of the `tool_configs` sequence.
    ToolConfig { index: usize, alias: Option<String> },
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRef::Document => write!(f, "document"),
            EntryRef::Column {
                index,
                name: Some(name),
            } => write!(f, "column {index} ('{name}')"),
            EntryRef::Column { index, name: None } => write!(f, "column {index}"),
            EntryRef::ToolConfig {
                index,
                alias: Some(alias),
            } => write!(f, "tool config {index} ('{alias}')"),
            EntryRef::ToolConfig { index, alias: None } => write!(f, "tool config {index}"),
        }
    }
}

/// Line/column reported by the YAML parser (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// Failures while reading or parsing the raw document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("either a file path or inline yaml must be provided")]
    MissingSource,
    #[error("cannot use both a file path and inline yaml; use one or the other")]
    ConflictingSources,
    #[error("yaml configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {message}")]
    Parse {
        origin: String,
        location: Option<SourceLocation>,
        message: String,
    },
    #[error("yaml is empty: {origin}")]
    Empty { origin: String },
}

/// Malformed single declaration; normalization stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{entry}: unknown column_type '{column_type}'")]
    UnknownKind { entry: EntryRef, column_type: String },
    #[error("{entry}: missing required field '{field}'")]
    MissingField { entry: EntryRef, field: String },
    #[error("{entry}: field '{field}' {expected}")]
    SchemaType {
        entry: EntryRef,
        field: String,
        expected: String,
    },
    #[error("no columns defined in {origin}")]
    NoColumns { origin: String },
}

impl NormalizeError {
    /// Entry the error points at, when there is one.
    pub fn entry(&self) -> Option<&EntryRef> {
        match self {
            NormalizeError::UnknownKind { entry, .. }
            | NormalizeError::MissingField { entry, .. }
            | NormalizeError::SchemaType { entry, .. } => Some(entry),
            NormalizeError::NoColumns { .. } => None,
        }
    }

    /// Offending field path (ex.: `params.weights`).
    pub fn field(&self) -> Option<&str> {
        match self {
            NormalizeError::MissingField { field, .. }
            | NormalizeError::SchemaType { field, .. } => Some(field.as_str()),
            NormalizeError::UnknownKind { .. } => Some("column_type"),
            NormalizeError::NoColumns { .. } => None,
        }
    }
}

/// Cross-entity failures found after every declaration was normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate column name '{name}' at positions {first} and {second}")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },
    #[error("duplicate tool_alias '{alias}' at tool config positions {first} and {second}")]
    DuplicateToolAlias {
        alias: String,
        first: usize,
        second: usize,
    },
    #[error("column '{column}' references undeclared tool_alias '{alias}'")]
    UnresolvedToolAlias {
        column: String,
        index: usize,
        alias: String,
    },
    #[error("column '{column}' field '{field}' references undeclared column '{reference}'")]
    UnresolvedColumnReference {
        column: String,
        index: usize,
        field: String,
        reference: String,
    },
    #[error("column '{column}' references itself in '{field}'")]
    SelfReference {
        column: String,
        index: usize,
        field: String,
    },
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::DuplicateName { .. } => "duplicate_column_name",
            ValidationError::DuplicateToolAlias { .. } => "duplicate_tool_alias",
            ValidationError::UnresolvedToolAlias { .. } => "unresolved_tool_alias",
            ValidationError::UnresolvedColumnReference { .. } => "unresolved_column_reference",
            ValidationError::SelfReference { .. } => "self_reference",
        }
    }

    /// JSON pointer into the document.
    pub fn path(&self) -> String {
        match self {
            ValidationError::DuplicateName { second, .. } => format!("/columns/{second}/name"),
            ValidationError::DuplicateToolAlias { second, .. } => {
                format!("/tool_configs/{second}/tool_alias")
            }
            ValidationError::UnresolvedToolAlias { index, .. } => {
                format!("/columns/{index}/tool_alias")
            }
            ValidationError::UnresolvedColumnReference { index, field, .. }
            | ValidationError::SelfReference { index, field, .. } => {
                format!("/columns/{index}/{}", field.replace('.', "/"))
            }
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            ValidationError::DuplicateName { .. } => {
                Some("rename one of the columns; names are output keys".to_string())
            }
            ValidationError::DuplicateToolAlias { .. } => {
                Some("merge the tool configs or give each a distinct tool_alias".to_string())
            }
            ValidationError::UnresolvedToolAlias { alias, .. } => Some(format!(
                "add a tool_configs entry with tool_alias '{alias}'"
            )),
            ValidationError::UnresolvedColumnReference { .. } => None,
            ValidationError::SelfReference { .. } => None,
        }
    }
}

/// Builder failure for a single column; registration halts on it.
#[derive(Debug, Error)]
#[error("failed to add column '{column}' ({kind}): {source}")]
pub struct RegistrationError {
    pub column: String,
    pub kind: ColumnKind,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

/// Any failure while turning a document into a validated model.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(
        severity: IssueSeverity,
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint,
        }
    }
}

impl From<&ValidationError> for ValidationIssue {
    fn from(err: &ValidationError) -> Self {
        ValidationIssue::new(
            IssueSeverity::Error,
            err.code(),
            err.path(),
            err.to_string(),
            err.hint(),
        )
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error issue.
    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Add a warning issue.
    pub fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}
