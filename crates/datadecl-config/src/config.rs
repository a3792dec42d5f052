use std::path::PathBuf;

use serde_json::Value;

use crate::errors::{RegistrationError, Result, ValidationReport};
use crate::model::{ColumnSpec, ToolConfigSpec};
use crate::normalize::normalize_document;
use crate::register::{ColumnBuilder, register_columns};
use crate::source::DocumentSource;
use crate::validate::{reference_report, validate_references};

/// Validated column and tool-config declarations loaded from one document.
///
/// Immutable once built; independent instances share nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarativeColumns {
    origin: String,
    columns: Vec<ColumnSpec>,
    tool_configs: Vec<ToolConfigSpec>,
}

impl DeclarativeColumns {
    /// Load, normalize and validate a document. Fails on the first problem.
    pub fn load(source: DocumentSource) -> Result<Self> {
        let raw = source.read()?;
        let normalized = normalize_document(&raw.value, &raw.origin)?;
        validate_references(&normalized.columns, &normalized.tool_configs)?;

        tracing::info!(
            event = "references_validated",
            origin = %raw.origin,
            columns = normalized.columns.len(),
            tool_configs = normalized.tool_configs.len()
        );

        Ok(Self {
            origin: raw.origin,
            columns: normalized.columns,
            tool_configs: normalized.tool_configs,
        })
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::load(DocumentSource::Path(path.into()))
    }

    pub fn from_yaml_str(text: impl Into<String>) -> Result<Self> {
        Self::load(DocumentSource::Inline(text.into()))
    }

    /// Load and normalize a document, then report every cross-entity issue
    /// instead of stopping at the first one. Load and normalization failures
    /// are still returned as errors.
    pub fn check(source: DocumentSource) -> Result<ValidationReport> {
        let raw = source.read()?;
        let normalized = normalize_document(&raw.value, &raw.origin)?;
        Ok(reference_report(&normalized.columns, &normalized.tool_configs))
    }

    /// Description of the document this model came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Normalized columns as plain JSON mappings, for debugging and display.
    pub fn raw_columns(&self) -> serde_json::Result<Vec<Value>> {
        self.columns.iter().map(serde_json::to_value).collect()
    }

    pub fn tool_configs(&self) -> &[ToolConfigSpec] {
        &self.tool_configs
    }

    pub fn has_tool_configs(&self) -> bool {
        !self.tool_configs.is_empty()
    }

    /// Warnings for the validated model (ex.: unused tool configs).
    pub fn warnings(&self) -> ValidationReport {
        reference_report(&self.columns, &self.tool_configs)
    }

    /// Register every column with `builder`, in declaration order.
    pub fn register<B: ColumnBuilder>(
        &self,
        builder: &mut B,
    ) -> std::result::Result<(), RegistrationError> {
        register_columns(&self.columns, builder)
    }
}
