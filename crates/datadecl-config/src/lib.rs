//! Declarative column configuration for data-generation pipelines.
//!
//! Turns a YAML document into validated, ordered column declarations and
//! MCP tool configs, then replays them against an external builder.

pub mod config;
pub mod errors;
pub mod fields;
pub mod kinds;
pub mod model;
pub mod normalize;
pub mod recording;
pub mod register;
pub mod schema;
pub mod source;
pub mod validate;

pub use config::DeclarativeColumns;
pub use errors::{
    ConfigError, EntryRef, IssueSeverity, LoadError, NormalizeError, RegistrationError, Result,
    SourceLocation, ValidationError, ValidationIssue, ValidationReport,
};
pub use model::{
    CodeLang, ColumnKind, ColumnPayload, ColumnSpec, ConvertTo, ExpressionColumn,
    ExpressionDtype, JudgeScore, LlmCodeColumn, LlmJudgeColumn, LlmSettings,
    LlmStructuredColumn, LlmTextColumn, SamplerColumn, SamplerType, ToolConfigSpec,
    ValidationColumn, ValidatorType,
};
pub use normalize::{NormalizedDocument, normalize_document};
pub use recording::{RecordingBuilder, RegistrationCall};
pub use register::{ColumnBuilder, register_columns};
pub use schema::document_json_schema;
pub use source::{DocumentSource, RawDocument};
pub use validate::{reference_report, validate_references};
