use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::{ColumnSpec, ToolConfigSpec};

/// Shape of a normalized columns document.
#[derive(JsonSchema)]
#[allow(dead_code)]
struct ColumnsDocument {
    /// Column declarations, in generation order.
    columns: Vec<ColumnSpec>,
    /// MCP tool-usage policies referenced by `tool_alias`.
    #[serde(default)]
    tool_configs: Vec<ToolConfigSpec>,
}

/// Emit the JSON Schema for a columns document.
pub fn document_json_schema() -> RootSchema {
    schema_for!(ColumnsDocument)
}
