use std::fmt;
use std::path::Path;

use datadecl_config::{
    ColumnBuilder, ColumnKind, ColumnSpec, DeclarativeColumns, ExpressionColumn, LlmCodeColumn,
    LlmJudgeColumn, LlmStructuredColumn, LlmTextColumn, RecordingBuilder, SamplerColumn,
    ValidationColumn,
};
use serde_json::json;

const REVIEW_RECIPE: &str = r#"
columns:
  - name: category
    column_type: sampler
    sampler_type: category
    params:
      values: [A, B]
  - name: review
    column_type: llm-text
    model_alias: m1
    prompt: "about {{category}}"
"#;

#[test]
fn registers_one_call_per_column_in_order() {
    let config = DeclarativeColumns::from_yaml_str(REVIEW_RECIPE).expect("load recipe");
    assert_eq!(config.column_names(), vec!["category", "review"]);
    assert_eq!(config.len(), 2);
    assert!(config.tool_configs().is_empty());

    let mut builder = RecordingBuilder::new();
    config.register(&mut builder).expect("register columns");

    let calls = builder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].method, "add_sampler_column");
    assert_eq!(calls[0].kind, ColumnKind::Sampler);
    assert_eq!(calls[0].name, "category");
    assert_eq!(
        calls[0].payload,
        json!({
            "name": "category",
            "column_type": "sampler",
            "sampler_type": "category",
            "params": {"values": ["A", "B"]}
        })
    );
    assert_eq!(calls[1].method, "add_llm_text_column");
    assert_eq!(calls[1].name, "review");
}

#[test]
fn replaying_into_fresh_builders_is_idempotent() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/text_to_python.yaml");
    let config = DeclarativeColumns::from_path(path).expect("load recipe");

    let mut first = RecordingBuilder::new();
    let mut second = RecordingBuilder::new();
    config.register(&mut first).expect("first registration");
    config.register(&mut second).expect("second registration");

    assert_eq!(first, second);
    let methods: Vec<_> = first.calls().iter().map(|call| call.method).collect();
    assert_eq!(
        methods,
        vec![
            "add_sampler_column",
            "add_sampler_column",
            "add_sampler_column",
            "add_llm_text_column",
            "add_llm_code_column",
            "add_validation_column",
            "add_llm_judge_column",
            "add_expression_column",
        ]
    );
}

#[test]
fn output_format_reaches_the_builder_unmodified() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mcp_recipe.yaml");
    let config = DeclarativeColumns::from_path(path).expect("load recipe");

    let mut builder = RecordingBuilder::new();
    config.register(&mut builder).expect("register columns");

    let structured = builder
        .calls()
        .iter()
        .find(|call| call.method == "add_llm_structured_column")
        .expect("structured call");
    assert_eq!(
        structured.payload["output_format"],
        json!({
            "type": "object",
            "properties": {
                "summary": {"type": "string"},
                "confidence": {"type": "number"}
            },
            "required": ["summary"]
        })
    );

    let tool_configs = config.tool_configs();
    assert_eq!(tool_configs.len(), 1);
    assert_eq!(tool_configs[0].tool_alias, "my-tools");
    assert_eq!(tool_configs[0].providers, vec!["my-mcp-server".to_string()]);
    assert_eq!(
        tool_configs[0].allow_tools,
        vec!["search".to_string(), "list_items".to_string()]
    );
    assert_eq!(tool_configs[0].max_tool_call_turns, Some(5));
    assert_eq!(tool_configs[0].timeout_sec, Some(30.0));
}

#[derive(Debug)]
struct Rejected(String);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builder rejected {}", self.0)
    }
}

impl std::error::Error for Rejected {}

/// Accepts samplers and rejects everything else.
#[derive(Default)]
struct SamplerOnlyBuilder {
    accepted: Vec<String>,
}

impl SamplerOnlyBuilder {
    fn reject(&self, column: &ColumnSpec) -> Result<(), Rejected> {
        Err(Rejected(column.name.clone()))
    }
}

impl ColumnBuilder for SamplerOnlyBuilder {
    type Error = Rejected;

    fn add_sampler_column(
        &mut self,
        column: &ColumnSpec,
        _sampler: &SamplerColumn,
    ) -> Result<(), Self::Error> {
        self.accepted.push(column.name.clone());
        Ok(())
    }

    fn add_llm_text_column(
        &mut self,
        column: &ColumnSpec,
        _text: &LlmTextColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }

    fn add_llm_code_column(
        &mut self,
        column: &ColumnSpec,
        _code: &LlmCodeColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }

    fn add_llm_structured_column(
        &mut self,
        column: &ColumnSpec,
        _structured: &LlmStructuredColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }

    fn add_llm_judge_column(
        &mut self,
        column: &ColumnSpec,
        _judge: &LlmJudgeColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }

    fn add_expression_column(
        &mut self,
        column: &ColumnSpec,
        _expression: &ExpressionColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }

    fn add_validation_column(
        &mut self,
        column: &ColumnSpec,
        _validation: &ValidationColumn,
    ) -> Result<(), Self::Error> {
        self.reject(column)
    }
}

#[test]
fn registration_stops_at_first_builder_error_without_rollback() {
    let yaml = format!(
        "{REVIEW_RECIPE}  - name: tail\n    column_type: sampler\n    sampler_type: uuid\n    params: {{}}\n"
    );
    let config = DeclarativeColumns::from_yaml_str(yaml).expect("load recipe");
    assert_eq!(config.len(), 3);

    let mut builder = SamplerOnlyBuilder::default();
    let err = config.register(&mut builder).expect_err("llm column rejected");

    assert_eq!(err.column, "review");
    assert_eq!(err.kind, ColumnKind::LlmText);
    assert!(err.to_string().contains("builder rejected review"));
    assert_eq!(builder.accepted, vec!["category".to_string()]);
}
