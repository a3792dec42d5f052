use serde::Serialize;
use serde_json::Value;

use crate::model::{
    ColumnKind, ColumnSpec, ExpressionColumn, LlmCodeColumn, LlmJudgeColumn, LlmStructuredColumn,
    LlmTextColumn, SamplerColumn, ValidationColumn,
};
use crate::register::ColumnBuilder;

/// One builder call captured by [`RecordingBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationCall {
    pub method: &'static str,
    pub kind: ColumnKind,
    pub name: String,
    /// The column as the builder received it.
    pub payload: Value,
}

/// Builder that records every registration call instead of acting on it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingBuilder {
    calls: Vec<RegistrationCall>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RegistrationCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<RegistrationCall> {
        self.calls
    }

    fn record(&mut self, method: &'static str, column: &ColumnSpec) -> Result<(), serde_json::Error> {
        self.calls.push(RegistrationCall {
            method,
            kind: column.kind(),
            name: column.name.clone(),
            payload: serde_json::to_value(column)?,
        });
        Ok(())
    }
}

impl ColumnBuilder for RecordingBuilder {
    type Error = serde_json::Error;

    fn add_sampler_column(
        &mut self,
        column: &ColumnSpec,
        _sampler: &SamplerColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_sampler_column", column)
    }

    fn add_llm_text_column(
        &mut self,
        column: &ColumnSpec,
        _text: &LlmTextColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_llm_text_column", column)
    }

    fn add_llm_code_column(
        &mut self,
        column: &ColumnSpec,
        _code: &LlmCodeColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_llm_code_column", column)
    }

    fn add_llm_structured_column(
        &mut self,
        column: &ColumnSpec,
        _structured: &LlmStructuredColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_llm_structured_column", column)
    }

    fn add_llm_judge_column(
        &mut self,
        column: &ColumnSpec,
        _judge: &LlmJudgeColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_llm_judge_column", column)
    }

    fn add_expression_column(
        &mut self,
        column: &ColumnSpec,
        _expression: &ExpressionColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_expression_column", column)
    }

    fn add_validation_column(
        &mut self,
        column: &ColumnSpec,
        _validation: &ValidationColumn,
    ) -> Result<(), Self::Error> {
        self.record("add_validation_column", column)
    }
}
