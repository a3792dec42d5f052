use crate::errors::RegistrationError;
use crate::model::{
    ColumnPayload, ColumnSpec, ExpressionColumn, LlmCodeColumn, LlmJudgeColumn,
    LlmStructuredColumn, LlmTextColumn, SamplerColumn, ValidationColumn,
};

/// Registration interface of an external pipeline builder.
///
/// Each method receives the full column (name, `drop`, pass-through keys)
/// together with its typed payload.
pub trait ColumnBuilder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn add_sampler_column(
        &mut self,
        column: &ColumnSpec,
        sampler: &SamplerColumn,
    ) -> Result<(), Self::Error>;

    fn add_llm_text_column(
        &mut self,
        column: &ColumnSpec,
        text: &LlmTextColumn,
    ) -> Result<(), Self::Error>;

    fn add_llm_code_column(
        &mut self,
        column: &ColumnSpec,
        code: &LlmCodeColumn,
    ) -> Result<(), Self::Error>;

    /// `output_format` is handed over exactly as declared.
    fn add_llm_structured_column(
        &mut self,
        column: &ColumnSpec,
        structured: &LlmStructuredColumn,
    ) -> Result<(), Self::Error>;

    fn add_llm_judge_column(
        &mut self,
        column: &ColumnSpec,
        judge: &LlmJudgeColumn,
    ) -> Result<(), Self::Error>;

    fn add_expression_column(
        &mut self,
        column: &ColumnSpec,
        expression: &ExpressionColumn,
    ) -> Result<(), Self::Error>;

    fn add_validation_column(
        &mut self,
        column: &ColumnSpec,
        validation: &ValidationColumn,
    ) -> Result<(), Self::Error>;
}

/// Replay columns against `builder` in order, one call per column.
///
/// Stops at the first builder error; earlier registrations stay applied.
pub fn register_columns<B: ColumnBuilder>(
    columns: &[ColumnSpec],
    builder: &mut B,
) -> Result<(), RegistrationError> {
    for column in columns {
        register_column(column, builder)?;
        tracing::info!(
            event = "column_registered",
            column = %column.name,
            kind = %column.kind()
        );
    }

    tracing::info!(event = "registration_finished", columns = columns.len());
    Ok(())
}

/// Dispatch a single column to the builder method for its kind.
pub fn register_column<B: ColumnBuilder>(
    column: &ColumnSpec,
    builder: &mut B,
) -> Result<(), RegistrationError> {
    let result = match &column.payload {
        ColumnPayload::Sampler(sampler) => builder.add_sampler_column(column, sampler),
        ColumnPayload::LlmText(text) => builder.add_llm_text_column(column, text),
        ColumnPayload::LlmCode(code) => builder.add_llm_code_column(column, code),
        ColumnPayload::LlmStructured(structured) => {
            builder.add_llm_structured_column(column, structured)
        }
        ColumnPayload::LlmJudge(judge) => builder.add_llm_judge_column(column, judge),
        ColumnPayload::Expression(expression) => builder.add_expression_column(column, expression),
        ColumnPayload::Validation(validation) => builder.add_validation_column(column, validation),
    };

    result.map_err(|err| {
        tracing::error!(
            event = "column_registration_failed",
            column = %column.name,
            error = %err
        );
        RegistrationError {
            column: column.name.clone(),
            kind: column.kind(),
            source: Box::new(err),
        }
    })
}
