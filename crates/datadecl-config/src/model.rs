use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

/// Closed string enumeration with its accepted spellings exposed as `NAMES`.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident {
            $($variant:ident => $name:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
        $vis enum $ty {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl $ty {
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            pub fn from_name(value: &str) -> Option<Self> {
                match value {
                    $($name => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum! {
    /// Column category; decides required fields and the registration call.
    pub enum ColumnKind {
        Sampler => "sampler",
        LlmText => "llm-text",
        LlmCode => "llm-code",
        LlmStructured => "llm-structured",
        LlmJudge => "llm-judge",
        Expression => "expression",
        Validation => "validation",
    }
}

impl ColumnKind {
    /// Kinds backed by a model call (`model_alias`, prompts, tools).
    pub fn is_llm(self) -> bool {
        matches!(
            self,
            ColumnKind::LlmText
                | ColumnKind::LlmCode
                | ColumnKind::LlmStructured
                | ColumnKind::LlmJudge
        )
    }
}

named_enum! {
    /// Statistical sampler backing a sampler column.
    pub enum SamplerType {
        Category => "category",
        Subcategory => "subcategory",
        Uniform => "uniform",
        Gaussian => "gaussian",
        Bernoulli => "bernoulli",
        BernoulliMixture => "bernoulli_mixture",
        Binomial => "binomial",
        Poisson => "poisson",
        Scipy => "scipy",
        Datetime => "datetime",
        Timedelta => "timedelta",
        Uuid => "uuid",
        Person => "person",
        PersonFromFaker => "person_from_faker",
    }
}

named_enum! {
    /// Optional cast applied to sampled values.
    pub enum ConvertTo {
        Int => "int",
        Float => "float",
        Str => "str",
    }
}

named_enum! {
    /// Target language of an llm-code column.
    pub enum CodeLang {
        Python => "python",
        Javascript => "javascript",
        Typescript => "typescript",
        Java => "java",
        Kotlin => "kotlin",
        Go => "go",
        Rust => "rust",
        Ruby => "ruby",
        Scala => "scala",
        Swift => "swift",
        C => "c",
        Cpp => "cpp",
        Csharp => "csharp",
        SqlSqlite => "sql:sqlite",
        SqlTsql => "sql:tsql",
        SqlBigquery => "sql:bigquery",
        SqlMysql => "sql:mysql",
        SqlPostgres => "sql:postgres",
        SqlAnsi => "sql:ansi",
    }
}

named_enum! {
    /// Result type of an expression column.
    pub enum ExpressionDtype {
        Int => "int",
        Float => "float",
        Str => "str",
        Bool => "bool",
    }
}

named_enum! {
    /// Validator used by a validation column.
    pub enum ValidatorType {
        Code => "code",
        LocalCallable => "local_callable",
        Remote => "remote",
    }
}

/// Normalized column declaration.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ColumnSpec {
    /// Output key and template reference target; unique in a document.
    pub name: String,
    /// Generate the column but leave it out of the final dataset.
    #[serde(default, skip_serializing_if = "is_false")]
    pub drop: bool,
    /// Kind discriminant (`column_type`) and kind-specific fields.
    #[serde(flatten)]
    pub payload: ColumnPayload,
    /// Keys not described by the kind schema, forwarded to the builder as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnSpec {
    pub fn kind(&self) -> ColumnKind {
        self.payload.kind()
    }

    /// Shared model settings for llm-* columns.
    pub fn llm(&self) -> Option<&LlmSettings> {
        match &self.payload {
            ColumnPayload::LlmText(column) => Some(&column.llm),
            ColumnPayload::LlmCode(column) => Some(&column.llm),
            ColumnPayload::LlmStructured(column) => Some(&column.llm),
            ColumnPayload::LlmJudge(column) => Some(&column.llm),
            ColumnPayload::Sampler(_)
            | ColumnPayload::Expression(_)
            | ColumnPayload::Validation(_) => None,
        }
    }

    pub fn tool_alias(&self) -> Option<&str> {
        self.llm().and_then(|llm| llm.tool_alias.as_deref())
    }

    /// Names of other columns referenced by structured (non-template) fields,
    /// paired with the field path they come from.
    pub fn column_references(&self) -> Vec<(String, &str)> {
        match &self.payload {
            ColumnPayload::Sampler(sampler) => {
                let key = match sampler.sampler_type {
                    SamplerType::Subcategory => "category",
                    SamplerType::Timedelta => "reference_column_name",
                    _ => return Vec::new(),
                };
                sampler
                    .params
                    .get(key)
                    .and_then(Value::as_str)
                    .map(|reference| vec![(format!("params.{key}"), reference)])
                    .unwrap_or_default()
            }
            ColumnPayload::Validation(validation) => validation
                .target_columns
                .iter()
                .enumerate()
                .map(|(idx, target)| (format!("target_columns.{idx}"), target.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Kind-specific part of a column, tagged by `column_type`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "column_type", rename_all = "kebab-case")]
pub enum ColumnPayload {
    Sampler(SamplerColumn),
    LlmText(LlmTextColumn),
    LlmCode(LlmCodeColumn),
    LlmStructured(LlmStructuredColumn),
    LlmJudge(LlmJudgeColumn),
    Expression(ExpressionColumn),
    Validation(ValidationColumn),
}

impl ColumnPayload {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnPayload::Sampler(_) => ColumnKind::Sampler,
            ColumnPayload::LlmText(_) => ColumnKind::LlmText,
            ColumnPayload::LlmCode(_) => ColumnKind::LlmCode,
            ColumnPayload::LlmStructured(_) => ColumnKind::LlmStructured,
            ColumnPayload::LlmJudge(_) => ColumnKind::LlmJudge,
            ColumnPayload::Expression(_) => ColumnKind::Expression,
            ColumnPayload::Validation(_) => ColumnKind::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SamplerColumn {
    pub sampler_type: SamplerType,
    /// Sampler parameters; shape depends on `sampler_type`.
    pub params: Map<String, Value>,
    /// Condition expression -> parameter override.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub conditional_params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert_to: Option<ConvertTo>,
}

/// Settings shared by every llm-* kind.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LlmSettings {
    pub model_alias: String,
    /// Prompt template; placeholders are opaque here.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Tool config granting this column access to MCP tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LlmTextColumn {
    #[serde(flatten)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LlmCodeColumn {
    #[serde(flatten)]
    pub llm: LlmSettings,
    pub code_lang: CodeLang,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LlmStructuredColumn {
    #[serde(flatten)]
    pub llm: LlmSettings,
    /// JSON Schema document describing the expected output.
    pub output_format: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct LlmJudgeColumn {
    #[serde(flatten)]
    pub llm: LlmSettings,
    pub scores: Vec<JudgeScore>,
}

/// One rubric dimension of an llm-judge column.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct JudgeScore {
    pub name: String,
    pub description: String,
    /// Score value -> description.
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ExpressionColumn {
    pub expr: String,
    pub dtype: ExpressionDtype,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ValidationColumn {
    pub validator_type: ValidatorType,
    pub target_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub validator_params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// MCP tool-usage policy referenced by `tool_alias`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ToolConfigSpec {
    pub tool_alias: String,
    /// Provider names, resolved by the caller.
    pub providers: Vec<String>,
    /// Permitted tool names; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_call_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<f64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
