//! Field tables for every column kind, sampler type and tool config.
//!
//! Adding a column kind means adding a [`KindSchema`] entry here and a
//! payload variant in [`crate::model::ColumnPayload`].

use crate::fields::{FieldKind, FieldSpec};
use crate::model::{CodeLang, ColumnKind, ConvertTo, ExpressionDtype, SamplerType, ValidatorType};

/// Fields every column carries regardless of kind.
pub const COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::NonEmptyString),
    FieldSpec::required("column_type", FieldKind::NonEmptyString),
    FieldSpec::optional("drop", FieldKind::Bool),
];

/// Fields shared by llm-* kinds; rejected on every other kind.
pub const LLM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("model_alias", FieldKind::NonEmptyString),
    FieldSpec::required("prompt", FieldKind::NonEmptyString),
    FieldSpec::optional("system_prompt", FieldKind::String),
    FieldSpec::optional("tool_alias", FieldKind::NonEmptyString),
];

/// Schema for one column kind.
#[derive(Debug)]
pub struct KindSchema {
    pub kind: ColumnKind,
    /// Fields specific to the kind (common and llm fields excluded).
    pub fields: &'static [FieldSpec],
}

impl KindSchema {
    /// Every field the kind accepts, in checking order.
    pub fn all_fields(&self) -> Vec<FieldSpec> {
        let mut fields = COMMON_FIELDS.to_vec();
        if self.kind.is_llm() {
            fields.extend_from_slice(LLM_FIELDS);
        }
        fields.extend_from_slice(self.fields);
        fields
    }
}

pub static KIND_SCHEMAS: &[KindSchema] = &[
    KindSchema {
        kind: ColumnKind::Sampler,
        fields: &[
            FieldSpec::required("sampler_type", FieldKind::OneOf(SamplerType::NAMES)),
            FieldSpec::required("params", FieldKind::Mapping),
            FieldSpec::optional("conditional_params", FieldKind::Mapping),
            FieldSpec::optional("convert_to", FieldKind::OneOf(ConvertTo::NAMES)),
        ],
    },
    KindSchema {
        kind: ColumnKind::LlmText,
        fields: &[],
    },
    KindSchema {
        kind: ColumnKind::LlmCode,
        fields: &[FieldSpec::required(
            "code_lang",
            FieldKind::OneOf(CodeLang::NAMES),
        )],
    },
    KindSchema {
        kind: ColumnKind::LlmStructured,
        fields: &[FieldSpec::required("output_format", FieldKind::Mapping)],
    },
    KindSchema {
        kind: ColumnKind::LlmJudge,
        fields: &[FieldSpec::required("scores", FieldKind::NonEmptyList)],
    },
    KindSchema {
        kind: ColumnKind::Expression,
        fields: &[
            FieldSpec::required("expr", FieldKind::NonEmptyString),
            FieldSpec::optional("dtype", FieldKind::OneOf(ExpressionDtype::NAMES)),
        ],
    },
    KindSchema {
        kind: ColumnKind::Validation,
        fields: &[
            FieldSpec::required("validator_type", FieldKind::OneOf(ValidatorType::NAMES)),
            FieldSpec::required("target_columns", FieldKind::NameList),
            FieldSpec::optional("validator_params", FieldKind::Mapping),
            FieldSpec::optional("batch_size", FieldKind::PositiveInt),
        ],
    },
];

/// Look up the schema for a raw `column_type` value.
pub fn kind_schema(column_type: &str) -> Option<&'static KindSchema> {
    KIND_SCHEMAS
        .iter()
        .find(|schema| schema.kind.as_str() == column_type)
}

/// Kinds whose own table declares `key`.
pub fn kinds_declaring(key: &str) -> Vec<ColumnKind> {
    KIND_SCHEMAS
        .iter()
        .filter(|schema| schema.fields.iter().any(|spec| spec.key == key))
        .map(|schema| schema.kind)
        .collect()
}

/// Fields of one `llm-judge` score entry.
pub const JUDGE_SCORE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::NonEmptyString),
    FieldSpec::required("description", FieldKind::NonEmptyString),
    FieldSpec::required("options", FieldKind::Mapping),
];

/// Parameter table for one sampler type. Known keys are type-checked; other
/// keys pass through to the sampler untouched.
#[derive(Debug)]
pub struct SamplerParamSchema {
    pub sampler_type: SamplerType,
    pub params: &'static [FieldSpec],
}

const DATETIME_UNITS: &[&str] = &["Y", "M", "D", "h", "m", "s"];
const TIMEDELTA_UNITS: &[&str] = &["D", "h", "m", "s"];

const PERSON_PARAMS: &[FieldSpec] = &[
    FieldSpec::optional("locale", FieldKind::NonEmptyString),
    FieldSpec::optional("sex", FieldKind::StringOrList),
    FieldSpec::optional("city", FieldKind::StringOrList),
    FieldSpec::optional("age_range", FieldKind::NumberList),
];

pub static SAMPLER_PARAM_SCHEMAS: &[SamplerParamSchema] = &[
    SamplerParamSchema {
        sampler_type: SamplerType::Category,
        params: &[
            FieldSpec::required("values", FieldKind::NonEmptyList),
            FieldSpec::optional("weights", FieldKind::NumberList),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Subcategory,
        params: &[
            FieldSpec::required("category", FieldKind::NonEmptyString),
            FieldSpec::required("values", FieldKind::Mapping),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Uniform,
        params: &[
            FieldSpec::required("low", FieldKind::Number),
            FieldSpec::required("high", FieldKind::Number),
            FieldSpec::optional("decimal_places", FieldKind::NonNegativeInt),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Gaussian,
        params: &[
            FieldSpec::required("mean", FieldKind::Number),
            FieldSpec::required("stddev", FieldKind::NonNegativeNumber),
            FieldSpec::optional("decimal_places", FieldKind::NonNegativeInt),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Bernoulli,
        params: &[FieldSpec::required("p", FieldKind::Probability)],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::BernoulliMixture,
        params: &[
            FieldSpec::required("p", FieldKind::Probability),
            FieldSpec::required("dist_name", FieldKind::NonEmptyString),
            FieldSpec::required("dist_params", FieldKind::Mapping),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Binomial,
        params: &[
            FieldSpec::required("n", FieldKind::NonNegativeInt),
            FieldSpec::required("p", FieldKind::Probability),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Poisson,
        params: &[FieldSpec::required("mean", FieldKind::PositiveNumber)],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Scipy,
        params: &[
            FieldSpec::required("dist_name", FieldKind::NonEmptyString),
            FieldSpec::required("dist_params", FieldKind::Mapping),
            FieldSpec::optional("decimal_places", FieldKind::NonNegativeInt),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Datetime,
        params: &[
            FieldSpec::required("start", FieldKind::NonEmptyString),
            FieldSpec::required("end", FieldKind::NonEmptyString),
            FieldSpec::optional("unit", FieldKind::OneOf(DATETIME_UNITS)),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Timedelta,
        params: &[
            FieldSpec::required("dt_min", FieldKind::Int),
            FieldSpec::required("dt_max", FieldKind::Int),
            FieldSpec::required("reference_column_name", FieldKind::NonEmptyString),
            FieldSpec::optional("unit", FieldKind::OneOf(TIMEDELTA_UNITS)),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Uuid,
        params: &[
            FieldSpec::optional("prefix", FieldKind::String),
            FieldSpec::optional("short_form", FieldKind::Bool),
            FieldSpec::optional("uppercase", FieldKind::Bool),
        ],
    },
    SamplerParamSchema {
        sampler_type: SamplerType::Person,
        params: PERSON_PARAMS,
    },
    SamplerParamSchema {
        sampler_type: SamplerType::PersonFromFaker,
        params: PERSON_PARAMS,
    },
];

pub fn sampler_param_schema(sampler_type: SamplerType) -> Option<&'static SamplerParamSchema> {
    SAMPLER_PARAM_SCHEMAS
        .iter()
        .find(|schema| schema.sampler_type == sampler_type)
}

pub const TOOL_CONFIG_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("tool_alias", FieldKind::NonEmptyString),
    FieldSpec::required("providers", FieldKind::NameList),
    FieldSpec::optional("allow_tools", FieldKind::StringList),
    FieldSpec::optional("max_tool_call_turns", FieldKind::PositiveInt),
    FieldSpec::optional("timeout_sec", FieldKind::PositiveNumber),
];
