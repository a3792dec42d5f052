use datadecl_config::{
    ConfigError, DeclarativeColumns, DocumentSource, IssueSeverity, ValidationError,
};

fn validation_error(yaml: &str) -> ValidationError {
    match DeclarativeColumns::from_yaml_str(yaml) {
        Err(ConfigError::Validation(err)) => err,
        Err(other) => panic!("expected validation error, got: {other}"),
        Ok(_) => panic!("expected validation error, document loaded"),
    }
}

const DUPLICATE_NAMES: &str = r#"
columns:
  - name: x
    column_type: sampler
    sampler_type: category
    params: {values: [A, B]}
  - name: x
    column_type: expression
    expr: "{{ 1 }}"
"#;

#[test]
fn duplicate_names_carry_both_positions() {
    let err = validation_error(DUPLICATE_NAMES);
    assert_eq!(
        err,
        ValidationError::DuplicateName {
            name: "x".to_string(),
            first: 0,
            second: 1,
        }
    );
    assert_eq!(err.path(), "/columns/1/name");
}

#[test]
fn renaming_the_duplicate_resolves_it() {
    let renamed = DUPLICATE_NAMES.replacen(
        "- name: x\n    column_type: expression",
        "- name: y\n    column_type: expression",
        1,
    );
    let config = DeclarativeColumns::from_yaml_str(renamed).expect("unique names");
    assert_eq!(config.column_names(), vec!["x", "y"]);
}

const UNRESOLVED_ALIAS: &str = r#"
columns:
  - name: answer
    column_type: llm-text
    model_alias: m1
    tool_alias: t1
    prompt: "Answer the question"
"#;

#[test]
fn undeclared_tool_alias_is_rejected() {
    let err = validation_error(UNRESOLVED_ALIAS);
    assert_eq!(
        err,
        ValidationError::UnresolvedToolAlias {
            column: "answer".to_string(),
            index: 0,
            alias: "t1".to_string(),
        }
    );
    assert!(err.hint().is_some_and(|hint| hint.contains("t1")));
}

#[test]
fn declaring_the_tool_config_resolves_the_alias() {
    let yaml = format!(
        "{UNRESOLVED_ALIAS}tool_configs:\n  - tool_alias: t1\n    providers: [search-server]\n"
    );
    let config = DeclarativeColumns::from_yaml_str(yaml).expect("alias resolves");

    assert!(config.has_tool_configs());
    let tool_config = &config.tool_configs()[0];
    assert_eq!(tool_config.tool_alias, "t1");
    assert_eq!(tool_config.providers, vec!["search-server".to_string()]);
    assert!(tool_config.allow_tools.is_empty());
    assert_eq!(tool_config.max_tool_call_turns, None);
    assert_eq!(config.columns()[0].tool_alias(), Some("t1"));
}

#[test]
fn duplicate_tool_aliases_are_rejected() {
    let err = validation_error(
        r#"
tool_configs:
  - tool_alias: t1
    providers: [a]
  - tool_alias: t1
    providers: [b]
columns:
  - name: answer
    column_type: llm-text
    model_alias: m1
    tool_alias: t1
    prompt: "Answer"
"#,
    );
    assert_eq!(
        err,
        ValidationError::DuplicateToolAlias {
            alias: "t1".to_string(),
            first: 0,
            second: 1,
        }
    );
}

#[test]
fn validation_targets_must_be_declared() {
    let err = validation_error(
        r#"
columns:
  - name: code
    column_type: llm-code
    model_alias: m1
    prompt: "Write code"
    code_lang: python
  - name: check
    column_type: validation
    validator_type: code
    target_columns: [code, tests]
"#,
    );
    assert_eq!(
        err,
        ValidationError::UnresolvedColumnReference {
            column: "check".to_string(),
            index: 1,
            field: "target_columns.1".to_string(),
            reference: "tests".to_string(),
        }
    );
    assert_eq!(err.path(), "/columns/1/target_columns/1");
}

#[test]
fn sampler_references_are_checked() {
    let err = validation_error(
        r#"
columns:
  - name: topic
    column_type: sampler
    sampler_type: subcategory
    params:
      category: sector
      values:
        Finance: [Fraud]
"#,
    );
    assert!(matches!(
        err,
        ValidationError::UnresolvedColumnReference { ref field, ref reference, .. }
            if field == "params.category" && reference == "sector"
    ));
}

#[test]
fn structured_references_may_point_forward() {
    let config = DeclarativeColumns::from_yaml_str(
        r#"
columns:
  - name: check
    column_type: validation
    validator_type: local_callable
    target_columns: [code]
  - name: code
    column_type: llm-code
    model_alias: m1
    prompt: "Write code"
    code_lang: rust
"#,
    )
    .expect("order is not enforced");
    assert_eq!(config.len(), 2);
}

#[test]
fn self_referential_expression_is_rejected() {
    let err = validation_error(
        r#"
columns:
  - name: total
    column_type: expression
    expr: "{{ total + 1 }}"
"#,
    );
    assert_eq!(
        err,
        ValidationError::SelfReference {
            column: "total".to_string(),
            index: 0,
            field: "expr".to_string(),
        }
    );
}

#[test]
fn validation_column_cannot_target_itself() {
    let err = validation_error(
        r#"
columns:
  - name: check
    column_type: validation
    validator_type: remote
    target_columns: [check]
"#,
    );
    assert!(matches!(
        err,
        ValidationError::SelfReference { ref field, .. } if field == "target_columns.0"
    ));
}

#[test]
fn template_forward_references_are_not_checked() {
    let config = DeclarativeColumns::from_yaml_str(
        r#"
columns:
  - name: review
    column_type: llm-text
    model_alias: m1
    prompt: "Review {{ product }} in {{ not_declared_anywhere }}"
  - name: product
    column_type: sampler
    sampler_type: category
    params: {values: [lamp, desk]}
"#,
    )
    .expect("templates are opaque");
    assert_eq!(config.column_names(), vec!["review", "product"]);
}

#[test]
fn check_reports_every_issue_and_warnings() {
    let report = DeclarativeColumns::check(DocumentSource::Inline(
        r#"
tool_configs:
  - tool_alias: unused
    providers: [server]
columns:
  - name: x
    column_type: expression
    expr: "1"
  - name: x
    column_type: expression
    expr: "2"
  - name: answer
    column_type: llm-text
    model_alias: m1
    tool_alias: t1
    prompt: "Answer"
"#
        .to_string(),
    ))
    .expect("document normalizes");

    assert!(!report.is_ok());
    let codes: Vec<_> = report.errors.iter().map(|issue| issue.code.as_str()).collect();
    assert_eq!(codes, vec!["duplicate_column_name", "unresolved_tool_alias"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].severity, IssueSeverity::Warning);
    assert_eq!(report.warnings[0].code, "unused_tool_config");
    assert_eq!(report.warnings[0].path, "/tool_configs/0");
}

#[test]
fn loaded_model_reports_unused_tool_configs_as_warnings() {
    let yaml = format!(
        "{UNRESOLVED_ALIAS}tool_configs:\n  - tool_alias: t1\n    providers: [a]\n  - tool_alias: spare\n    providers: [b]\n"
    );
    let config = DeclarativeColumns::from_yaml_str(yaml).expect("valid model");
    let report = config.warnings();
    assert!(report.is_ok());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].message.contains("spare"));
}
