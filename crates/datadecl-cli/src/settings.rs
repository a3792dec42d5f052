use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Settings read from the `--settings` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    pub log_format: LogFormat,
    /// `EnvFilter` directive, e.g. `info` or `datadecl_config=debug`.
    pub log_level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl CliSettings {
    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        log_format: Option<LogFormat>,
        log_level: Option<String>,
        log_file: Option<PathBuf>,
    ) -> Self {
        if let Some(format) = log_format {
            self.log_format = format;
        }
        if log_level.is_some() {
            self.log_level = log_level;
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
        self
    }
}

pub fn load_settings(path: &Path) -> SettingsResult<CliSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_settings(content: &str) -> Result<CliSettings, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse_settings("").expect("parse");
        assert_eq!(settings, CliSettings::default());
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_every_key() {
        let settings = parse_settings(
            "log_format = \"json\"\nlog_level = \"debug\"\nlog_file = \"logs/datadecl.log\"\n",
        )
        .expect("parse");
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(settings.log_file, Some(PathBuf::from("logs/datadecl.log")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_settings("colour = true\n").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let file = CliSettings {
            log_format: LogFormat::Json,
            log_level: Some("debug".to_string()),
            log_file: None,
        };

        let merged = file
            .clone()
            .with_overrides(Some(LogFormat::Text), None, Some(PathBuf::from("out.log")));
        assert_eq!(merged.log_format, LogFormat::Text);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert_eq!(merged.log_file, Some(PathBuf::from("out.log")));

        assert_eq!(file.clone().with_overrides(None, None, None), file);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_settings(Path::new("definitely/not/here.toml")).expect_err("missing");
        assert!(err.to_string().contains("definitely/not/here.toml"));
    }
}
