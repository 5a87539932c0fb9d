mod advisor;
mod document;
mod llm;

pub use advisor::*;
pub use document::*;
pub use llm::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut error = |field: &str, message: &str| {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: field.into(),
                message: message.into(),
            });
        };

        if self.llm.base_url.trim().is_empty() {
            error("llm.base_url", "base_url must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            error("llm.model", "model must not be empty");
        }
        if self.llm.timeout_ms == 0 {
            error("llm.timeout_ms", "timeout must be greater than 0");
        }

        let temps = [
            ("advisor.temperature", self.advisor.temperature),
            ("advisor.structured_temperature", self.advisor.structured_temperature),
            ("advisor.detection_temperature", self.advisor.detection_temperature),
        ];
        for (field, t) in temps {
            if !(0.0..=2.0).contains(&t) {
                error(field, "temperature must be within 0.0 – 2.0");
            }
        }

        let limits = [
            ("advisor.max_output_tokens", self.advisor.max_output_tokens),
            (
                "advisor.structured_max_output_tokens",
                self.advisor.structured_max_output_tokens,
            ),
            (
                "advisor.detection_max_output_tokens",
                self.advisor.detection_max_output_tokens,
            ),
        ];
        for (field, n) in limits {
            if n == 0 {
                error(field, "token limit must be greater than 0");
            }
        }

        if self.document.max_chars == 0 {
            error("document.max_chars", "max_chars must be greater than 0");
        }

        // Warn when no credential source is configured.
        if self.llm.auth.key.is_none() && self.llm.auth.env.is_none() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "llm.auth".into(),
                message: "neither 'key' nor 'env' is set; the provider cannot start without an API key".into(),
            });
        }

        errors
    }
}
