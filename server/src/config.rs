//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::permissions::{AuthorizerStore, RuleTable};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, for local development
    Pretty,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON rules file; the built-in table is used when unset
    pub rules_path: Option<PathBuf>,

    /// Reject rule tables where a higher role has less access (default: true)
    pub strict_rules: bool,

    /// Log output format (default: JSON)
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rules_path: env::var("AUTHZ_RULES_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            // Anything but an explicit "off" keeps strict validation.
            strict_rules: env::var("AUTHZ_STRICT_RULES").map_or(true, |v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "false" | "0" | "no" | "off"
                )
            }),
            log_format: env::var("LOG_FORMAT")
                .map(|v| LogFormat::from_env_value(&v))
                .unwrap_or_default(),
        })
    }

    /// Build the rule table this configuration points at, validated.
    #[tracing::instrument(skip(self), fields(path = ?self.rules_path, strict = self.strict_rules))]
    pub fn load_rules(&self) -> Result<RuleTable> {
        let table = match &self.rules_path {
            Some(path) => RuleTable::load(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?,
            None => {
                tracing::info!("Using built-in rule table");
                RuleTable::default_table()
            }
        };
        table
            .validated(self.strict_rules)
            .context("Rule table rejected")
    }

    /// Load the rules without rejecting them and list every monotonicity
    /// violation, whatever `strict_rules` says.
    ///
    /// Fails only if the rules cannot be read or parsed.
    pub fn check_rules(&self) -> Result<Vec<String>> {
        let lenient = Self {
            strict_rules: false,
            ..self.clone()
        };
        let table = lenient.load_rules()?;
        Ok(table.monotonicity_violations())
    }

    /// Load the rules and wrap them in a store.
    pub fn build_store(&self) -> Result<AuthorizerStore> {
        Ok(AuthorizerStore::from_table(self.load_rules()?))
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub const fn default_for_test() -> Self {
        Self {
            rules_path: None,
            strict_rules: true,
            log_format: LogFormat::Pretty,
        }
    }
}
