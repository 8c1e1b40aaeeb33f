//! Configuration for schema-prune
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (prune.toml)
//! - Environment variables (SCHEMA_PRUNE__*)
//!
//! ## Example config file (prune.toml):
//! ```toml
//! [target]
//! path = "shared/schema.ts"
//!
//! [rules]
//! file = "config/system-health.toml"
//!
//! [output]
//! dry_run = false
//! diff = true
//! json = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::rules::RuleSet;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneConfig {
    /// File to rewrite
    #[serde(default)]
    pub target: TargetConfig,

    /// Where the rules come from
    #[serde(default)]
    pub rules: RulesConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Schema file, rewritten in place
    #[serde(default = "default_target_path")]
    pub path: PathBuf,
}

/// Rule source. Without a file the built-in system health rules are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Filter without writing the file back
    #[serde(default)]
    pub dry_run: bool,

    /// Print a unified diff of the change
    #[serde(default)]
    pub diff: bool,

    /// Print the filter report as JSON
    #[serde(default)]
    pub json: bool,
}

fn default_target_path() -> PathBuf {
    PathBuf::from("shared/schema.ts")
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: default_target_path(),
        }
    }
}

impl PruneConfig {
    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["prune.toml", ".prune.toml", "config/prune.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "schema-prune") {
            let xdg_config = config_dir.config_dir().join("prune.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_PRUNE__TARGET__PATH=... etc.
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_PRUNE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Rule set named by the config, or the built-in one
    pub fn rule_set(&self) -> Result<RuleSet> {
        match &self.rules.file {
            Some(path) => RuleSet::load(path),
            None => Ok(RuleSet::system_health()),
        }
    }
}
