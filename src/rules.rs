//! Removal rules
//!
//! A [`RuleSet`] is the whole configuration of one pruning pass. It can be
//! built in code, loaded from a TOML rule file, or taken from the built-in
//! [`RuleSet::system_health`] set.
//!
//! ## Example rule file:
//! ```toml
//! type_removals = ["export type Alert ="]
//! duplicate_guard = "complaints = pgTable"
//!
//! [[skip_rules]]
//! marker = "alerts = pgTable"
//! open = "{"
//! close = "});"
//!
//! [[header_replacements]]
//! old = "// Relations for Alerts"
//! new = "// Relations for Complaints"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PruneError, Result};

/// A block removal rule.
///
/// Matches a line containing both `marker` and `open`; that line and every
/// following line up to and including the first one containing `close` are
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRule {
    pub marker: String,
    pub open: String,
    pub close: String,
}

impl SkipRule {
    pub fn new(marker: impl Into<String>, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            open: open.into(),
            close: close.into(),
        }
    }

    /// Whether `line` starts a block removed by this rule
    pub fn opens(&self, line: &str) -> bool {
        line.contains(&self.marker) && line.contains(&self.open)
    }
}

/// Replaces any line containing `old` with the full line `new`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderReplacement {
    pub old: String,
    pub new: String,
}

impl HeaderReplacement {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Complete configuration for one pruning pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Block removals, tried in order
    #[serde(default)]
    pub skip_rules: Vec<SkipRule>,

    /// Single-line removals
    #[serde(default)]
    pub type_removals: Vec<String>,

    /// Comment header renames
    #[serde(default)]
    pub header_replacements: Vec<HeaderReplacement>,

    /// Marker whose occurrences after the first are dropped
    #[serde(default)]
    pub duplicate_guard: Option<String>,
}

const RETIRED_TABLES: &[&str] = &[
    "processes",
    "metrics",
    "metricValues",
    "riskScores",
    "alertRules",
    "alerts",
    "alertConfigurations",
    "alertHistory",
    "healthScoreHistory",
];

const RETIRED_INSERT_SCHEMAS: &[&str] = &[
    "insertProcessSchema",
    "insertMetricSchema",
    "insertMetricValueSchema",
    "insertRiskScoreSchema",
    "insertAlertRuleSchema",
    "insertAlertSchema",
    "insertAlertConfigurationSchema",
    "insertHealthScoreHistorySchema",
];

const RETIRED_TYPES: &[&str] = &[
    "Process",
    "InsertProcess",
    "Metric",
    "InsertMetric",
    "MetricValue",
    "InsertMetricValue",
    "RiskScore",
    "InsertRiskScore",
    "AlertRule",
    "InsertAlertRule",
    "Alert",
    "InsertAlert",
    "AlertConfiguration",
    "InsertAlertConfiguration",
    "AlertHistoryEntry",
    "HealthScoreHistoryEntry",
    "InsertHealthScoreHistoryEntry",
];

impl RuleSet {
    /// Rules that strip the system health module (process monitoring,
    /// metrics, risk scores, alerting) out of `shared/schema.ts`.
    pub fn system_health() -> Self {
        let mut skip_rules = vec![SkipRule::new("processImpactLevelEnum", "[", ");")];
        skip_rules.extend(
            RETIRED_TABLES
                .iter()
                .map(|table| SkipRule::new(format!("{table} = pgTable"), "{", "});")),
        );
        skip_rules.extend(
            RETIRED_INSERT_SCHEMAS
                .iter()
                .map(|schema| SkipRule::new(format!("{schema} ="), "createInsertSchema", "});")),
        );

        let type_removals = RETIRED_TYPES
            .iter()
            .map(|name| format!("export type {name} ="))
            .collect();

        Self {
            skip_rules,
            type_removals,
            header_replacements: vec![HeaderReplacement::new(
                "// Relations for Risk-Based Analysis & Process Monitoring Module",
                "// Relations for Customer Feedback & Complaints",
            )],
            duplicate_guard: Some("complaints = pgTable".to_string()),
        }
    }

    /// Parse a rule set from TOML and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let rules: Self = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load a rule set from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PruneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject empty substrings, which would match every line
    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.skip_rules.iter().enumerate() {
            for (field, value) in [("marker", &rule.marker), ("open", &rule.open), ("close", &rule.close)] {
                if value.is_empty() {
                    return Err(PruneError::InvalidRule(format!(
                        "skip rule #{} has an empty {}",
                        i + 1,
                        field
                    )));
                }
            }
        }

        if let Some(i) = self.type_removals.iter().position(String::is_empty) {
            return Err(PruneError::InvalidRule(format!(
                "type removal #{} is empty",
                i + 1
            )));
        }

        if let Some(i) = self.header_replacements.iter().position(|h| h.old.is_empty()) {
            return Err(PruneError::InvalidRule(format!(
                "header replacement #{} has an empty old text",
                i + 1
            )));
        }

        if matches!(self.duplicate_guard.as_deref(), Some("")) {
            return Err(PruneError::InvalidRule("duplicate guard is empty".to_string()));
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.skip_rules.is_empty()
            && self.type_removals.is_empty()
            && self.header_replacements.is_empty()
            && self.duplicate_guard.is_none()
    }
}
