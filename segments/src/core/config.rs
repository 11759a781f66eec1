use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::resolve_config_path;
use crate::utils::sql::is_valid_table_name;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CUSTOMER_TABLE, DEFAULT_RULE_TABLE,
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_MAX_LIFETIME_SECS,
    POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};

// =============================================================================
// Invalid Rule Policy Enum
// =============================================================================

/// What the runner does with a rule that fails to parse or compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRulePolicy {
    /// Log a warning and continue with the next rule
    Skip,
    /// Abort the whole run
    #[default]
    Halt,
}

impl fmt::Display for InvalidRulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRulePolicy::Skip => write!(f, "skip"),
            InvalidRulePolicy::Halt => write!(f, "halt"),
        }
    }
}

// =============================================================================
// File Config Structs
// =============================================================================

/// PostgreSQL configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    /// PostgreSQL connection URL (or use SEGMENTS_POSTGRES_URL env var)
    pub url: Option<String>,
    /// Maximum number of connections in the pool (default: 4)
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm (default: 1)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds (default: 1800)
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 60)
    pub statement_timeout_secs: Option<u64>,
}

/// Rules configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RulesFileConfig {
    /// Table holding persisted rules (default: demo.segment_rule)
    pub rule_table: Option<String>,
    /// Customer table rules run against (default: saastack_customer_v1.customer)
    pub customer_table: Option<String>,
    /// Fields rules may filter on (empty or missing = any)
    pub allowed_fields: Option<Vec<String>>,
    /// Policy for rules that fail to compile (default: halt)
    pub on_invalid_rule: Option<InvalidRulePolicy>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub parent: Option<String>,
    pub postgres: Option<PostgresFileConfig>,
    pub rules: Option<RulesFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if other.parent.is_some() {
            tracing::trace!(parent = ?other.parent, "Merging parent");
            self.parent = other.parent;
        }

        // Postgres
        if let Some(pg) = other.postgres {
            let current = self
                .postgres
                .get_or_insert_with(PostgresFileConfig::default);
            if pg.url.is_some() {
                tracing::trace!("Merging postgres.url");
                current.url = pg.url;
            }
            if pg.max_connections.is_some() {
                current.max_connections = pg.max_connections;
            }
            if pg.min_connections.is_some() {
                current.min_connections = pg.min_connections;
            }
            if pg.acquire_timeout_secs.is_some() {
                current.acquire_timeout_secs = pg.acquire_timeout_secs;
            }
            if pg.idle_timeout_secs.is_some() {
                current.idle_timeout_secs = pg.idle_timeout_secs;
            }
            if pg.max_lifetime_secs.is_some() {
                current.max_lifetime_secs = pg.max_lifetime_secs;
            }
            if pg.statement_timeout_secs.is_some() {
                current.statement_timeout_secs = pg.statement_timeout_secs;
            }
        }

        // Rules
        if let Some(rules) = other.rules {
            let current = self.rules.get_or_insert_with(RulesFileConfig::default);
            if rules.rule_table.is_some() {
                tracing::trace!(rule_table = ?rules.rule_table, "Merging rules.rule_table");
                current.rule_table = rules.rule_table;
            }
            if rules.customer_table.is_some() {
                tracing::trace!(customer_table = ?rules.customer_table, "Merging rules.customer_table");
                current.customer_table = rules.customer_table;
            }
            if rules.allowed_fields.is_some() {
                tracing::trace!(allowed_fields = ?rules.allowed_fields, "Merging rules.allowed_fields");
                current.allowed_fields = rules.allowed_fields;
            }
            if rules.on_invalid_rule.is_some() {
                tracing::trace!(on_invalid_rule = ?rules.on_invalid_rule, "Merging rules.on_invalid_rule");
                current.on_invalid_rule = rules.on_invalid_rule;
            }
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// PostgreSQL connection URL (empty until resolved)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

/// Segment rule configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct RulesConfig {
    pub rule_table: String,
    pub customer_table: String,
    pub allowed_fields: Vec<String>,
    pub on_invalid_rule: InvalidRulePolicy,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Company/group id scoping the customer query (empty until resolved)
    pub parent: String,
    pub postgres: PostgresConfig,
    pub rules: RulesConfig,
}

impl AppConfig {
    /// Load configuration: defaults -> profile file -> local/CLI file -> CLI/env
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.segments/segments.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = resolve_config_path(path);
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::from_layers(cli, file_config)
    }

    /// Layer CLI/env values over file values over defaults
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_pg = file_config.postgres.unwrap_or_default();
        let file_rules = file_config.rules.unwrap_or_default();

        let parent = cli
            .parent
            .clone()
            .or(file_config.parent)
            .unwrap_or_default();

        let postgres = PostgresConfig {
            url: cli.postgres_url.clone().or(file_pg.url).unwrap_or_default(),
            max_connections: file_pg
                .max_connections
                .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
            min_connections: file_pg
                .min_connections
                .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
            acquire_timeout_secs: file_pg
                .acquire_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout_secs: file_pg
                .idle_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime_secs: file_pg
                .max_lifetime_secs
                .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
            statement_timeout_secs: file_pg
                .statement_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
        };

        let rule_table = file_rules
            .rule_table
            .unwrap_or_else(|| DEFAULT_RULE_TABLE.to_string());
        let customer_table = file_rules
            .customer_table
            .unwrap_or_else(|| DEFAULT_CUSTOMER_TABLE.to_string());

        // Table names are interpolated into SQL, so only plain identifiers pass
        for (key, table) in [("rules.rule_table", &rule_table), ("rules.customer_table", &customer_table)] {
            if !is_valid_table_name(table) {
                anyhow::bail!("Invalid table name for {}: '{}'", key, table);
            }
        }

        let rules = RulesConfig {
            rule_table,
            customer_table,
            allowed_fields: file_rules.allowed_fields.unwrap_or_default(),
            on_invalid_rule: cli
                .on_invalid_rule
                .or(file_rules.on_invalid_rule)
                .unwrap_or_default(),
        };

        tracing::debug!(
            rule_table = %rules.rule_table,
            customer_table = %rules.customer_table,
            allowed_fields = rules.allowed_fields.len(),
            on_invalid_rule = %rules.on_invalid_rule,
            "Configuration resolved"
        );

        Ok(Self {
            parent,
            postgres,
            rules,
        })
    }
}

/// Get the profile config path (~/.segments/segments.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
