// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "segments";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".segments";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "segments.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SEGMENTS_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SEGMENTS_LOG";

// =============================================================================
// Environment Variables - Run
// =============================================================================

/// Environment variable for the company/group id that scopes customers
pub const ENV_PARENT: &str = "SEGMENTS_PARENT";

/// Environment variable for the PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "SEGMENTS_POSTGRES_URL";

/// Environment variable for the invalid rule policy (skip or halt)
pub const ENV_ON_INVALID_RULE: &str = "SEGMENTS_ON_INVALID_RULE";

// =============================================================================
// Tables
// =============================================================================

/// Table holding persisted segment rules (id, name, rule)
pub const DEFAULT_RULE_TABLE: &str = "demo.segment_rule";

/// Customer table the compiled rules are run against
pub const DEFAULT_CUSTOMER_TABLE: &str = "saastack_customer_v1.customer";

// =============================================================================
// PostgreSQL Defaults
// =============================================================================

/// PostgreSQL default max connections (queries run one rule at a time)
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// PostgreSQL default min connections
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// PostgreSQL default connection acquire timeout in seconds
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL idle connection timeout in seconds
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// PostgreSQL max connection lifetime in seconds
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// PostgreSQL statement timeout in seconds (prevent runaway queries, 0 = disabled)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;
