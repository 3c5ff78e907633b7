// sqldiff-config/src/config.rs
// ============================================================================
// Module: sqldiff Configuration
// Description: Configuration loading, override merging, and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, sqldiff-core, sqldiff-sqlite, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration comes from an optional TOML file: the path given on the
//! command line, else the `SQLDIFF_CONFIG` environment variable, else no file
//! at all (built-in defaults). Files are size-limited, must be UTF-8, and may
//! not contain unknown keys. Command-line flags are merged on top through
//! [`ConfigOverrides`] before [`HarnessConfig::validate_for_exec`] checks that
//! a run has everything it needs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use sqldiff_core::CompareMode;
use sqldiff_core::DiffStyle;
use sqldiff_core::HarnessOptions;
use sqldiff_core::ReportOptions;
use sqldiff_core::StatementBudget;
use sqldiff_sqlite::DEFAULT_BUSY_TIMEOUT_MS;
use sqldiff_sqlite::DEFAULT_CONNECT_BACKOFF_MS;
use sqldiff_sqlite::DEFAULT_CONNECT_RETRIES;
use sqldiff_sqlite::SqliteEndpointConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SQLDIFF_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of connection retries.
pub const MAX_CONNECT_RETRIES: u32 = 32;
/// Maximum busy timeout (ms).
pub const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;
/// Default statement budget.
pub const DEFAULT_QUERIES: i64 = 100;
/// Default progress event interval (statements).
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;
/// Default dump directory.
pub const DEFAULT_DUMP_DIR: &str = "dump";

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Endpoint descriptors and connection settings.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// Loop settings.
    #[serde(default)]
    pub run: RunConfig,
    /// Input files.
    #[serde(default)]
    pub input: InputConfig,
    /// Divergence report output.
    #[serde(default)]
    pub dump: DumpConfig,
    /// Event log output.
    #[serde(default)]
    pub log: LogConfig,
}

/// `[endpoints]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointsConfig {
    /// Descriptor of endpoint 1 (system under test).
    #[serde(default)]
    pub dsn1: Option<String>,
    /// Descriptor of endpoint 2 (reference).
    #[serde(default)]
    pub dsn2: Option<String>,
    /// Additional connect attempts after the first failure.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    /// Base delay between connect attempts (ms).
    #[serde(default = "default_connect_backoff_ms")]
    pub connect_backoff_ms: u64,
    /// Busy timeout applied to each connection (ms).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            dsn1: None,
            dsn2: None,
            connect_retries: default_connect_retries(),
            connect_backoff_ms: default_connect_backoff_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Statement budget; zero or negative means unbounded.
    #[serde(default = "default_queries")]
    pub queries: i64,
    /// Compare rows in order.
    #[serde(default)]
    pub order: bool,
    /// Skip data generation and introspect endpoint 1 instead.
    #[serde(default)]
    pub skip_generation: bool,
    /// Template expansion seed.
    #[serde(default)]
    pub seed: u64,
    /// Statements between progress events; zero disables them.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            order: false,
            skip_generation: false,
            seed: 0,
            progress_interval: default_progress_interval(),
        }
    }
}

/// `[input]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// DDL script populating both endpoints.
    #[serde(default)]
    pub ddl: Option<PathBuf>,
    /// Finite statement script.
    #[serde(default)]
    pub statements: Option<PathBuf>,
    /// Template file for an unbounded statement stream.
    #[serde(default)]
    pub templates: Option<PathBuf>,
}

/// `[dump]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpConfig {
    /// Output directory; must not exist when the run starts.
    #[serde(default = "default_dump_dir")]
    pub dir: PathBuf,
    /// Diff marker style.
    #[serde(default)]
    pub style: DiffStyle,
    /// Optional deadline for computing one diff (ms).
    #[serde(default)]
    pub diff_timeout_ms: Option<u64>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            dir: default_dump_dir(),
            style: DiffStyle::default(),
            diff_timeout_ms: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// JSON-lines run event log, appended to.
    #[serde(default)]
    pub event_log: Option<PathBuf>,
}

/// Values supplied on the command line; `None` and `false` leave the file
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Descriptor of endpoint 1.
    pub dsn1: Option<String>,
    /// Descriptor of endpoint 2.
    pub dsn2: Option<String>,
    /// Force ordered comparison.
    pub order: bool,
    /// Dump directory.
    pub dump: Option<PathBuf>,
    /// Statement budget.
    pub queries: Option<i64>,
    /// Force skip-generation mode.
    pub skip_generation: bool,
    /// DDL script.
    pub ddl: Option<PathBuf>,
    /// Statement script; replaces any configured template file.
    pub statements: Option<PathBuf>,
    /// Template file; replaces any configured statement script.
    pub templates: Option<PathBuf>,
    /// Template seed.
    pub seed: Option<u64>,
    /// Diff marker style.
    pub style: Option<DiffStyle>,
    /// Event log path.
    pub event_log: Option<PathBuf>,
    /// Connect retries.
    pub connect_retries: Option<u32>,
    /// Diff timeout (ms).
    pub diff_timeout_ms: Option<u64>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl HarnessConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_path(path, env::var_os(CONFIG_ENV_VAR))? {
            Some(resolved) => Self::load_file(&resolved),
            None => Ok(Self::default()),
        }
    }

    /// Loads and validates one config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides. A statement or template file given on
    /// the command line replaces whichever input the file configured.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(dsn1) = overrides.dsn1 {
            self.endpoints.dsn1 = Some(dsn1);
        }
        if let Some(dsn2) = overrides.dsn2 {
            self.endpoints.dsn2 = Some(dsn2);
        }
        if let Some(retries) = overrides.connect_retries {
            self.endpoints.connect_retries = retries;
        }
        self.run.order |= overrides.order;
        self.run.skip_generation |= overrides.skip_generation;
        if let Some(queries) = overrides.queries {
            self.run.queries = queries;
        }
        if let Some(seed) = overrides.seed {
            self.run.seed = seed;
        }
        if let Some(ddl) = overrides.ddl {
            self.input.ddl = Some(ddl);
        }
        match (overrides.statements, overrides.templates) {
            (Some(statements), None) => {
                self.input.statements = Some(statements);
                self.input.templates = None;
            }
            (None, Some(templates)) => {
                self.input.templates = Some(templates);
                self.input.statements = None;
            }
            (Some(statements), Some(templates)) => {
                self.input.statements = Some(statements);
                self.input.templates = Some(templates);
            }
            (None, None) => {}
        }
        if let Some(dir) = overrides.dump {
            self.dump.dir = dir;
        }
        if let Some(style) = overrides.style {
            self.dump.style = style;
        }
        if let Some(timeout) = overrides.diff_timeout_ms {
            self.dump.diff_timeout_ms = Some(timeout);
        }
        if let Some(event_log) = overrides.event_log {
            self.log.event_log = Some(event_log);
        }
    }

    // ========================================================================
    // SECTION: Validation
    // ========================================================================

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range or two
    /// settings conflict.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoints.validate()?;
        self.input.validate()?;
        self.dump.validate()?;
        if let Some(event_log) = &self.log.event_log {
            validate_path_value("log.event_log", event_log)?;
        }
        Ok(())
    }

    /// Validates that the configuration describes a runnable `exec`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a descriptor or required input
    /// is missing.
    pub fn validate_for_exec(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.endpoints.dsn1.is_none() {
            return Err(ConfigError::Invalid("endpoints.dsn1 is required".to_string()));
        }
        if self.endpoints.dsn2.is_none() {
            return Err(ConfigError::Invalid("endpoints.dsn2 is required".to_string()));
        }
        if self.input.statements.is_none() && self.input.templates.is_none() {
            return Err(ConfigError::Invalid(
                "one of input.statements or input.templates is required".to_string(),
            ));
        }
        if !self.run.skip_generation && self.input.ddl.is_none() {
            return Err(ConfigError::Invalid(
                "input.ddl is required unless run.skip_generation is set".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // SECTION: Conversions
    // ========================================================================

    /// Returns the harness loop options.
    #[must_use]
    pub fn harness_options(&self) -> HarnessOptions {
        HarnessOptions {
            budget: StatementBudget::from_configured(self.run.queries),
            compare_mode: CompareMode::from_order_flag(self.run.order),
            progress_interval: self.run.progress_interval,
        }
    }

    /// Returns the report rendering options.
    #[must_use]
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            style: self.dump.style,
            diff_timeout: self.dump.diff_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Returns connection settings for `dsn` using the shared endpoint
    /// settings.
    #[must_use]
    pub fn endpoint_config(&self, dsn: &str) -> SqliteEndpointConfig {
        SqliteEndpointConfig {
            dsn: dsn.to_string(),
            busy_timeout_ms: self.endpoints.busy_timeout_ms,
            connect_retries: self.endpoints.connect_retries,
            connect_backoff_ms: self.endpoints.connect_backoff_ms,
        }
    }
}

impl EndpointsConfig {
    /// Validates endpoint settings.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, dsn) in [("endpoints.dsn1", &self.dsn1), ("endpoints.dsn2", &self.dsn2)] {
            if let Some(dsn) = dsn {
                validate_path_string(field, dsn)?;
            }
        }
        if self.connect_retries > MAX_CONNECT_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "endpoints.connect_retries must be at most {MAX_CONNECT_RETRIES}"
            )));
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "endpoints.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

impl InputConfig {
    /// Validates input paths and their combination.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.statements.is_some() && self.templates.is_some() {
            return Err(ConfigError::Invalid(
                "input.statements and input.templates are mutually exclusive".to_string(),
            ));
        }
        for (field, value) in [
            ("input.ddl", &self.ddl),
            ("input.statements", &self.statements),
            ("input.templates", &self.templates),
        ] {
            if let Some(path) = value {
                validate_path_value(field, path)?;
            }
        }
        Ok(())
    }
}

impl DumpConfig {
    /// Validates dump settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_value("dump.dir", &self.dir)?;
        if self.diff_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "dump.diff_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default connect retries.
const fn default_connect_retries() -> u32 {
    DEFAULT_CONNECT_RETRIES
}

/// Default connect backoff (ms).
const fn default_connect_backoff_ms() -> u64 {
    DEFAULT_CONNECT_BACKOFF_MS
}

/// Default busy timeout (ms).
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default statement budget.
const fn default_queries() -> i64 {
    DEFAULT_QUERIES
}

/// Default progress interval.
const fn default_progress_interval() -> u64 {
    DEFAULT_PROGRESS_INTERVAL
}

/// Default dump directory.
fn default_dump_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DUMP_DIR)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the CLI value or the environment value.
fn resolve_path(
    path: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    match env_value {
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => {
            if value.len() > MAX_TOTAL_PATH_LENGTH {
                return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
            }
            Ok(Some(PathBuf::from(value)))
        }
        None => Ok(None),
    }
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path value.
fn validate_path_value(field: &str, value: &Path) -> Result<(), ConfigError> {
    validate_path_string(field, &value.to_string_lossy())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
