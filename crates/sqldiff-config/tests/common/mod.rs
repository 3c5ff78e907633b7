// sqldiff-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config loading and validation tests.
// Purpose: Reduce duplication across integration tests for sqldiff-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use sqldiff_config::ConfigError;
use sqldiff_config::HarnessConfig;
use tempfile::TempDir;

/// Parses a TOML string into a `HarnessConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<HarnessConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config that passes exec validation in generation mode.
pub fn runnable_config() -> Result<HarnessConfig, toml::de::Error> {
    config_from_toml(
        r#"
        [endpoints]
        dsn1 = "under_test.db"
        dsn2 = "reference.db"

        [input]
        ddl = "ddl.sql"
        statements = "statements.sql"
        "#,
    )
}

/// Writes `contents` to a config file inside `dir`.
pub fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf, String> {
    let path = dir.path().join("sqldiff.toml");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
