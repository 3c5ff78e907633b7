// sqldiff-sqlite/src/endpoint.rs
// ============================================================================
// Module: SQLite Endpoint
// Description: Connection handling, statement execution, and introspection.
// Purpose: Implement the core endpoint interface over rusqlite.
// Dependencies: rusqlite, sqldiff-core, thiserror
// ============================================================================

//! ## Overview
//! A DSN is either `:memory:`, a filesystem path, or a `file:` URI. Opening
//! is retried with capped exponential backoff, and every connection is
//! checked with `SELECT 1` before use. The busy timeout bounds how long a
//! statement waits on a locked database; a timeout surfaces as an ordinary
//! per-statement error outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use sqldiff_core::Endpoint;
use sqldiff_core::EndpointError;
use sqldiff_core::KeySet;
use sqldiff_core::Outcome;
use thiserror::Error;

use crate::value::COLUMN_SEPARATOR;
use crate::value::render_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default number of additional connection attempts.
pub const DEFAULT_CONNECT_RETRIES: u32 = 3;
/// Default base delay between connection attempts (ms).
pub const DEFAULT_CONNECT_BACKOFF_MS: u64 = 200;
/// Upper bound on a single backoff delay (ms).
const MAX_CONNECT_BACKOFF_MS: u64 = 10_000;
/// DSN selecting a private in-memory database.
const MEMORY_DSN: &str = ":memory:";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Connection settings for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteEndpointConfig {
    /// Connection descriptor; also the endpoint label.
    pub dsn: String,
    /// Busy timeout applied to the connection (ms).
    pub busy_timeout_ms: u64,
    /// Additional attempts after the first failed connect.
    pub connect_retries: u32,
    /// Base delay between connect attempts (ms).
    pub connect_backoff_ms: u64,
}

impl SqliteEndpointConfig {
    /// Creates a config with default timeouts for `dsn`.
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            connect_retries: DEFAULT_CONNECT_RETRIES,
            connect_backoff_ms: DEFAULT_CONNECT_BACKOFF_MS,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` endpoint errors.
#[derive(Debug, Error)]
pub enum SqliteEndpointError {
    /// Connection could not be established.
    #[error("connect to {dsn} failed: {message}")]
    Connect {
        /// DSN that failed.
        dsn: String,
        /// Last driver error.
        message: String,
    },
    /// Schema introspection failed.
    #[error("schema introspection failed: {0}")]
    Schema(String),
}

impl From<SqliteEndpointError> for EndpointError {
    fn from(err: SqliteEndpointError) -> Self {
        match err {
            SqliteEndpointError::Connect {
                ..
            } => Self::Connect(err.to_string()),
            SqliteEndpointError::Schema(message) => Self::Schema(message),
        }
    }
}

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Endpoint backed by one `SQLite` connection.
#[derive(Debug)]
pub struct SqliteEndpoint {
    /// Display label (the DSN).
    label: String,
    /// Open connection.
    connection: Connection,
}

impl SqliteEndpoint {
    /// Opens and checks a connection once.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteEndpointError::Connect`] when opening, configuring, or
    /// pinging the database fails.
    pub fn connect(config: &SqliteEndpointConfig) -> Result<Self, SqliteEndpointError> {
        let connection = open_connection(config).map_err(|err| SqliteEndpointError::Connect {
            dsn: config.dsn.clone(),
            message: err.to_string(),
        })?;
        Ok(Self {
            label: config.dsn.clone(),
            connection,
        })
    }

    /// Opens a connection, retrying with capped exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns the last [`SqliteEndpointError::Connect`] once all attempts
    /// are used up.
    pub fn connect_with_retry(config: &SqliteEndpointConfig) -> Result<Self, SqliteEndpointError> {
        let mut attempt = 0;
        loop {
            match Self::connect(config) {
                Ok(endpoint) => return Ok(endpoint),
                Err(err) if attempt >= config.connect_retries => return Err(err),
                Err(_) => {
                    thread::sleep(backoff_duration(config.connect_backoff_ms, attempt));
                    attempt += 1;
                }
            }
        }
    }

    /// Wraps an already open connection.
    #[must_use]
    pub fn from_connection(label: impl Into<String>, connection: Connection) -> Self {
        Self {
            label: label.into(),
            connection,
        }
    }

    /// Runs one statement and renders every returned row.
    fn query_rows(&self, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut statement = self.connection.prepare(sql)?;
        let columns = statement.column_count();
        let mut rows = statement.query([])?;
        let mut rendered = Vec::new();
        while let Some(row) = rows.next()? {
            let mut line = String::new();
            for index in 0..columns {
                if index > 0 {
                    line.push(COLUMN_SEPARATOR);
                }
                line.push_str(&render_value(row.get_ref(index)?));
            }
            rendered.push(line);
        }
        Ok(rendered)
    }

    /// Lists user tables and their columns in declaration order.
    fn read_schema(&self) -> rusqlite::Result<KeySet> {
        let mut tables = self.connection.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = tables
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut columns =
            self.connection.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let mut keys = KeySet::new();
        for table in names {
            let table_columns = columns
                .query_map([&table], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            keys.insert_table(table, table_columns);
        }
        Ok(keys)
    }
}

impl Endpoint for SqliteEndpoint {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, sql: &str) -> Outcome {
        match self.query_rows(sql) {
            Ok(rows) => Outcome::rows(rows),
            Err(err) => Outcome::error(err.to_string()),
        }
    }

    fn describe_schema(&mut self) -> Result<KeySet, EndpointError> {
        self.read_schema()
            .map_err(|err| SqliteEndpointError::Schema(err.to_string()))
            .map_err(EndpointError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the delay before retry `attempt` (zero-based): `base * 2^attempt`,
/// capped.
#[must_use]
pub fn backoff_duration(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1_u64 << attempt.min(31);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_CONNECT_BACKOFF_MS))
}

/// Opens, configures, and pings a connection.
fn open_connection(config: &SqliteEndpointConfig) -> rusqlite::Result<Connection> {
    let connection = if config.dsn == MEMORY_DSN {
        Connection::open_in_memory()?
    } else {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&config.dsn, flags)?
    };
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(connection)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_duration(100, 0), Duration::from_millis(100));
        assert_eq!(backoff_duration(100, 1), Duration::from_millis(200));
        assert_eq!(backoff_duration(100, 3), Duration::from_millis(800));
        assert_eq!(backoff_duration(100, 40), Duration::from_millis(MAX_CONNECT_BACKOFF_MS));
        assert_eq!(backoff_duration(u64::MAX, 2), Duration::from_millis(MAX_CONNECT_BACKOFF_MS));
    }

    #[test]
    fn connect_errors_convert_to_endpoint_connect() {
        let err = SqliteEndpointError::Connect {
            dsn: "db.sqlite".to_string(),
            message: "unable to open".to_string(),
        };
        let converted = EndpointError::from(err);
        assert!(matches!(converted, EndpointError::Connect(message) if message.contains("db.sqlite")));
    }
}
