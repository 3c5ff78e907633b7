// sqldiff-core/tests/differential_loop.rs
// ============================================================================
// Module: Differential Loop Tests
// Description: End-to-end behavior of the harness with scripted endpoints.
// Purpose: Pin down verdicts, budgets, dump layout, and fatal paths.
// Dependencies: sqldiff-core, tempfile
// ============================================================================

//! ## Overview
//! Drives [`Harness`] with in-memory endpoints and sources and a real
//! [`DumpSink`] over a temporary directory.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use sqldiff_core::CompareMode;
use sqldiff_core::DataGenerator;
use sqldiff_core::DivergenceRecord;
use sqldiff_core::DivergenceSink;
use sqldiff_core::DumpDirectory;
use sqldiff_core::DumpSink;
use sqldiff_core::Endpoint;
use sqldiff_core::EndpointError;
use sqldiff_core::GenerateError;
use sqldiff_core::GenerationMode;
use sqldiff_core::Harness;
use sqldiff_core::HarnessError;
use sqldiff_core::HarnessOptions;
use sqldiff_core::KeySet;
use sqldiff_core::NoopEventSink;
use sqldiff_core::Observation;
use sqldiff_core::Outcome;
use sqldiff_core::Preparation;
use sqldiff_core::ReportOptions;
use sqldiff_core::RunPhase;
use sqldiff_core::SinkError;
use sqldiff_core::SourceError;
use sqldiff_core::StatementBudget;
use sqldiff_core::StatementSource;
use sqldiff_core::StatementSourceFactory;
use sqldiff_core::StopReason;
use sqldiff_core::runtime::diff::ANSI_GREEN;
use sqldiff_core::runtime::diff::ANSI_RED;
use sqldiff_core::runtime::diff::ANSI_RESET;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Shared log of `(endpoint label, statement)` executions.
type ExecutionLog = Rc<RefCell<Vec<(String, String)>>>;

/// Endpoint answering from a fixed table of responses.
struct ScriptedEndpoint {
    label: String,
    responses: HashMap<String, Outcome>,
    fallback: Outcome,
    schema: KeySet,
    log: ExecutionLog,
}

impl ScriptedEndpoint {
    fn new(label: &str, log: &ExecutionLog) -> Self {
        Self {
            label: label.to_string(),
            responses: HashMap::new(),
            fallback: Outcome::rows(["1"]),
            schema: KeySet::new(),
            log: Rc::clone(log),
        }
    }

    fn respond(mut self, sql: &str, outcome: Outcome) -> Self {
        self.responses.insert(sql.to_string(), outcome);
        self
    }

    fn with_schema(mut self, schema: KeySet) -> Self {
        self.schema = schema;
        self
    }
}

impl Endpoint for ScriptedEndpoint {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, sql: &str) -> Outcome {
        self.log.borrow_mut().push((self.label.clone(), sql.to_string()));
        self.responses.get(sql).cloned().unwrap_or_else(|| self.fallback.clone())
    }

    fn describe_schema(&mut self) -> Result<KeySet, EndpointError> {
        Ok(self.schema.clone())
    }
}

/// Finite list of statements.
struct ListSource(std::vec::IntoIter<String>);

impl StatementSource for ListSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        Ok(self.0.next())
    }
}

/// Never-exhausting source counting how often it was pulled.
struct EndlessSource {
    pulls: Rc<RefCell<u64>>,
}

impl StatementSource for EndlessSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        *self.pulls.borrow_mut() += 1;
        Ok(Some("SELECT 1".to_string()))
    }
}

/// Source that fails after yielding a fixed number of statements.
struct FailingSource {
    remaining: u32,
}

impl StatementSource for FailingSource {
    fn next_statement(&mut self) -> Result<Option<String>, SourceError> {
        if self.remaining == 0 {
            return Err(SourceError::Invalid("grammar exploded".to_string()));
        }
        self.remaining -= 1;
        Ok(Some("SELECT 1".to_string()))
    }
}

/// Factory handing out one prebuilt source and remembering the keys it saw.
struct OnceFactory<T> {
    source: Option<T>,
    seen_keys: Option<KeySet>,
}

impl<T> OnceFactory<T> {
    const fn new(source: T) -> Self {
        Self {
            source: Some(source),
            seen_keys: None,
        }
    }
}

impl<T: StatementSource> StatementSourceFactory for OnceFactory<T> {
    type Source = T;

    fn open(&mut self, keys: &KeySet) -> Result<T, SourceError> {
        self.seen_keys = Some(keys.clone());
        self.source.take().ok_or_else(|| SourceError::Invalid("opened twice".to_string()))
    }
}

/// Generator returning a fixed preparation.
struct StaticGenerator(Preparation);

impl DataGenerator for StaticGenerator {
    fn generate(&mut self) -> Result<Preparation, GenerateError> {
        Ok(self.0.clone())
    }
}

/// Generator that always fails.
struct BrokenGenerator;

impl DataGenerator for BrokenGenerator {
    fn generate(&mut self) -> Result<Preparation, GenerateError> {
        Err(GenerateError::Invalid("bad grammar".to_string()))
    }
}

/// Sink whose writes always fail.
struct RejectingSink;

impl DivergenceSink for RejectingSink {
    fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn record(
        &mut self,
        _sql: &str,
        _first: Observation<'_>,
        _second: Observation<'_>,
    ) -> Result<DivergenceRecord, SinkError> {
        Err(SinkError::Io {
            path: PathBuf::from("nowhere/0.log"),
            message: "disk full".to_string(),
        })
    }
}

fn list(statements: &[&str]) -> ListSource {
    ListSource(statements.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter())
}

fn options(budget: i64, compare_mode: CompareMode) -> HarnessOptions {
    HarnessOptions {
        budget: StatementBudget::from_configured(budget),
        compare_mode,
        progress_interval: 0,
    }
}

fn dump_sink(root: &TempDir) -> DumpSink {
    let directory = DumpDirectory::reserve(root.path().join("dump")).unwrap();
    DumpSink::new(directory, ReportOptions::default())
}

fn sample_keys() -> KeySet {
    let mut keys = KeySet::new();
    keys.insert_table("t", vec!["id".to_string(), "v".to_string()]);
    keys
}

fn generate_mode(generator: &mut StaticGenerator) -> GenerationMode<'_> {
    GenerationMode::Generate(generator)
}

fn empty_generator() -> StaticGenerator {
    StaticGenerator(Preparation {
        statements: Vec::new(),
        keys: sample_keys(),
    })
}

fn dump_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn strip_ansi(text: &str) -> String {
    text.replace(ANSI_RED, "").replace(ANSI_GREEN, "").replace(ANSI_RESET, "")
}

// ============================================================================
// SECTION: Verdict Scenarios
// ============================================================================

#[test]
fn reordered_rows_are_consistent_when_unordered() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let sql = "SELECT v FROM t";
    let first = ScriptedEndpoint::new("db1", &log).respond(sql, Outcome::rows(["a", "b"]));
    let second = ScriptedEndpoint::new("db2", &log).respond(sql, Outcome::rows(["b", "a"]));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&[sql]));

    let summary = harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    assert_eq!(summary.statements, 1);
    assert_eq!(summary.divergences, 0);
    assert_eq!(summary.stop_reason, StopReason::SourceExhausted);
    assert!(dump_files(&root.path().join("dump")).is_empty());
}

#[test]
fn reordered_rows_diverge_when_ordered() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let sql = "SELECT v FROM t";
    let first = ScriptedEndpoint::new("db1", &log).respond(sql, Outcome::rows(["a", "b"]));
    let second = ScriptedEndpoint::new("db2", &log).respond(sql, Outcome::rows(["b", "a"]));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Ordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&[sql]));

    let summary = harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    assert_eq!(summary.divergences, 1);
    let dump = root.path().join("dump");
    assert_eq!(dump_files(&dump), vec!["0.log".to_string()]);
    let report = fs::read_to_string(dump.join("0.log")).unwrap();
    assert!(report.contains(ANSI_RED));
    assert!(report.contains(ANSI_GREEN));
    let plain = strip_ansi(&report);
    assert!(plain.contains("[[db1]]\n\na\nb\n\n"));
    assert!(plain.contains("[[db2]]\n\nb\na\n\n"));
}

#[test]
fn one_sided_error_is_reported_under_its_endpoint() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let sql = "SELEC 1";
    let first = ScriptedEndpoint::new("db1", &log).respond(sql, Outcome::error("syntax error"));
    let second = ScriptedEndpoint::new("db2", &log).respond(sql, Outcome::rows(["1"]));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&[sql]));

    harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    let report = fs::read_to_string(root.path().join("dump").join("0.log")).unwrap();
    assert!(report.starts_with("[sql]\n\nSELEC 1\n\n[err]\n\n"));
    assert!(report.contains("[err]\n\n[[db1]]\n\nsyntax error\n\n[[db2]]\n\n[compare]\n\n"));
}

#[test]
fn identical_errors_are_consistent() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let sql = "SELECT * FROM missing";
    let first = ScriptedEndpoint::new("db1", &log).respond(sql, Outcome::error("no such table"));
    let second = ScriptedEndpoint::new("db2", &log).respond(sql, Outcome::error("no such table"));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Ordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&[sql]));

    let summary = harness.run(generate_mode(&mut generator), &mut factory).unwrap();
    assert_eq!(summary.divergences, 0);
}

// ============================================================================
// SECTION: Budget and Ordering
// ============================================================================

#[test]
fn budget_caps_an_endless_source() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let pulls = Rc::new(RefCell::new(0));
    let first = ScriptedEndpoint::new("db1", &log);
    let second = ScriptedEndpoint::new("db2", &log);
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(5, CompareMode::Unordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(EndlessSource {
        pulls: Rc::clone(&pulls),
    });

    let summary = harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    assert_eq!(summary.statements, 5);
    assert_eq!(summary.stop_reason, StopReason::BudgetReached);
    assert_eq!(*pulls.borrow(), 5);
    assert_eq!(log.borrow().len(), 10);
    assert_eq!(harness.phase(), RunPhase::Completed);
}

#[test]
fn endpoints_run_sequentially_in_order() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let first = ScriptedEndpoint::new("db1", &log);
    let second = ScriptedEndpoint::new("db2", &log);
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&["s1", "s2"]));

    harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    let expected = vec![
        ("db1".to_string(), "s1".to_string()),
        ("db2".to_string(), "s1".to_string()),
        ("db1".to_string(), "s2".to_string()),
        ("db2".to_string(), "s2".to_string()),
    ];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn divergence_files_are_dense_and_match_divergence_count() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let first = ScriptedEndpoint::new("db1", &log)
        .respond("q1", Outcome::rows(["1"]))
        .respond("q3", Outcome::rows(["3"]))
        .respond("q6", Outcome::error("boom"));
    let second = ScriptedEndpoint::new("db2", &log)
        .respond("q1", Outcome::rows(["2"]))
        .respond("q3", Outcome::rows(["4"]))
        .respond("q6", Outcome::rows(["1"]));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(-1, CompareMode::Ordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&["q1", "q2", "q3", "q4", "q5", "q6"]));

    let summary = harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    let dump = root.path().join("dump");
    let files = dump_files(&dump);
    assert_eq!(summary.statements, 6);
    assert_eq!(summary.divergences, 3);
    assert_eq!(files, vec!["0.log", "1.log", "2.log"]);
    assert_eq!(u64::try_from(files.len()).unwrap(), summary.divergences);
    for (index, sql) in ["q1", "q3", "q6"].iter().enumerate() {
        let report = fs::read_to_string(dump.join(format!("{index}.log"))).unwrap();
        assert!(report.starts_with(&format!("[sql]\n\n{sql}\n\n")));
    }
    assert_eq!(harness.sink().written(), 3);
    let (_, _, sink) = harness.into_parts();
    assert_eq!(sink.written(), summary.divergences);
    assert_eq!(sink.path(), dump.as_path());
}

// ============================================================================
// SECTION: Preparation and Modes
// ============================================================================

#[test]
fn generation_applies_ddl_to_both_endpoints_before_the_loop() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let first = ScriptedEndpoint::new("db1", &log);
    let second = ScriptedEndpoint::new("db2", &log);
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut generator = StaticGenerator(Preparation {
        statements: vec!["CREATE TABLE t (id INT)".to_string()],
        keys: sample_keys(),
    });
    let mut factory = OnceFactory::new(list(&["SELECT id FROM t"]));

    harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    let executed: Vec<String> = log.borrow().iter().map(|(_, sql)| sql.clone()).collect();
    assert_eq!(
        executed,
        vec!["CREATE TABLE t (id INT)", "CREATE TABLE t (id INT)", "SELECT id FROM t", "SELECT id FROM t"]
    );
    assert_eq!(factory.seen_keys, Some(sample_keys()));
}

#[test]
fn preparation_failure_names_endpoint_and_statement() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let ddl = "CREATE TABLE t (id INT)";
    let first = ScriptedEndpoint::new("db1", &log);
    let second = ScriptedEndpoint::new("db2", &log).respond(ddl, Outcome::error("table exists"));
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut generator = StaticGenerator(Preparation {
        statements: vec![ddl.to_string(), "INSERT INTO t VALUES (1)".to_string()],
        keys: sample_keys(),
    });
    let mut factory = OnceFactory::new(list(&["SELECT 1"]));

    let err = harness.run(generate_mode(&mut generator), &mut factory).unwrap_err();

    match err {
        HarnessError::Preparation {
            endpoint,
            statement,
            cause,
        } => {
            assert_eq!(endpoint, "db2");
            assert_eq!(statement, ddl);
            assert_eq!(cause, "table exists");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(harness.phase(), RunPhase::FatalAborted);
    assert!(!root.path().join("dump").exists());
}

#[test]
fn generator_failure_is_fatal_before_dump_creation() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let events = NoopEventSink;
    let mut harness = Harness::new(
        ScriptedEndpoint::new("db1", &log),
        ScriptedEndpoint::new("db2", &log),
        dump_sink(&root),
        options(0, CompareMode::Unordered),
        &events,
    );
    let mut generator = BrokenGenerator;
    let mut factory = OnceFactory::new(list(&["SELECT 1"]));

    let err = harness.run(GenerationMode::Generate(&mut generator), &mut factory).unwrap_err();

    assert!(matches!(err, HarnessError::Generation(_)));
    assert!(log.borrow().is_empty());
    assert!(!root.path().join("dump").exists());
}

#[test]
fn skip_generation_uses_live_schema_of_first_endpoint() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let first = ScriptedEndpoint::new("db1", &log).with_schema(sample_keys());
    let second = ScriptedEndpoint::new("db2", &log);
    let events = NoopEventSink;
    let mut harness =
        Harness::new(first, second, dump_sink(&root), options(0, CompareMode::Unordered), &events);
    let mut factory = OnceFactory::new(list(&[]));

    let summary = harness.run(GenerationMode::SkipGeneration, &mut factory).unwrap();

    assert_eq!(summary.statements, 0);
    assert_eq!(factory.seen_keys, Some(sample_keys()));
    assert!(log.borrow().is_empty());
    assert!(root.path().join("dump").is_dir());
}

#[test]
fn skip_generation_requires_a_populated_first_endpoint() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let events = NoopEventSink;
    let mut harness = Harness::new(
        ScriptedEndpoint::new("db1", &log),
        ScriptedEndpoint::new("db2", &log).with_schema(sample_keys()),
        dump_sink(&root),
        options(0, CompareMode::Unordered),
        &events,
    );
    let mut factory = OnceFactory::new(list(&["SELECT 1"]));

    let err = harness.run(GenerationMode::SkipGeneration, &mut factory).unwrap_err();

    match err {
        HarnessError::Introspection {
            endpoint, ..
        } => assert_eq!(endpoint, "db1"),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// SECTION: Fatal Paths
// ============================================================================

#[test]
fn pre_existing_dump_directory_is_rejected_without_writes() {
    let root = TempDir::new().unwrap();
    let dump = root.path().join("dump");
    fs::create_dir(&dump).unwrap();
    fs::write(dump.join("keep.txt"), "old run").unwrap();

    let err = DumpDirectory::reserve(&dump).unwrap_err();

    assert!(matches!(err, SinkError::AlreadyExists { .. }));
    assert_eq!(dump_files(&dump), vec!["keep.txt".to_string()]);
}

#[test]
fn source_error_aborts_the_run() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let events = NoopEventSink;
    let mut harness = Harness::new(
        ScriptedEndpoint::new("db1", &log),
        ScriptedEndpoint::new("db2", &log),
        dump_sink(&root),
        options(0, CompareMode::Unordered),
        &events,
    );
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(FailingSource {
        remaining: 2,
    });

    let err = harness.run(generate_mode(&mut generator), &mut factory).unwrap_err();

    assert!(matches!(err, HarnessError::Source(_)));
    assert_eq!(log.borrow().len(), 4);
    assert_eq!(harness.phase(), RunPhase::FatalAborted);
}

#[test]
fn persistence_failure_aborts_the_run() {
    let log = ExecutionLog::default();
    let events = NoopEventSink;
    let first = ScriptedEndpoint::new("db1", &log).respond("q", Outcome::rows(["1"]));
    let second = ScriptedEndpoint::new("db2", &log).respond("q", Outcome::rows(["2"]));
    let mut harness =
        Harness::new(first, second, RejectingSink, options(0, CompareMode::Unordered), &events);
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&["q", "q2"]));

    let err = harness.run(generate_mode(&mut generator), &mut factory).unwrap_err();

    assert!(matches!(err, HarnessError::Persistence(SinkError::Io { .. })));
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn harness_runs_only_once() {
    let root = TempDir::new().unwrap();
    let log = ExecutionLog::default();
    let events = NoopEventSink;
    let mut harness = Harness::new(
        ScriptedEndpoint::new("db1", &log),
        ScriptedEndpoint::new("db2", &log),
        dump_sink(&root),
        options(0, CompareMode::Unordered),
        &events,
    );
    let mut generator = empty_generator();
    let mut factory = OnceFactory::new(list(&[]));
    harness.run(generate_mode(&mut generator), &mut factory).unwrap();

    let err = harness.run(generate_mode(&mut generator), &mut factory).unwrap_err();
    assert!(matches!(err, HarnessError::AlreadyStarted));
}
