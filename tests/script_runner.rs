#![cfg(feature = "sqlite")]

use std::path::{Path, PathBuf};

use portable_sql::prelude::*;
use tempfile::{TempDir, tempdir};

const FIVE_STATEMENTS: &str = "
create table t (id integer primary key);
insert into t values (1);
insert into missing values (2);
insert into t values (3);
insert into t values (4);
";

fn init_tracing() {
    // surfaces the runner's warn! lines under `cargo test -- --nocapture`
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn db_url(dir: &TempDir) -> String {
    format!("sqlite:{}", dir.path().join("script.db").display())
}

fn runner(
    url: &str,
    configure: impl FnOnce(ScriptRunnerOptionsBuilder) -> ScriptRunnerOptionsBuilder,
) -> Result<ScriptRunner<SqliteConnectionProvider>, PortableSqlError> {
    ScriptRunner::sqlite(configure(ScriptRunnerOptionsBuilder::new(url)).finish())
}

fn row_ids(url: &str) -> Result<Vec<i64>, PortableSqlError> {
    let provider = SqliteConnectionProvider::new(
        SqliteOptions::from_settings(&ConnectionSettings::new(url)),
    );
    let mut conn = provider.acquire()?;
    let select = ConditionSelectCommand::new(
        DatabaseType::Sqlite,
        "t",
        &["id"],
        &AndScopeQueryClauseGroup::new(),
    );
    let rs = select.execute(&mut conn, ())?;
    Ok(rs
        .results
        .iter()
        .filter_map(|row| row.get("id").and_then(RowValues::as_int).copied())
        .collect())
}

fn table_exists(url: &str, table: &str) -> Result<bool, PortableSqlError> {
    let provider = SqliteConnectionProvider::new(
        SqliteOptions::from_settings(&ConnectionSettings::new(url)),
    );
    let mut conn = provider.acquire()?;
    let condition = ComparisonClause::equal("name", RowValues::Text(table.to_string()));
    let select = ConditionSelectCommand::new(
        DatabaseType::Sqlite,
        "sqlite_master",
        &["name"],
        &condition,
    );
    Ok(!select.execute(&mut conn, ())?.is_empty())
}

fn write_script(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write script");
    path
}

#[test]
fn continue_mode_records_failure_and_runs_the_rest() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempdir()?;
    let url = db_url(&dir);
    let mut runner = runner(&url, |b| b.error_continue(true))?;

    let result = runner.run_text("five.sql", FIVE_STATEMENTS)?;
    assert_eq!(result.source_name, "five.sql");
    assert_eq!(result.total_sql_count, 5);
    assert_eq!(result.good_sql_count, 4);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 3);
    assert_eq!(result.failures[0].sql, "insert into missing values (2)");
    assert!(matches!(result.failures[0].error, PortableSqlError::SqlFailure { .. }));
    assert_eq!(runner.state(), RunnerState::Completed);

    assert_eq!(row_ids(&url)?, vec![1, 3, 4]);
    Ok(())
}

#[test]
fn stop_mode_aborts_and_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let mut runner = runner(&url, |b| b)?;

    let err = runner.run_text("five.sql", FIVE_STATEMENTS).unwrap_err();
    assert_eq!(err.sql(), Some("insert into missing values (2)"));
    assert_eq!(runner.state(), RunnerState::Aborted);
    // the create table from statement 1 went with the rollback
    assert!(!table_exists(&url, "t")?);
    Ok(())
}

#[test]
fn stop_mode_with_auto_commit_keeps_earlier_statements() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let mut runner = runner(&url, |b| b.auto_commit(true))?;

    assert!(runner.run_text("five.sql", FIVE_STATEMENTS).is_err());
    // statements 4 and 5 never ran
    assert_eq!(row_ids(&url)?, vec![1]);
    Ok(())
}

#[test]
fn rollback_only_discards_a_clean_run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let mut runner = runner(&url, |b| b.rollback_only(true))?;

    let result = runner.run_text(
        "dry-run",
        "create table t (id integer); insert into t values (1);",
    )?;
    assert_eq!(result.good_sql_count, 2);
    assert!(result.is_success());
    assert!(!table_exists(&url, "t")?);
    Ok(())
}

#[test]
fn comment_only_pieces_are_not_counted() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let mut runner = runner(&url, |b| b)?;

    let script =
        "-- schema\ncreate table t (id integer);\n-- seed\ninsert into t values (7);\n-- end of file\n";
    let result = runner.run_text("commented.sql", script)?;
    assert_eq!(result.total_sql_count, 2);
    assert_eq!(row_ids(&url)?, vec![7]);
    Ok(())
}

#[test]
fn run_file_decodes_utf16_with_bom() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let script = "\u{FEFF}create table t (id integer);\ninsert into t values (11);\n";
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let path = write_script(dir.path(), "utf16.sql", &bytes);

    let mut runner = runner(&url, |b| b.encoding(ScriptEncoding::Utf16Le))?;
    let result = runner.run_file(&path)?;
    assert_eq!(result.good_sql_count, 2);
    assert_eq!(row_ids(&url)?, vec![11]);
    Ok(())
}

#[test]
fn unreadable_file_is_a_script_source_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut runner = runner(&db_url(&dir), |b| b)?;
    let err = runner.run_file(dir.path().join("absent.sql")).unwrap_err();
    assert!(matches!(err, PortableSqlError::ScriptSource { .. }));
    Ok(())
}

#[test]
fn fire_man_aggregates_files_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let schema = write_script(
        dir.path(),
        "01_schema.sql",
        b"create table t (id integer primary key);",
    );
    let data = write_script(
        dir.path(),
        "02_data.sql",
        b"insert into t values (1);\ninsert into t values (1);\ninsert into t values (2);",
    );

    let mut fire_man = ScriptFireMan::new(runner(&url, |b| b.error_continue(true))?);
    let fired = fire_man.fire(&[schema, data])?;
    assert_eq!(fired.runs.len(), 2);
    assert_eq!(fired.total_sql_count(), 4);
    assert_eq!(fired.good_sql_count(), 3);
    assert_eq!(fired.failed_sql_count(), 1);
    assert!(fired.runs[1].failures[0].error.is_unique_violation());
    assert_eq!(row_ids(&url)?, vec![1, 2]);
    Ok(())
}

#[test]
fn fire_man_stops_at_an_aborting_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let url = db_url(&dir);
    let broken = write_script(dir.path(), "01_broken.sql", b"create tabel t (id integer);");
    let never = write_script(dir.path(), "02_never.sql", b"create table t (id integer);");

    let mut fire_man = ScriptFireMan::new(runner(&url, |b| b)?);
    assert!(fire_man.fire(&[broken, never]).is_err());
    assert!(!table_exists(&url, "t")?);
    Ok(())
}
