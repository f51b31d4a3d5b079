//! SQL script execution.
//!
//! A script is split on a delimiter and run statement by statement over a
//! single connection. With `error_continue` failures are recorded and the run
//! goes on; otherwise the first failure rolls the run back and is returned.
//!
//! ```rust,no_run
//! use portable_sql::prelude::*;
//!
//! let options = ScriptRunnerOptionsBuilder::new("sqlite:app.db")
//!     .error_continue(true)
//!     .finish();
//! let mut runner = ScriptRunner::sqlite(options)?;
//! let result = runner.run_file("schema.sql")?;
//! println!("{}/{} statements ok", result.good_sql_count, result.total_sql_count);
//! # Ok::<(), PortableSqlError>(())
//! ```

mod encoding;
mod options;
mod runner;
mod splitter;

pub use encoding::ScriptEncoding;
pub use options::{ConnectionSettings, ScriptRunnerOptions, ScriptRunnerOptionsBuilder};
pub use runner::{
    RunnerState, ScriptFailure, ScriptFireMan, ScriptFireResult, ScriptRunResult, ScriptRunner,
};
pub use splitter::split_statements;
