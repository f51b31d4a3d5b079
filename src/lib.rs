//! Portable SQL execution core.
//!
//! - [`clause`]: composable AND/OR condition trees rendered to SQL fragments
//! - [`dialect`]: per-product SQL variance and duplicate-key detection
//! - [`procedure`]: stored-procedure parameter metadata and call strings
//! - [`command`]: auto CRUD, batch, procedure and condition-select commands
//! - [`script`]: delimiter-split script execution with error policies
//!
//! Everything executes through the traits in [`connectivity`]; the `sqlite`
//! feature (on by default) provides a rusqlite-backed implementation.

pub mod clause;
pub mod command;
pub mod connectivity;
pub mod dialect;
pub mod error;
pub mod prelude;
pub mod procedure;
pub mod results;
pub mod script;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod types;
pub mod value_type;

pub use error::{PortableSqlError, VendorError};
pub use types::{DeclaredType, RowValues};
