//! Composable condition fragments.
//!
//! Every node renders to a SQL fragment with `?` placeholders plus the values
//! bound to those placeholders, in placeholder order. Groups nest, so an AND of
//! ORs (or the other way round) is built by putting one group inside another:
//!
//! ```rust
//! use portable_sql::prelude::*;
//!
//! let mut or_scope = OrScopeQueryClauseGroup::new();
//! or_scope.add_clause(ComparisonClause::equal("status", RowValues::Text("NEW".into())));
//! or_scope.add_clause(ComparisonClause::is_null("status"));
//!
//! let mut where_clause = AndScopeQueryClauseGroup::new();
//! where_clause.add_clause(ComparisonClause::greater_than("amount", RowValues::Int(10)));
//! where_clause.add_clause(or_scope);
//!
//! let rendered = where_clause.render();
//! assert_eq!(rendered.fragment, "(amount > ? and (status = ? or status is null))");
//! assert_eq!(rendered.values.len(), 2);
//! ```

mod comparison;
mod group;

pub use comparison::{ComparisonClause, ComparisonOperator, RawClause};
pub use group::{AndScopeQueryClauseGroup, OrScopeQueryClauseGroup, ScopeConnector};

use std::fmt::Debug;

use crate::types::RowValues;

/// Fragment that is true for every row; what an empty group renders to.
pub const ALWAYS_TRUE: &str = "1 = 1";
/// Fragment that is false for every row.
pub const ALWAYS_FALSE: &str = "1 = 0";

/// Output of [`QueryClause::render`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedClause {
    pub fragment: String,
    pub values: Vec<RowValues>,
}

impl RenderedClause {
    #[must_use]
    pub fn new(fragment: impl Into<String>, values: Vec<RowValues>) -> Self {
        Self {
            fragment: fragment.into(),
            values,
        }
    }
}

/// Anything that renders to a condition fragment.
///
/// Rendering is a pure read: the same node renders identically every time as
/// long as it is not mutated in between.
pub trait QueryClause: Debug + Send + Sync {
    fn render(&self) -> RenderedClause;
}

impl<C: QueryClause + ?Sized> QueryClause for Box<C> {
    fn render(&self) -> RenderedClause {
        (**self).render()
    }
}
