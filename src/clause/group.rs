use super::{ALWAYS_TRUE, QueryClause, RenderedClause};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeConnector {
    And,
    Or,
}

impl ScopeConnector {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            ScopeConnector::And => " and ",
            ScopeConnector::Or => " or ",
        }
    }
}

fn render_scope(connector: ScopeConnector, clauses: &[Box<dyn QueryClause>]) -> RenderedClause {
    if clauses.is_empty() {
        return RenderedClause::new(ALWAYS_TRUE, Vec::new());
    }
    let mut fragments = Vec::with_capacity(clauses.len());
    let mut values = Vec::new();
    for clause in clauses {
        let rendered = clause.render();
        fragments.push(rendered.fragment);
        values.extend(rendered.values);
    }
    RenderedClause::new(format!("({})", fragments.join(connector.sql())), values)
}

macro_rules! scope_group {
    ($(#[$doc:meta])* $name:ident, $connector:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            clauses: Vec<Box<dyn QueryClause>>,
        }

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn with_clauses(clauses: Vec<Box<dyn QueryClause>>) -> Self {
                Self { clauses }
            }

            pub fn add_clause(&mut self, clause: impl QueryClause + 'static) -> &mut Self {
                self.clauses.push(Box::new(clause));
                self
            }

            /// Replace the whole child sequence.
            pub fn set_clause_list(&mut self, clauses: Vec<Box<dyn QueryClause>>) {
                self.clauses = clauses;
            }

            #[must_use]
            pub fn clause_list(&self) -> &[Box<dyn QueryClause>] {
                &self.clauses
            }

            #[must_use]
            pub fn len(&self) -> usize {
                self.clauses.len()
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.clauses.is_empty()
            }
        }

        impl QueryClause for $name {
            fn render(&self) -> RenderedClause {
                render_scope($connector, &self.clauses)
            }
        }
    };
}

scope_group!(
    /// Children joined with `or`, rendered as `(c1 or c2 or ...)`.
    OrScopeQueryClauseGroup,
    ScopeConnector::Or
);

scope_group!(
    /// Children joined with `and`, rendered as `(c1 and c2 and ...)`.
    AndScopeQueryClauseGroup,
    ScopeConnector::And
);

impl OrScopeQueryClauseGroup {
    pub fn set_or_clause_list(&mut self, clauses: Vec<Box<dyn QueryClause>>) {
        self.set_clause_list(clauses);
    }

    #[must_use]
    pub fn or_clause_list(&self) -> &[Box<dyn QueryClause>] {
        self.clause_list()
    }
}
