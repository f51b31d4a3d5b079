use super::{ALWAYS_FALSE, ALWAYS_TRUE, QueryClause, RenderedClause};
use crate::types::RowValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Like,
    NotLike,
    InScope,
    NotInScope,
    IsNull,
    IsNotNull,
}

impl ComparisonOperator {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Like => "like",
            ComparisonOperator::NotLike => "not like",
            ComparisonOperator::InScope => "in",
            ComparisonOperator::NotInScope => "not in",
            ComparisonOperator::IsNull => "is null",
            ComparisonOperator::IsNotNull => "is not null",
        }
    }
}

/// `column <op> ?` and its list/null variants.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonClause {
    column: String,
    operator: ComparisonOperator,
    operands: Vec<RowValues>,
}

impl ComparisonClause {
    /// Single-operand comparison. Use [`in_scope`](Self::in_scope) and
    /// [`is_null`](Self::is_null) for the list and null forms.
    #[must_use]
    pub fn new(column: impl Into<String>, operator: ComparisonOperator, value: RowValues) -> Self {
        Self {
            column: column.into(),
            operator,
            operands: vec![value],
        }
    }

    #[must_use]
    pub fn equal(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::Equal, value)
    }

    #[must_use]
    pub fn not_equal(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::NotEqual, value)
    }

    #[must_use]
    pub fn greater_than(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::GreaterThan, value)
    }

    #[must_use]
    pub fn greater_equal(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::GreaterEqual, value)
    }

    #[must_use]
    pub fn less_than(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::LessThan, value)
    }

    #[must_use]
    pub fn less_equal(column: impl Into<String>, value: RowValues) -> Self {
        Self::new(column, ComparisonOperator::LessEqual, value)
    }

    #[must_use]
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::Like, RowValues::Text(pattern.into()))
    }

    #[must_use]
    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::NotLike, RowValues::Text(pattern.into()))
    }

    #[must_use]
    pub fn in_scope(column: impl Into<String>, values: Vec<RowValues>) -> Self {
        Self {
            column: column.into(),
            operator: ComparisonOperator::InScope,
            operands: values,
        }
    }

    #[must_use]
    pub fn not_in_scope(column: impl Into<String>, values: Vec<RowValues>) -> Self {
        Self {
            column: column.into(),
            operator: ComparisonOperator::NotInScope,
            operands: values,
        }
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: ComparisonOperator::IsNull,
            operands: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: ComparisonOperator::IsNotNull,
            operands: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }
}

impl QueryClause for ComparisonClause {
    fn render(&self) -> RenderedClause {
        let op = self.operator.sql();
        match self.operator {
            ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                RenderedClause::new(format!("{} {op}", self.column), Vec::new())
            }
            ComparisonOperator::InScope | ComparisonOperator::NotInScope => {
                // `in ()` is a syntax error on most products
                if self.operands.is_empty() {
                    let fragment = if self.operator == ComparisonOperator::InScope {
                        ALWAYS_FALSE
                    } else {
                        ALWAYS_TRUE
                    };
                    return RenderedClause::new(fragment, Vec::new());
                }
                let placeholders = vec!["?"; self.operands.len()].join(", ");
                RenderedClause::new(
                    format!("{} {op} ({placeholders})", self.column),
                    self.operands.clone(),
                )
            }
            _ => RenderedClause::new(format!("{} {op} ?", self.column), self.operands.clone()),
        }
    }
}

/// Literal fragment supplied by the caller, with its own bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClause {
    fragment: String,
    values: Vec<RowValues>,
}

impl RawClause {
    #[must_use]
    pub fn new(fragment: impl Into<String>, values: Vec<RowValues>) -> Self {
        Self {
            fragment: fragment.into(),
            values,
        }
    }
}

impl QueryClause for RawClause {
    fn render(&self) -> RenderedClause {
        RenderedClause::new(self.fragment.clone(), self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_single_operand_comparisons() {
        let clause = ComparisonClause::greater_equal("price", RowValues::Int(100));
        let rendered = clause.render();
        assert_eq!(rendered.fragment, "price >= ?");
        assert_eq!(rendered.values, vec![RowValues::Int(100)]);

        let like = ComparisonClause::like("name", "A%").render();
        assert_eq!(like.fragment, "name like ?");
    }

    #[test]
    fn null_checks_bind_nothing() {
        let rendered = ComparisonClause::is_not_null("deleted_at").render();
        assert_eq!(rendered.fragment, "deleted_at is not null");
        assert!(rendered.values.is_empty());
    }

    #[test]
    fn in_scope_expands_placeholders() {
        let clause = ComparisonClause::in_scope(
            "id",
            vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(3)],
        );
        let rendered = clause.render();
        assert_eq!(rendered.fragment, "id in (?, ?, ?)");
        assert_eq!(rendered.values.len(), 3);
    }

    #[test]
    fn empty_in_scope_never_renders_empty_parens() {
        assert_eq!(ComparisonClause::in_scope("id", vec![]).render().fragment, ALWAYS_FALSE);
        assert_eq!(
            ComparisonClause::not_in_scope("id", vec![]).render().fragment,
            ALWAYS_TRUE
        );
    }

    #[test]
    fn raw_clause_is_passed_through() {
        let clause = RawClause::new("lower(name) = lower(?)", vec![RowValues::Text("Bob".into())]);
        let rendered = clause.render();
        assert_eq!(rendered.fragment, "lower(name) = lower(?)");
        assert_eq!(rendered.values, vec![RowValues::Text("Bob".into())]);
    }
}
