use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{DeclaredType, RowValues};

/// Mapping of one entity property onto a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub property: String,
    pub column: String,
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub element_type: Option<DeclaredType>,
    #[serde(default)]
    pub primary_key: bool,
    /// Value generated by the database on insert.
    #[serde(default)]
    pub identity: bool,
    /// Sequence feeding this column on insert.
    #[serde(default)]
    pub sequence: Option<String>,
}

impl ColumnMeta {
    #[must_use]
    pub fn new(
        property: impl Into<String>,
        column: impl Into<String>,
        declared_type: DeclaredType,
    ) -> Self {
        Self {
            property: property.into(),
            column: column.into(),
            declared_type,
            element_type: None,
            primary_key: false,
            identity: false,
            sequence: None,
        }
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    #[must_use]
    pub fn sequence(mut self, sequence_name: impl Into<String>) -> Self {
        self.sequence = Some(sequence_name.into());
        self
    }

    #[must_use]
    pub fn element_type(mut self, element_type: DeclaredType) -> Self {
        self.element_type = Some(element_type);
        self
    }
}

/// Table-level mapping used by the auto commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub table: String,
    pub columns: Vec<ColumnMeta>,
}

impl EntityMeta {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn column_for(&self, property: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.property == property)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    #[must_use]
    pub fn identity_column(&self) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.identity)
    }
}

/// Property lookup on a caller's row object.
pub trait EntityRow {
    /// `None` when the row has no such property; an explicit SQL null is
    /// `Some(RowValues::Null)`.
    fn property_value(&self, property: &str) -> Option<RowValues>;
}

impl EntityRow for HashMap<String, RowValues> {
    fn property_value(&self, property: &str) -> Option<RowValues> {
        self.get(property).cloned()
    }
}

impl EntityRow for BTreeMap<String, RowValues> {
    fn property_value(&self, property: &str) -> Option<RowValues> {
        self.get(property).cloned()
    }
}
