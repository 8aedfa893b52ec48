use crate::db::InventoryTable;
use crate::models::{Column, SqlValue};

/// A where-clause fragment with `?` placeholders and the values bound to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    clause: String,
    args: Vec<SqlValue>,
}

impl Selection {
    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            args: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Selection matching exactly one row by primary key.
    pub fn by_id(id: i64) -> Self {
        Self::new(format!("{} = ?", InventoryTable::COLUMN_ID)).bind(id)
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.clause.trim().is_empty()
    }

    /// Append ` WHERE (<clause>)` to `sql` and the bound values to `args`.
    pub(crate) fn apply(&self, sql: &mut String, args: &mut Vec<SqlValue>) {
        if self.is_empty() {
            return;
        }
        sql.push_str(" WHERE (");
        sql.push_str(&self.clause);
        sql.push(')');
        args.extend(self.args.iter().cloned());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// An ORDER BY list built from known columns only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<(Column, Direction)>,
}

impl SortOrder {
    pub fn asc(column: Column) -> Self {
        Self::default().then(column, Direction::Ascending)
    }

    pub fn desc(column: Column) -> Self {
        Self::default().then(column, Direction::Descending)
    }

    pub fn then(mut self, column: Column, direction: Direction) -> Self {
        self.keys.push((column, direction));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_sql(&self) -> String {
        self.keys
            .iter()
            .map(|(column, direction)| format!("{} {}", column.column_name(), direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
