use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// Name of the column every row is keyed by.
pub const ID_COLUMN: &str = "id";

/// Column definition in the table metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Index definition. Stored with the table but never used for lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single row: column name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `data`, then stores `id` under [ID_COLUMN].
    /// An `"id"` key inside `data` is overwritten.
    pub fn with_id(id: &str, data: HashMap<String, Value>) -> Self {
        let mut columns = data;
        columns.insert(ID_COLUMN.to_string(), Value::from(id));
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.columns.insert(column.into(), value);
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Returns the row id when it is stored as text.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_COLUMN).and_then(Value::as_str)
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Iterates over `(column, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Builds a new row holding only `columns`; missing columns are skipped.
    pub fn project(&self, columns: &[String]) -> Row {
        let columns = columns
            .iter()
            .filter_map(|col| self.columns.get(col).map(|v| (col.clone(), v.clone())))
            .collect();
        Row { columns }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Row {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A named sequence of rows, kept in insertion order.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: String, columns: Vec<ColumnDef>, indexes: Vec<IndexDef>) -> Self {
        Self {
            name,
            columns,
            indexes,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.has_id(id))
    }

    fn id_not_found(&self, id: &str) -> DbError {
        DbError::IdNotFound {
            table: self.name.clone(),
            id: id.to_string(),
        }
    }

    /// Appends a new row keyed by `id`.
    ///
    /// # Errors
    /// Returns [DbError::IdExists] if a row with the same id is already stored.
    pub fn insert(&mut self, id: &str, data: HashMap<String, Value>) -> DbResult<()> {
        if self.position(id).is_some() {
            return Err(DbError::IdExists {
                table: self.name.clone(),
                id: id.to_string(),
            });
        }
        self.rows.push(Row::with_id(id, data));
        Ok(())
    }

    /// Merges `data` into the first row with `id`. Columns not named in
    /// `data` are left untouched; the id itself cannot be changed.
    pub fn update(&mut self, id: &str, data: HashMap<String, Value>) -> DbResult<()> {
        let idx = self.position(id).ok_or_else(|| self.id_not_found(id))?;
        let row = &mut self.rows[idx];
        for (column, value) in data {
            if column != ID_COLUMN {
                row.set(column, value);
            }
        }
        Ok(())
    }

    /// Removes the first row with `id`, keeping the order of the others.
    pub fn delete(&mut self, id: &str) -> DbResult<Row> {
        let idx = self.position(id).ok_or_else(|| self.id_not_found(id))?;
        Ok(self.rows.remove(idx))
    }

    pub fn get(&self, id: &str) -> DbResult<&Row> {
        self.rows
            .iter()
            .find(|row| row.has_id(id))
            .ok_or_else(|| self.id_not_found(id))
    }
}
