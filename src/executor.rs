use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::planner::{ExecutionPlan, Operation};
use crate::table::{Row, Table};

/// Represents the result of a successful query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Column list of the projection stage.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Decides whether a row passes a `Filter` stage.
pub trait RowFilter: Send + Sync {
    fn accepts(&self, row: &Row, predicate: &str) -> bool;
}

/// Ordering used by a `Sort` stage. Sorting is stable, so returning
/// [Ordering::Equal] keeps insertion order.
pub trait RowComparator: Send + Sync {
    fn compare(&self, a: &Row, b: &Row, key: &str) -> Ordering;
}

/// Accepts every row. Predicates are not evaluated yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl RowFilter for AcceptAll {
    fn accepts(&self, _row: &Row, _predicate: &str) -> bool {
        true
    }
}

/// Treats every pair as already ordered.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsertionOrder;

impl RowComparator for InsertionOrder {
    fn compare(&self, _a: &Row, _b: &Row, _key: &str) -> Ordering {
        Ordering::Equal
    }
}

impl<F> RowFilter for F
where
    F: Fn(&Row, &str) -> bool + Send + Sync,
{
    fn accepts(&self, row: &Row, predicate: &str) -> bool {
        self(row, predicate)
    }
}

impl<F> RowComparator for F
where
    F: Fn(&Row, &Row, &str) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &Row, b: &Row, key: &str) -> Ordering {
        self(a, b, key)
    }
}

/// Runs an [ExecutionPlan] over a set of tables.
///
/// The caller is responsible for holding the lock that guards `tables`
/// for the duration of [Executor::execute].
#[derive(Clone)]
pub struct Executor {
    filter: Arc<dyn RowFilter>,
    comparator: Arc<dyn RowComparator>,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            filter: Arc::new(AcceptAll),
            comparator: Arc::new(InsertionOrder),
        }
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl RowFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_comparator(mut self, comparator: impl RowComparator + 'static) -> Self {
        self.comparator = Arc::new(comparator);
        self
    }

    /// Applies the plan's stages in order to the rows of its source table.
    ///
    /// # Errors
    /// - [DbError::InvalidQuery] if the plan does not start with a scan.
    /// - [DbError::TableNotFound] if the scanned table does not exist.
    pub fn execute(
        &self,
        plan: &ExecutionPlan,
        tables: &HashMap<String, Table>,
    ) -> DbResult<QueryResult> {
        let source = plan
            .source_table()
            .ok_or_else(|| DbError::InvalidQuery("plan must start with a scan".into()))?;
        let table = tables
            .get(source)
            .ok_or_else(|| DbError::TableNotFound(source.to_string()))?;

        let mut result = QueryResult::default();
        let mut rows = table.rows().to_vec();

        for op in plan.operations() {
            match op {
                Operation::Scan { .. } => {}
                Operation::Filter { predicate } => {
                    rows.retain(|row| self.filter.accepts(row, predicate));
                }
                Operation::Project { columns } => {
                    result.columns = columns.clone();
                    rows = rows.iter().map(|row| row.project(columns)).collect();
                }
                Operation::Sort { key } => {
                    rows.sort_by(|a, b| self.comparator.compare(a, b, key));
                }
                Operation::Limit { count } => rows.truncate(*count),
            }
            debug!(op = %op, rows = rows.len(), "executed stage");
        }

        result.rows = rows;
        Ok(result)
    }
}
