//! Turns a [Query] into a flat chain of pipeline stages.
//!
//! The chain always has the shape
//! `Scan -> [Filter] -> Project -> [Sort] -> [Limit]`.

use std::fmt;

use tracing::debug;

use crate::ast::Query;

/// One stage of an [ExecutionPlan].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Reads every row of `table`.
    Scan { table: String },
    /// Keeps the rows accepted by the predicate. The text is opaque.
    Filter { predicate: String },
    /// Keeps only the listed columns of each row.
    Project { columns: Vec<String> },
    /// Reorders rows by `key`.
    Sort { key: String },
    /// Truncates to at most `count` rows.
    Limit { count: usize },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Scan { table } => write!(f, "Scan({})", table),
            Operation::Filter { predicate } => write!(f, "Filter({})", predicate),
            Operation::Project { columns } => write!(f, "Project({})", columns.join(", ")),
            Operation::Sort { key } => write!(f, "Sort({})", key),
            Operation::Limit { count } => write!(f, "Limit({})", count),
        }
    }
}

/// An ordered sequence of operations, executed front to back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionPlan {
    operations: Vec<Operation>,
}

impl ExecutionPlan {
    /// Builds a plan from an arbitrary operation list. Plans that do not
    /// start with a [Operation::Scan] are rejected at execution time.
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the stage feeding operation `index`, i.e. the previous one.
    pub fn parent_of(&self, index: usize) -> Option<&Operation> {
        if index >= self.operations.len() {
            return None;
        }
        index
            .checked_sub(1)
            .and_then(|parent| self.operations.get(parent))
    }

    /// Table named by the leading scan, if the plan has one.
    pub fn source_table(&self) -> Option<&str> {
        match self.operations.first() {
            Some(Operation::Scan { table }) => Some(table.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// Builds execution plans. Planning never fails: unknown tables are only
/// detected when the plan runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planner;

impl Planner {
    pub fn plan(&self, query: &Query) -> ExecutionPlan {
        let mut operations = vec![Operation::Scan {
            table: query.from.clone(),
        }];

        if let Some(predicate) = query.where_clause.as_ref().filter(|p| !p.is_empty()) {
            operations.push(Operation::Filter {
                predicate: predicate.clone(),
            });
        }

        operations.push(Operation::Project {
            columns: query.select.clone(),
        });

        if let Some(key) = query.order_by.as_ref().filter(|k| !k.is_empty()) {
            operations.push(Operation::Sort { key: key.clone() });
        }

        if query.limit > 0 {
            operations.push(Operation::Limit { count: query.limit });
        }

        let plan = ExecutionPlan { operations };
        debug!(plan = %plan, "planned query");
        plan
    }
}

/// Shorthand for [Planner::plan].
pub fn plan_query(query: &Query) -> ExecutionPlan {
    Planner.plan(query)
}
