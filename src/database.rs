use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    DatabaseConfig,
    ast::Query,
    error::{DbError, DbResult},
    executor::{Executor, QueryResult, RowComparator, RowFilter},
    parser::parse_query,
    planner::{ExecutionPlan, plan_query},
    table::{ColumnDef, IndexDef, Row, Table},
    transaction::Transaction,
    value::Value,
};

/// The main entry point for the in-memory database engine.
///
/// All tables sit behind one reader/writer lock. Every method holds it for
/// its whole body: reads and query execution share it, writes and
/// transaction transitions take it exclusively. `Database` is `Sync`, so it
/// can be shared between threads behind an `Arc`.
pub struct Database {
    name: String,
    /// A map of table names to their respective [Table] structures.
    tables: RwLock<HashMap<String, Table>>,
    executor: Executor,
}

impl Default for Database {
    fn default() -> Self {
        Self::with_config(DatabaseConfig::default())
    }
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(DatabaseConfig::with_name(name))
    }

    pub fn with_config(config: DatabaseConfig) -> Self {
        info!(name = %config.name, "opening database");
        Self {
            name: config.name,
            tables: RwLock::new(HashMap::new()),
            executor: Executor::new(),
        }
    }

    /// Replaces the evaluator used by `Filter` stages.
    pub fn with_filter(mut self, filter: impl RowFilter + 'static) -> Self {
        self.executor = self.executor.with_filter(filter);
        self
    }

    /// Replaces the ordering used by `Sort` stages.
    pub fn with_comparator(mut self, comparator: impl RowComparator + 'static) -> Self {
        self.executor = self.executor.with_comparator(comparator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new table in the database.
    ///
    /// # Errors
    /// Returns [DbError::TableExists] if a table with the same name already exists.
    pub fn create_table(
        &self,
        name: &str,
        columns: Vec<ColumnDef>,
        indexes: Vec<IndexDef>,
    ) -> DbResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(DbError::TableExists(name.to_string()));
        }
        tables.insert(
            name.to_string(),
            Table::new(name.to_string(), columns, indexes),
        );
        info!(table = %name, "created table");
        Ok(())
    }

    /// Removes a table, and all of its rows, by its name.
    ///
    /// # Errors
    /// Returns [DbError::TableNotFound] if the table does not exist.
    pub fn drop_table(&self, name: &str) -> DbResult<()> {
        match self.tables.write().remove(name) {
            Some(_) => {
                info!(table = %name, "dropped table");
                Ok(())
            }
            None => Err(DbError::TableNotFound(name.to_string())),
        }
    }

    /// Returns the names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnDef>> {
        self.with_table(table, |t| Ok(t.columns.clone()))
    }

    pub fn table_indexes(&self, table: &str) -> DbResult<Vec<IndexDef>> {
        self.with_table(table, |t| Ok(t.indexes.clone()))
    }

    /// Inserts a row keyed by `id`, holding `id` plus every entry of `data`.
    ///
    /// # Errors
    /// - [DbError::TableNotFound] if the table does not exist.
    /// - [DbError::IdExists] if the table already holds a row with this id.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use kiv::{Database, Value};
    ///
    /// let db = Database::new("demo");
    /// db.create_table("users", vec![], vec![]).unwrap();
    /// db.insert_row("users", "1", HashMap::from([("name".to_string(), Value::from("Alice"))]))
    ///     .unwrap();
    ///
    /// let row = db.get_row_by_id("users", "1").unwrap();
    /// assert_eq!(row.get("name"), Some(&Value::from("Alice")));
    /// ```
    pub fn insert_row(&self, table: &str, id: &str, data: HashMap<String, Value>) -> DbResult<()> {
        self.with_table_mut(table, |t| t.insert(id, data))?;
        debug!(table = %table, id = %id, "inserted row");
        Ok(())
    }

    /// Merges `data` into the row with `id`. Untouched columns are kept.
    ///
    /// # Errors
    /// - [DbError::TableNotFound] if the table does not exist.
    /// - [DbError::IdNotFound] if no row has this id.
    pub fn update_row(&self, table: &str, id: &str, data: HashMap<String, Value>) -> DbResult<()> {
        self.with_table_mut(table, |t| t.update(id, data))?;
        debug!(table = %table, id = %id, "updated row");
        Ok(())
    }

    /// # Errors
    /// - [DbError::TableNotFound] if the table does not exist.
    /// - [DbError::IdNotFound] if no row has this id.
    pub fn delete_row(&self, table: &str, id: &str) -> DbResult<()> {
        self.with_table_mut(table, |t| t.delete(id))?;
        debug!(table = %table, id = %id, "deleted row");
        Ok(())
    }

    pub fn get_row_by_id(&self, table: &str, id: &str) -> DbResult<Row> {
        self.with_table(table, |t| t.get(id).cloned())
    }

    /// Returns a copy of every row, in insertion order.
    pub fn get_all_rows(&self, table: &str) -> DbResult<Vec<Row>> {
        self.with_table(table, |t| Ok(t.rows().to_vec()))
    }

    pub fn count_rows(&self, table: &str) -> DbResult<usize> {
        self.with_table(table, |t| Ok(t.row_count()))
    }

    pub fn parse_query(&self, text: &str) -> DbResult<Query> {
        parse_query(text)
    }

    pub fn plan_query(&self, query: &Query) -> ExecutionPlan {
        plan_query(query)
    }

    /// Runs a plan while holding the shared lock.
    pub fn execute_plan(&self, plan: &ExecutionPlan) -> DbResult<QueryResult> {
        let tables = self.tables.read();
        self.executor.execute(plan, &tables)
    }

    pub fn execute_query(&self, query: &Query) -> DbResult<QueryResult> {
        let plan = self.plan_query(query);
        self.execute_plan(&plan)
    }

    /// Parses, plans and executes a query string.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use kiv::Database;
    ///
    /// let db = Database::new("demo");
    /// db.create_table("users", vec![], vec![]).unwrap();
    /// db.insert_row("users", "1", HashMap::new()).unwrap();
    /// db.insert_row("users", "2", HashMap::new()).unwrap();
    ///
    /// let result = db.query("SELECT id name FROM users LIMIT 1").unwrap();
    /// assert_eq!(result.columns, vec!["id", "name"]);
    /// assert_eq!(result.rows.len(), 1);
    /// ```
    pub fn query(&self, text: &str) -> DbResult<QueryResult> {
        let query = self.parse_query(text)?;
        self.execute_query(&query)
    }

    pub fn begin_transaction(&self) -> Transaction {
        let _guard = self.tables.write();
        let tx = Transaction::begin();
        info!(tx = tx.id, "began transaction");
        tx
    }

    /// # Errors
    /// Returns [DbError::TransactionFailed] if `tx` is not pending.
    pub fn commit_transaction(&self, tx: &mut Transaction) -> DbResult<()> {
        let _guard = self.tables.write();
        tx.commit().inspect_err(|e| warn!(tx = tx.id, error = %e, "commit rejected"))?;
        info!(tx = tx.id, "committed transaction");
        Ok(())
    }

    /// # Errors
    /// Returns [DbError::TransactionFailed] if `tx` is not pending.
    pub fn rollback_transaction(&self, tx: &mut Transaction) -> DbResult<()> {
        let _guard = self.tables.write();
        tx.rollback()
            .inspect_err(|e| warn!(tx = tx.id, error = %e, "rollback rejected"))?;
        info!(tx = tx.id, "rolled back transaction");
        Ok(())
    }

    fn with_table<T>(&self, name: &str, f: impl FnOnce(&Table) -> DbResult<T>) -> DbResult<T> {
        let tables = self.tables.read();
        let table = tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        f(table)
    }

    fn with_table_mut<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;
        f(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;
    use crate::transaction::TransactionStatus;
    use std::cmp::Ordering;
    use std::thread;

    fn data(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn simple_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", DataType::String, false),
            ColumnDef::new("name", DataType::String, true),
        ]
    }

    fn users_db() -> Database {
        let db = Database::new("test");
        db.create_table("users", simple_columns(), vec![]).unwrap();
        db.insert_row("users", "1", data(&[("name", "Alice".into()), ("age", Value::Int(30))]))
            .unwrap();
        db.insert_row("users", "2", data(&[("name", "Bob".into()), ("age", Value::Int(17))]))
            .unwrap();
        db.insert_row("users", "3", data(&[("name", "Carol".into()), ("age", Value::Int(25))]))
            .unwrap();
        db
    }

    #[test]
    fn test_create_and_drop_table() {
        let db = Database::new("test");

        assert!(db.create_table("users", simple_columns(), vec![]).is_ok());
        assert_eq!(db.count_rows("users"), Ok(0));

        assert!(db.drop_table("users").is_ok());
        assert_eq!(
            db.count_rows("users"),
            Err(DbError::TableNotFound("users".into()))
        );
    }

    #[test]
    fn test_duplicate_table_error() {
        let db = Database::new("test");

        db.create_table("users", simple_columns(), vec![]).unwrap();
        let err = db.create_table("users", vec![], vec![]).unwrap_err();

        assert_eq!(err, DbError::TableExists("users".into()));
        assert_eq!(db.table_columns("users").unwrap(), simple_columns());
    }

    #[test]
    fn test_drop_nonexistent_table() {
        let db = Database::new("test");
        assert!(matches!(
            db.drop_table("unknown"),
            Err(DbError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_table_metadata() {
        let db = Database::new("test");
        db.create_table("users", simple_columns(), vec![IndexDef::new("by_name", ["name"])])
            .unwrap();
        db.create_table("posts", vec![], vec![]).unwrap();

        assert_eq!(db.name(), "test");
        assert_eq!(db.table_names(), vec!["posts", "users"]);
        assert_eq!(db.table_indexes("users").unwrap()[0].name, "by_name");
        assert!(db.table_indexes("ghosts").is_err());
    }

    #[test]
    fn test_insert_then_get() {
        let db = users_db();
        let row = db.get_row_by_id("users", "1").unwrap();

        assert_eq!(row.id(), Some("1"));
        assert_eq!(row.get("name"), Some(&Value::from("Alice")));
        assert_eq!(row.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_insert_into_missing_table() {
        let db = Database::new("test");
        let err = db.insert_row("ghosts", "1", HashMap::new()).unwrap_err();
        assert_eq!(err, DbError::TableNotFound("ghosts".into()));
    }

    #[test]
    fn test_row_ops_on_missing_table() {
        let db = users_db();
        fn missing<T>() -> DbResult<T> {
            Err(DbError::TableNotFound("ghosts".into()))
        }

        assert_eq!(
            db.update_row("ghosts", "1", data(&[("age", Value::Int(1))])),
            missing()
        );
        assert_eq!(db.delete_row("ghosts", "1"), missing());
        assert_eq!(db.get_row_by_id("ghosts", "1"), missing());
        assert_eq!(db.get_all_rows("ghosts"), missing());
        assert_eq!(db.count_rows("users"), Ok(3));
    }

    #[test]
    fn test_duplicate_id_does_not_change_count() {
        let db = users_db();

        let err = db.insert_row("users", "1", data(&[("name", "Eve".into())])).unwrap_err();
        assert!(matches!(err, DbError::IdExists { .. }));
        assert_eq!(db.count_rows("users"), Ok(3));
        assert_eq!(
            db.get_row_by_id("users", "1").unwrap().get("name"),
            Some(&Value::from("Alice"))
        );
    }

    #[test]
    fn test_delete_row() {
        let db = users_db();

        db.delete_row("users", "2").unwrap();

        assert!(matches!(
            db.get_row_by_id("users", "2"),
            Err(DbError::IdNotFound { .. })
        ));
        assert_eq!(db.count_rows("users"), Ok(2));
        let ids: Vec<_> = db
            .get_all_rows("users")
            .unwrap()
            .iter()
            .filter_map(|r| r.id().map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_delete_missing_row() {
        let db = users_db();
        assert!(matches!(
            db.delete_row("users", "99"),
            Err(DbError::IdNotFound { .. })
        ));
        assert_eq!(db.count_rows("users"), Ok(3));
    }

    #[test]
    fn test_update_merges_fields() {
        let db = users_db();

        db.update_row("users", "1", data(&[("age", Value::Int(31)), ("city", "Paris".into())]))
            .unwrap();

        let row = db.get_row_by_id("users", "1").unwrap();
        assert_eq!(row.get("age"), Some(&Value::Int(31)));
        assert_eq!(row.get("city"), Some(&Value::from("Paris")));
        assert_eq!(row.get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_update_missing_id_leaves_rows_unchanged() {
        let db = users_db();
        let before = db.get_all_rows("users").unwrap();

        let err = db
            .update_row("users", "404", data(&[("age", Value::Int(1))]))
            .unwrap_err();

        assert!(matches!(err, DbError::IdNotFound { .. }));
        assert_eq!(db.get_all_rows("users").unwrap(), before);
    }

    #[test]
    fn test_query_pipeline() {
        let db = users_db();

        let result = db.query("SELECT id name FROM users WHERE age>18 LIMIT 2").unwrap();

        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("name"), Some(&Value::from("Alice")));
        assert!(!result.rows[0].contains("age"));
    }

    #[test]
    fn test_query_unknown_table() {
        let db = users_db();

        let query = Query::new(["id", "name"], "ghosts");
        assert_eq!(
            db.execute_query(&query),
            Err(DbError::TableNotFound("ghosts".into()))
        );
    }

    #[test]
    fn test_query_invalid_text() {
        let db = users_db();
        assert!(matches!(
            db.query("SELECT id users"),
            Err(DbError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_plan_then_execute() {
        let db = users_db();
        let query = db.parse_query("SELECT id age FROM users ORDER BY age").unwrap();
        let plan = db.plan_query(&query);

        assert_eq!(plan.len(), 3);
        let result = db.execute_plan(&plan).unwrap();
        let ids: Vec<_> = result.rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_custom_comparator() {
        let db = users_db().with_comparator(|a: &Row, b: &Row, key: &str| -> Ordering {
            let key_of = |row: &Row| row.get(key).and_then(Value::as_int);
            key_of(a).cmp(&key_of(b))
        });

        let result = db.query("SELECT id age FROM users ORDER BY age").unwrap();
        let ids: Vec<_> = result.rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_transaction_commit_once() {
        let db = Database::new("test");
        let mut tx = db.begin_transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);

        assert!(db.commit_transaction(&mut tx).is_ok());
        assert!(matches!(
            db.commit_transaction(&mut tx),
            Err(DbError::TransactionFailed { .. })
        ));
        assert!(db.rollback_transaction(&mut tx).is_err());
        assert_eq!(tx.status, TransactionStatus::Committed);
    }

    #[test]
    fn test_transaction_rollback_does_not_touch_rows() {
        let db = users_db();
        let mut tx = db.begin_transaction();
        db.insert_row("users", "4", HashMap::new()).unwrap();

        db.rollback_transaction(&mut tx).unwrap();

        assert_eq!(tx.status, TransactionStatus::RolledBack);
        assert_eq!(db.count_rows("users"), Ok(4));
    }

    #[test]
    fn test_concurrent_writers_on_different_tables() {
        let db = Database::new("test");
        db.create_table("left", vec![], vec![]).unwrap();
        db.create_table("right", vec![], vec![]).unwrap();

        thread::scope(|s| {
            for table in ["left", "right"] {
                for worker in 0..4 {
                    let db = &db;
                    s.spawn(move || {
                        for i in 0..250 {
                            let id = format!("{}-{}", worker, i);
                            db.insert_row(table, &id, data(&[("n", Value::Int(i))]))
                                .unwrap();
                        }
                    });
                }
            }
        });

        assert_eq!(db.count_rows("left"), Ok(1000));
        assert_eq!(db.count_rows("right"), Ok(1000));
        let rows = db.get_all_rows("left").unwrap();
        assert!(rows.iter().all(|r| r.id().is_some() && r.contains("n")));
    }
}
