pub mod ast;
pub mod config;
pub mod data_type;
pub mod database;
pub mod error;
pub mod executor;
pub mod parser;
pub mod planner;
pub mod table;
pub mod tokenizer;
pub mod transaction;
pub mod value;

pub use ast::Query;
pub use config::DatabaseConfig;
pub use data_type::DataType;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use executor::{AcceptAll, InsertionOrder, QueryResult, RowComparator, RowFilter};
pub use planner::{ExecutionPlan, Operation};
pub use table::{ColumnDef, IndexDef, Row, Table};
pub use transaction::{Transaction, TransactionStatus};
pub use value::Value;
