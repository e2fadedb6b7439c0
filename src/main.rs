use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use kiv::{ColumnDef, DataType, Database, DatabaseConfig, DbResult, IndexDef, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs queries against a small in-memory demo table.
#[derive(Parser, Debug)]
#[command(name = "kiv", version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured database name
    #[arg(short, long)]
    name: Option<String>,

    /// Queries to run, e.g. "SELECT id name FROM users LIMIT 2"
    queries: Vec<String>,
}

fn seed(db: &Database) -> DbResult<()> {
    db.create_table(
        "users",
        vec![
            ColumnDef::new("id", DataType::String, false),
            ColumnDef::new("name", DataType::String, false),
            ColumnDef::new("age", DataType::Int, true),
        ],
        vec![IndexDef::new("users_by_name", ["name"])],
    )?;

    for (id, name, age) in [("1", "Alice", 30), ("2", "Bob", 17), ("3", "Charlie", 25)] {
        let data = HashMap::from([
            ("name".to_string(), Value::from(name)),
            ("age".to_string(), Value::Int(age)),
        ]);
        db.insert_row("users", id, data)?;
    }
    Ok(())
}

fn main() -> DbResult<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DatabaseConfig::load(path)?,
        None => DatabaseConfig::default(),
    };
    if let Some(name) = args.name {
        config.name = name;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = Database::with_config(config);
    seed(&db)?;

    let queries = if args.queries.is_empty() {
        vec!["SELECT id name FROM users LIMIT 2".to_string()]
    } else {
        args.queries
    };

    for text in &queries {
        info!(query = %text, "running query");
        match db.query(text) {
            Ok(result) => {
                println!("{}", result.columns.join(" | "));
                for row in &result.rows {
                    let cells: Vec<String> = result
                        .columns
                        .iter()
                        .map(|col| row.get(col).map(|v| format!("{:?}", v)).unwrap_or_default())
                        .collect();
                    println!("{}", cells.join(" | "));
                }
            }
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}
