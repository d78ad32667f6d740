use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use ledger_rs::{initialize_db, load_initial_data};

/// A utility for loading the default statuses, transaction types, categories
/// and subcategories into the ledger database.
///
/// Entries that already exist are skipped, so it is safe to run more than once.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Database path must include a file extension (e.g., 'ledger.db').");
        exit(1);
    }

    println!("Loading reference data into {db_path:#?}");
    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let report = load_initial_data(&connection)?;

    for entry in &report.created {
        println!("{entry}");
    }

    if report.created.is_empty() {
        println!("Nothing to do, the reference data is already loaded.");
    }

    println!("Success!");

    Ok(())
}
