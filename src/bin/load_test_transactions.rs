use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use ledger_rs::{current_local_date, initialize_db, load_test_transactions};

/// A utility for filling the ledger database with randomly generated
/// transactions for manual testing.
///
/// Run `load_initial_data` first, the transactions use its reference data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// How many transactions to create.
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Seed for the random number generator, for reproducible data.
    #[arg(long)]
    seed: Option<u64>,

    /// The canonical name of the local timezone, used to work out today's date.
    #[arg(long, default_value = "Etc/UTC")]
    local_timezone: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("No database found at {db_path:#?}. Run load_initial_data first.");
        exit(1);
    }

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;
    let today = current_local_date(&args.local_timezone)?;

    let report = match load_test_transactions(&connection, args.count, args.seed, today) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("Could not create test transactions: {error}");
            exit(1);
        }
    };

    for (number, transaction) in report.created.iter().enumerate() {
        println!(
            "Created transaction {}: {} - {} ({}, {})",
            number + 1,
            transaction.date,
            transaction.amount.to_grouped_string(),
            transaction.transaction_type,
            transaction.comment,
        );
    }

    println!("Created {} test transactions.", report.created.len());
    println!("Transactions in the database: {}", report.total_count);
    println!(
        "Income: {}, Expense: {}",
        report.income_count, report.expense_count
    );

    Ok(())
}
