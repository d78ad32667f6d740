//! Database initialisation and helpers for interpreting constraint failures.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    dictionary::{
        create_category_table, create_status_table, create_subcategory_table,
        create_transaction_type_table,
    },
    transaction::create_transaction_table,
};

/// Create the tables for every entity if they do not exist yet and turn on
/// foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must run first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_status_table(&transaction)?;
    create_transaction_type_table(&transaction)?;
    create_category_table(&transaction)?;
    create_subcategory_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The kind of constraint that caused a statement to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    Unique,
    ForeignKey,
    Check,
}

/// Get the constraint that `error` reports as violated, if any.
pub(crate) fn violated_constraint(error: &rusqlite::Error) -> Option<Constraint> {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, _) => match sql_error.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Some(Constraint::Unique),
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
            rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => Some(Constraint::Check),
            _ => None,
        },
        _ => None,
    }
}

/// The escape character used by [contains_pattern].
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Build a `LIKE` pattern that matches text containing `query`.
///
/// Wildcards in `query` are escaped with [LIKE_ESCAPE], so queries must
/// declare `ESCAPE '\'`.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');

    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}
