//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - `TransactionRepository` for storing, filtering and paging transactions
//! - The form, list, delete and lookup handlers

mod choices;
mod core;
mod create;
mod delete;
mod edit;
mod filter;
mod form;
mod list;
mod lookup;
mod query;

pub use core::{Transaction, TransactionBuilder, TransactionRepository, create_transaction_table};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::{delete_transaction_endpoint, get_delete_transaction_page};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub(crate) use filter::{FilterOptions, present_value};
pub use list::get_transactions_page;
pub use lookup::{load_categories, load_subcategories};
pub use query::{TransactionFilter, TransactionListing};

#[cfg(test)]
pub(crate) use core::test_fixture;
