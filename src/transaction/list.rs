//! The page listing transactions, newest first, with filters and
//! pagination.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, pagination_view},
    transaction::{
        TransactionRepository,
        filter::{FilterOptions, FilterQuery, filter_form_view},
        query::TransactionListing,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how transactions are paged.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Renders a page of transactions matching the filters in the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let (filter, filter_errors) = query.to_filter();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let repository = TransactionRepository::new(&connection);
    let row_count = match repository.count_filtered(&filter) {
        Ok(count) => count,
        Err(error) => {
            tracing::error!("could not count transactions: {error}");
            return error.into_response();
        }
    };

    let window = state
        .pagination_config
        .resolve_page(query.page.as_deref(), row_count);

    let transactions = match repository.list_filtered(&filter, window.limit, window.offset) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("could not list transactions: {error}");
            return error.into_response();
        }
    };

    let options = match FilterOptions::load(&connection) {
        Ok(options) => options,
        Err(error) => {
            tracing::error!("could not load filter options: {error}");
            return error.into_response();
        }
    };

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (filter_form_view(&query, &options, &filter_errors))

                p class="text-sm mb-2" { (row_count) " transactions" }

                (transactions_table(&transactions))

                (pagination_view(
                    window,
                    state.pagination_config.max_pages,
                    |page| query.page_url(page),
                ))
            }
        }
    };

    Html(base("Transactions", &[], &content).into_string()).into_response()
}

fn transactions_table(transactions: &[TransactionListing]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Subcategory" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.date) }
                            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                            td class=(TABLE_CELL_STYLE) { (transaction.category) }
                            td class=(TABLE_CELL_STYLE) { (transaction.subcategory) }
                            td class={(TABLE_CELL_STYLE) " text-right"}
                            {
                                (transaction.amount.to_grouped_string())
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.status) }
                            td class=(TABLE_CELL_STYLE) { (transaction.comment) }
                            td class={(TABLE_CELL_STYLE) " flex gap-4"}
                            {
                                a
                                    href=(format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id.as_i64()))
                                    class=(LINK_STYLE)
                                {
                                    "Edit"
                                }
                                a
                                    href=(format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, transaction.id.as_i64()))
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="8" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}
