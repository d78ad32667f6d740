use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    EntryKind, Error,
    dictionary::{
        CategoryRepository, StatusRepository, SubcategoryRepository, TransactionTypeRepository,
    },
    endpoints,
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE},
    inspect::{InspectState, inspect_page},
    transaction::TransactionRepository,
};

fn count_rows(connection: &Connection) -> Result<[(EntryKind, &'static str, u64); 5], Error> {
    Ok([
        (
            EntryKind::Status,
            endpoints::INSPECT_STATUSES_VIEW,
            StatusRepository::new(connection).count()?,
        ),
        (
            EntryKind::TransactionType,
            endpoints::INSPECT_TRANSACTION_TYPES_VIEW,
            TransactionTypeRepository::new(connection).count()?,
        ),
        (
            EntryKind::Category,
            endpoints::INSPECT_CATEGORIES_VIEW,
            CategoryRepository::new(connection).count()?,
        ),
        (
            EntryKind::Subcategory,
            endpoints::INSPECT_SUBCATEGORIES_VIEW,
            SubcategoryRepository::new(connection).count()?,
        ),
        (
            EntryKind::Transaction,
            endpoints::INSPECT_TRANSACTIONS_VIEW,
            TransactionRepository::new(connection).count()?,
        ),
    ])
}

/// Renders links to each inspection page along with the number of rows in
/// each table.
pub async fn get_inspect_index_page(State(state): State<InspectState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let counts = match count_rows(&connection) {
        Ok(counts) => counts,
        Err(error) => {
            tracing::error!("could not count rows: {error}");
            return error.into_response();
        }
    };

    let content = html! {
        table class="w-full max-w-md text-sm text-left text-gray-500 dark:text-gray-400"
        {
            tbody
            {
                @for (kind, url, count) in counts {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            a href=(url) class=(LINK_STYLE) { (kind.plural_title()) }
                        }
                        td class=(TABLE_CELL_STYLE) data-count-for=(kind.plural_title()) { (count) }
                    }
                }
            }
        }
    };

    Html(inspect_page("Inspect", content).into_string()).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use scraper::Selector;

    use crate::{
        PaginationConfig,
        inspect::{InspectState, get_inspect_index_page},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::test_fixture::{create_taxonomy, get_test_connection},
    };

    #[tokio::test]
    async fn shows_row_counts() {
        let connection = get_test_connection();
        create_taxonomy(&connection);
        let state = InspectState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        };

        let response = get_inspect_index_page(State(state)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let counts = document
            .select(&Selector::parse("td[data-count-for]").unwrap())
            .map(|cell| {
                (
                    cell.value().attr("data-count-for").unwrap_or_default().to_owned(),
                    cell.text().collect::<String>(),
                )
            })
            .collect::<Vec<_>>();
        let want = [
            ("Statuses", "2"),
            ("Transaction types", "2"),
            ("Categories", "2"),
            ("Subcategories", "3"),
            ("Transactions", "0"),
        ]
        .map(|(kind, count)| (kind.to_owned(), count.to_owned()));
        assert_eq!(counts, want);
    }
}
