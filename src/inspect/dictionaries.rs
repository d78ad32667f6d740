//! Inspection pages for the four dictionaries.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::html;

use crate::{
    CategoryId, Error, TransactionTypeId,
    dictionary::{
        CategoryRepository, StatusRepository, SubcategoryRepository, SubcategoryScope,
        TransactionTypeRepository,
    },
    endpoints,
    inspect::{
        FilterSelect, InspectQuery, InspectState, inspect_page, parse_filter, results_table,
        search_form,
    },
};

macro_rules! lock_or_return {
    ($state:expr) => {
        match $state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        }
    };
}

fn render(title: &str, content: maud::Markup) -> Response {
    Html(inspect_page(title, content).into_string()).into_response()
}

/// Lists the statuses whose name contains the search text.
pub async fn get_inspect_statuses_page(
    State(state): State<InspectState>,
    Query(query): Query<InspectQuery>,
) -> Response {
    let connection = lock_or_return!(state);

    let statuses = match StatusRepository::new(&connection).search(query.search_text()) {
        Ok(statuses) => statuses,
        Err(error) => {
            tracing::error!("could not search statuses: {error}");
            return error.into_response();
        }
    };

    let rows = statuses
        .into_iter()
        .map(|status| vec![status.name.to_string()])
        .collect::<Vec<_>>();

    render(
        "Statuses",
        html! {
            (search_form(endpoints::INSPECT_STATUSES_VIEW, query.q.as_deref(), &[], html! {}))
            (results_table(&["Name"], &rows))
        },
    )
}

/// Lists the transaction types whose name contains the search text.
pub async fn get_inspect_transaction_types_page(
    State(state): State<InspectState>,
    Query(query): Query<InspectQuery>,
) -> Response {
    let connection = lock_or_return!(state);

    let transaction_types =
        match TransactionTypeRepository::new(&connection).search(query.search_text()) {
            Ok(transaction_types) => transaction_types,
            Err(error) => {
                tracing::error!("could not search transaction types: {error}");
                return error.into_response();
            }
        };

    let rows = transaction_types
        .into_iter()
        .map(|kind| vec![kind.name.to_string()])
        .collect::<Vec<_>>();

    render(
        "Transaction types",
        html! {
            (search_form(endpoints::INSPECT_TRANSACTION_TYPES_VIEW, query.q.as_deref(), &[], html! {}))
            (results_table(&["Name"], &rows))
        },
    )
}

/// Lists the categories matching the search text and transaction type.
pub async fn get_inspect_categories_page(
    State(state): State<InspectState>,
    Query(query): Query<InspectQuery>,
) -> Response {
    let connection = lock_or_return!(state);
    let transaction_type_id = parse_filter::<TransactionTypeId>(&query.transaction_type);

    let result = TransactionTypeRepository::new(&connection)
        .get_all()
        .and_then(|transaction_types| {
            CategoryRepository::new(&connection)
                .search(query.search_text(), transaction_type_id)
                .map(|categories| (transaction_types, categories))
        });
    let (transaction_types, categories) = match result {
        Ok(result) => result,
        Err(error) => {
            tracing::error!("could not search categories: {error}");
            return error.into_response();
        }
    };

    let rows = categories
        .into_iter()
        .map(|listing| {
            vec![
                listing.category.name.to_string(),
                listing.transaction_type_name.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let selects = [FilterSelect {
        name: "transaction_type",
        label: "Transaction type",
        options: transaction_types
            .into_iter()
            .map(|kind| (kind.id.to_string(), kind.name.to_string()))
            .collect(),
        selected: query.transaction_type.as_deref(),
    }];

    render(
        "Categories",
        html! {
            (search_form(endpoints::INSPECT_CATEGORIES_VIEW, query.q.as_deref(), &selects, html! {}))
            (results_table(&["Name", "Transaction type"], &rows))
        },
    )
}

/// Lists the subcategories matching the search text, transaction type and
/// category.
pub async fn get_inspect_subcategories_page(
    State(state): State<InspectState>,
    Query(query): Query<InspectQuery>,
) -> Response {
    let connection = lock_or_return!(state);
    let scope = SubcategoryScope {
        transaction_type_id: parse_filter::<TransactionTypeId>(&query.transaction_type),
        category_id: parse_filter::<CategoryId>(&query.category),
    };

    let result = TransactionTypeRepository::new(&connection)
        .get_all()
        .and_then(|transaction_types| {
            let categories = CategoryRepository::new(&connection).get_all()?;
            let subcategories =
                SubcategoryRepository::new(&connection).search(query.search_text(), scope)?;

            Ok((transaction_types, categories, subcategories))
        });
    let (transaction_types, categories, subcategories) = match result {
        Ok(result) => result,
        Err(error) => {
            tracing::error!("could not search subcategories: {error}");
            return error.into_response();
        }
    };

    let rows = subcategories
        .into_iter()
        .map(|listing| {
            vec![
                listing.subcategory.name.to_string(),
                listing.category_name.to_string(),
                listing.transaction_type_name.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let selects = [
        FilterSelect {
            name: "transaction_type",
            label: "Transaction type",
            options: transaction_types
                .into_iter()
                .map(|kind| (kind.id.to_string(), kind.name.to_string()))
                .collect(),
            selected: query.transaction_type.as_deref(),
        },
        FilterSelect {
            name: "category",
            label: "Category",
            options: categories
                .into_iter()
                .map(|listing| (listing.category.id.to_string(), listing.to_string()))
                .collect(),
            selected: query.category.as_deref(),
        },
    ];

    render(
        "Subcategories",
        html! {
            (search_form(endpoints::INSPECT_SUBCATEGORIES_VIEW, query.q.as_deref(), &selects, html! {}))
            (results_table(&["Name", "Category", "Transaction type"], &rows))
        },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        response::Response,
    };
    use scraper::Selector;

    use crate::{
        PaginationConfig,
        inspect::{
            InspectQuery, InspectState, get_inspect_categories_page, get_inspect_statuses_page,
            get_inspect_subcategories_page,
        },
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::test_fixture::{Taxonomy, create_taxonomy, get_test_connection},
    };

    fn get_state() -> (InspectState, Taxonomy) {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        (
            InspectState {
                db_connection: Arc::new(Mutex::new(connection)),
                pagination_config: PaginationConfig::default(),
            },
            taxonomy,
        )
    }

    async fn first_column(response: Response) -> Vec<String> {
        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        document
            .select(&Selector::parse("tr[data-result-row] td:first-child").unwrap())
            .map(|cell| cell.text().collect())
            .collect()
    }

    #[tokio::test]
    async fn searches_statuses_ignoring_case() {
        let (state, _) = get_state();
        let query = InspectQuery {
            q: Some("BUS".to_owned()),
            ..Default::default()
        };

        let response = get_inspect_statuses_page(State(state), Query(query)).await;

        assert_eq!(first_column(response).await, ["Business"]);
    }

    #[tokio::test]
    async fn filters_categories_by_type() {
        let (state, taxonomy) = get_state();
        let query = InspectQuery {
            transaction_type: Some(taxonomy.expense.id.to_string()),
            ..Default::default()
        };

        let response = get_inspect_categories_page(State(state), Query(query)).await;

        assert_eq!(first_column(response).await, ["Marketing"]);
    }

    #[tokio::test]
    async fn filters_subcategories_by_category_and_search() {
        let (state, taxonomy) = get_state();
        let query = InspectQuery {
            q: Some("job".to_owned()),
            category: Some(taxonomy.salary.id.to_string()),
            ..Default::default()
        };

        let response = get_inspect_subcategories_page(State(state), Query(query)).await;

        assert_eq!(first_column(response).await, ["Main job", "Side job"]);
    }

    #[tokio::test]
    async fn malformed_filter_is_ignored() {
        let (state, _) = get_state();
        let query = InspectQuery {
            transaction_type: Some("abc".to_owned()),
            ..Default::default()
        };

        let response = get_inspect_subcategories_page(State(state), Query(query)).await;

        assert_eq!(first_column(response).await.len(), 3);
    }
}
