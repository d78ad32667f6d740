//! JSON endpoints used by the transaction form to reload the category and
//! subcategory dropdowns when their parent changes.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, CategoryId, Error, TransactionTypeId,
    dictionary::{CategoryRepository, SubcategoryRepository},
    transaction::choices::ParentSelection,
};

/// The state needed for the lookup endpoints.
#[derive(Debug, Clone)]
pub struct LookupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LookupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One option for a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryLookupQuery {
    pub transaction_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryLookupQuery {
    pub category: Option<String>,
}

/// List the categories of a transaction type, sorted by name.
///
/// A missing, malformed or unknown transaction type gives an empty list.
pub async fn load_categories(
    State(state): State<LookupState>,
    Query(query): Query<CategoryLookupQuery>,
) -> Response {
    let ParentSelection::Selected(transaction_type_id) =
        ParentSelection::<TransactionTypeId>::parse(query.transaction_type.as_deref())
    else {
        return Json(Vec::<LookupItem>::new()).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return lookup_error(Error::DatabaseLockError);
        }
    };

    match CategoryRepository::new(&connection).for_transaction_type(transaction_type_id) {
        Ok(categories) => Json(
            categories
                .into_iter()
                .map(|category| LookupItem {
                    id: category.id.as_i64(),
                    name: category.name.to_string(),
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => lookup_error(error),
    }
}

/// List the subcategories of a category, sorted by name.
///
/// A missing, malformed or unknown category gives an empty list.
pub async fn load_subcategories(
    State(state): State<LookupState>,
    Query(query): Query<SubcategoryLookupQuery>,
) -> Response {
    let ParentSelection::Selected(category_id) =
        ParentSelection::<CategoryId>::parse(query.category.as_deref())
    else {
        return Json(Vec::<LookupItem>::new()).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return lookup_error(Error::DatabaseLockError);
        }
    };

    match SubcategoryRepository::new(&connection).for_category(category_id) {
        Ok(subcategories) => Json(
            subcategories
                .into_iter()
                .map(|subcategory| LookupItem {
                    id: subcategory.id.as_i64(),
                    name: subcategory.name.to_string(),
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => lookup_error(error),
    }
}

fn lookup_error(error: Error) -> Response {
    tracing::error!("could not look up dropdown options: {error}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "could not load options" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };

    use crate::{
        test_utils::{assert_content_type, response_text},
        transaction::{
            core::test_fixture::{Taxonomy, create_taxonomy, get_test_connection},
            lookup::{
                CategoryLookupQuery, LookupItem, LookupState, SubcategoryLookupQuery,
                load_categories, load_subcategories,
            },
        },
    };

    fn get_state() -> (LookupState, Taxonomy) {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        (
            LookupState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            taxonomy,
        )
    }

    async fn parse_items(response: Response) -> Vec<LookupItem> {
        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "application/json");
        let body = response_text(response).await;

        serde_json::from_str(&body).expect("Could not parse JSON")
    }

    #[tokio::test]
    async fn loads_categories_of_type() {
        let (state, taxonomy) = get_state();

        let response = load_categories(
            State(state),
            Query(CategoryLookupQuery {
                transaction_type: Some(taxonomy.income.id.to_string()),
            }),
        )
        .await;

        assert_eq!(
            parse_items(response).await,
            [LookupItem {
                id: taxonomy.salary.id.as_i64(),
                name: "Salary".to_owned()
            }]
        );
    }

    #[tokio::test]
    async fn loads_subcategories_sorted_by_name() {
        let (state, taxonomy) = get_state();

        let response = load_subcategories(
            State(state),
            Query(SubcategoryLookupQuery {
                category: Some(taxonomy.salary.id.to_string()),
            }),
        )
        .await;

        let names = parse_items(response)
            .await
            .into_iter()
            .map(|item| item.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["Main job", "Side job"]);
    }

    #[tokio::test]
    async fn missing_malformed_or_unknown_parent_gives_empty_list() {
        let (state, _) = get_state();

        for raw in [None, Some(""), Some("abc"), Some("999")] {
            let response = load_categories(
                State(state.clone()),
                Query(CategoryLookupQuery {
                    transaction_type: raw.map(str::to_owned),
                }),
            )
            .await;
            assert!(parse_items(response).await.is_empty(), "categories for {raw:?}");

            let response = load_subcategories(
                State(state.clone()),
                Query(SubcategoryLookupQuery {
                    category: raw.map(str::to_owned),
                }),
            )
            .await;
            assert!(parse_items(response).await.is_empty(), "subcategories for {raw:?}");
        }
    }
}
