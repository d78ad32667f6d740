//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dictionary::{
        create_category_endpoint, create_status_endpoint, create_subcategory_endpoint,
        create_transaction_type_endpoint, delete_category_endpoint, delete_status_endpoint,
        delete_subcategory_endpoint, delete_transaction_type_endpoint, get_dictionaries_page,
        update_category_endpoint, update_status_endpoint, update_subcategory_endpoint,
        update_transaction_type_endpoint,
    },
    endpoints,
    inspect::{
        get_inspect_categories_page, get_inspect_index_page, get_inspect_statuses_page,
        get_inspect_subcategories_page, get_inspect_transaction_types_page,
        get_inspect_transactions_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_delete_transaction_page,
        get_edit_transaction_page, get_new_transaction_page, get_transactions_page,
        load_categories, load_subcategories, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(
            endpoints::DELETE_TRANSACTION_VIEW,
            get(get_delete_transaction_page),
        )
        .route(endpoints::DICTIONARIES_VIEW, get(get_dictionaries_page))
        .route(endpoints::INSPECT_VIEW, get(get_inspect_index_page))
        .route(
            endpoints::INSPECT_STATUSES_VIEW,
            get(get_inspect_statuses_page),
        )
        .route(
            endpoints::INSPECT_TRANSACTION_TYPES_VIEW,
            get(get_inspect_transaction_types_page),
        )
        .route(
            endpoints::INSPECT_CATEGORIES_VIEW,
            get(get_inspect_categories_page),
        )
        .route(
            endpoints::INSPECT_SUBCATEGORIES_VIEW,
            get(get_inspect_subcategories_page),
        )
        .route(
            endpoints::INSPECT_TRANSACTIONS_VIEW,
            get(get_inspect_transactions_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // These routes are called by htmx and respond with HX-Redirect or an alert.
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, post(update_transaction_endpoint))
        .route(
            endpoints::DELETE_TRANSACTION,
            post(delete_transaction_endpoint),
        )
        .route(endpoints::LOAD_CATEGORIES, get(load_categories))
        .route(endpoints::LOAD_SUBCATEGORIES, get(load_subcategories))
        .route(endpoints::STATUSES_API, post(create_status_endpoint))
        .route(endpoints::EDIT_STATUS, post(update_status_endpoint))
        .route(endpoints::DELETE_STATUS, post(delete_status_endpoint))
        .route(
            endpoints::TRANSACTION_TYPES_API,
            post(create_transaction_type_endpoint),
        )
        .route(
            endpoints::EDIT_TRANSACTION_TYPE,
            post(update_transaction_type_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION_TYPE,
            post(delete_transaction_type_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(endpoints::EDIT_CATEGORY, post(update_category_endpoint))
        .route(endpoints::DELETE_CATEGORY, post(delete_category_endpoint))
        .route(
            endpoints::SUBCATEGORIES_API,
            post(create_subcategory_endpoint),
        )
        .route(
            endpoints::EDIT_SUBCATEGORY,
            post(update_subcategory_endpoint),
        )
        .route(
            endpoints::DELETE_SUBCATEGORY,
            post(delete_subcategory_endpoint),
        );

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}
