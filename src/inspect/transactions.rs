//! The inspection page for transactions, searchable by comment.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::html;
use serde::Deserialize;

use crate::{
    CategoryId, Error, StatusId, TransactionTypeId, endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    inspect::{FilterSelect, InspectState, inspect_page, parse_filter, results_table, search_form},
    pagination::pagination_view,
    parse_date,
    transaction::{FilterOptions, TransactionFilter, TransactionRepository, present_value},
};

/// The search text, list filters and page of the transaction inspection
/// page.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct InspectTransactionsQuery {
    pub q: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
}

impl InspectTransactionsQuery {
    fn to_filter(&self) -> TransactionFilter {
        let date = |raw: &Option<String>| present_value(raw).and_then(|text| parse_date(text).ok());

        TransactionFilter {
            date_from: date(&self.date_from),
            date_to: date(&self.date_to),
            status_id: parse_filter::<StatusId>(&self.status),
            transaction_type_id: parse_filter::<TransactionTypeId>(&self.transaction_type),
            category_id: parse_filter::<CategoryId>(&self.category),
            subcategory_id: None,
            comment: present_value(&self.q).map(str::to_owned),
        }
    }

    fn page_url(&self, page: u64) -> String {
        let page = page.to_string();
        let mut params = [
            ("q", &self.q),
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
            ("status", &self.status),
            ("transaction_type", &self.transaction_type),
            ("category", &self.category),
        ]
        .into_iter()
        .filter_map(|(key, raw)| present_value(raw).map(|value| (key, value)))
        .collect::<Vec<_>>();
        params.push(("page", page.as_str()));

        let query = serde_urlencoded::to_string(&params).unwrap_or_else(|error| {
            tracing::error!("could not encode inspect query: {error}");
            format!("page={page}")
        });

        format!("{}?{query}", endpoints::INSPECT_TRANSACTIONS_VIEW)
    }
}

/// Lists the transactions matching the search text and filters.
pub async fn get_inspect_transactions_page(
    State(state): State<InspectState>,
    Query(query): Query<InspectTransactionsQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let filter = query.to_filter();
    let repository = TransactionRepository::new(&connection);

    let result = repository.count_filtered(&filter).and_then(|row_count| {
        let window = state
            .pagination_config
            .resolve_page(query.page.as_deref(), row_count);
        let transactions = repository.list_filtered(&filter, window.limit, window.offset)?;
        let options = FilterOptions::load(&connection)?;

        Ok((window, transactions, options))
    });
    let (window, transactions, options) = match result {
        Ok(result) => result,
        Err(error) => {
            tracing::error!("could not search transactions: {error}");
            return error.into_response();
        }
    };

    let rows = transactions
        .into_iter()
        .map(|transaction| {
            vec![
                transaction.date.to_string(),
                transaction.transaction_type.to_string(),
                transaction.category.to_string(),
                transaction.subcategory.to_string(),
                transaction.amount.to_grouped_string(),
                transaction.status.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let selects = [
        FilterSelect {
            name: "status",
            label: "Status",
            options: options.statuses,
            selected: query.status.as_deref(),
        },
        FilterSelect {
            name: "transaction_type",
            label: "Transaction type",
            options: options.transaction_types,
            selected: query.transaction_type.as_deref(),
        },
        FilterSelect {
            name: "category",
            label: "Category",
            options: options.categories,
            selected: query.category.as_deref(),
        },
    ];

    let date_fields = html! {
        div
        {
            label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
            input
                id="date_from"
                type="date"
                name="date_from"
                value=[present_value(&query.date_from)]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
            input
                id="date_to"
                type="date"
                name="date_to"
                value=[present_value(&query.date_to)]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    };

    let content = html! {
        (search_form(
            endpoints::INSPECT_TRANSACTIONS_VIEW,
            query.q.as_deref(),
            &selects,
            date_fields,
        ))

        (results_table(
            &["Date", "Type", "Category", "Subcategory", "Amount", "Status"],
            &rows,
        ))

        (pagination_view(window, state.pagination_config.max_pages, |page| query.page_url(page)))
    };

    Html(inspect_page("Transactions", content).into_string()).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PaginationConfig,
        inspect::{InspectState, get_inspect_transactions_page, transactions::InspectTransactionsQuery},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{
            TransactionRepository,
            test_fixture::{create_taxonomy, get_test_connection},
        },
    };

    fn get_state() -> InspectState {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);
        let repository = TransactionRepository::new(&connection);
        repository
            .create(
                taxonomy
                    .expense_on(date!(2024 - 01 - 10), "300")
                    .comment("VPS for January"),
            )
            .unwrap();
        repository
            .create(
                taxonomy
                    .expense_on(date!(2024 - 02 - 10), "300")
                    .comment("VPS for February"),
            )
            .unwrap();
        repository
            .create(
                taxonomy
                    .income_on(date!(2024 - 01 - 15), "50000")
                    .comment("Salary"),
            )
            .unwrap();

        InspectState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        }
    }

    #[tokio::test]
    async fn searches_comment_within_date_range() {
        let state = get_state();
        let query = InspectTransactionsQuery {
            q: Some("vps".to_owned()),
            date_from: Some("2024-01-01".to_owned()),
            date_to: Some("2024-01-31".to_owned()),
            ..Default::default()
        };

        let response = get_inspect_transactions_page(State(state), Query(query)).await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let dates = document
            .select(&Selector::parse("tr[data-result-row] td:first-child").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(dates, ["2024-01-10"]);
    }

    #[test]
    fn page_url_keeps_search() {
        let query = InspectTransactionsQuery {
            q: Some("vps server".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            query.page_url(3),
            "/inspect/transactions?q=vps+server&page=3"
        );
    }
}
