//! Read-only pages for browsing every table with search and filters.

mod dictionaries;
mod index;
mod transactions;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    pagination::PaginationConfig,
    transaction::present_value,
};

pub use dictionaries::{
    get_inspect_categories_page, get_inspect_statuses_page, get_inspect_subcategories_page,
    get_inspect_transaction_types_page,
};
pub use index::get_inspect_index_page;
pub use transactions::get_inspect_transactions_page;

/// The state needed by the inspection pages.
#[derive(Debug, Clone)]
pub struct InspectState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for InspectState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The search text and list filters of the dictionary inspection pages.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct InspectQuery {
    pub q: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
}

impl InspectQuery {
    fn search_text(&self) -> &str {
        present_value(&self.q).unwrap_or_default()
    }
}

/// Parse an optional ID filter, ignoring blank and malformed values.
fn parse_filter<Id: std::str::FromStr>(raw: &Option<String>) -> Option<Id> {
    present_value(raw).and_then(|text| text.parse().ok())
}

/// A dropdown on the search form.
struct FilterSelect<'a> {
    name: &'a str,
    label: &'a str,
    options: Vec<(String, String)>,
    selected: Option<&'a str>,
}

/// A GET form with a search box, the `selects` and any `extra_fields`.
fn search_form(
    action: &str,
    query: Option<&str>,
    selects: &[FilterSelect],
    extra_fields: Markup,
) -> Markup {
    html! {
        form
            method="get"
            action=(action)
            class="w-full flex flex-wrap gap-4 items-end mb-4"
        {
            div
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="q"
                    type="search"
                    name="q"
                    value=[query]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @for select in selects {
                div
                {
                    label for=(select.name) class=(FORM_LABEL_STYLE) { (select.label) }
                    select id=(select.name) name=(select.name) class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "All" }

                        @for (value, label) in &select.options {
                            option
                                value=(value)
                                selected[Some(value.as_str()) == select.selected]
                            {
                                (label)
                            }
                        }
                    }
                }
            }

            (extra_fields)

            div class="w-32"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Search" }
            }
        }
    }
}

fn results_table(headers: &[&str], rows: &[Vec<String>]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for header in headers {
                            th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                        }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE) data-result-row="true"
                        {
                            @for cell in row {
                                td class=(TABLE_CELL_STYLE) { (cell) }
                            }
                        }
                    }

                    @if rows.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(headers.len()) class=(TABLE_CELL_STYLE) { "Nothing found." }
                        }
                    }
                }
            }
        }
    }
}

fn inspect_page(title: &str, content: Markup) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::INSPECT_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex justify-between items-end mb-4"
                {
                    h1 class="text-xl font-bold" { (title) }

                    a href=(endpoints::INSPECT_VIEW) class=(LINK_STYLE) { "All tables" }
                }

                (content)
            }
        }
    };

    base(title, &[], &content)
}
