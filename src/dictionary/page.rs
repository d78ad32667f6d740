//! The page for managing statuses, transaction types, categories and
//! subcategories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, EntryKind, Error,
    dictionary::{
        CategoryListing, CategoryRepository, Status, StatusRepository, SubcategoryListing,
        SubcategoryRepository, TransactionType, TransactionTypeRepository,
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed by the dictionary page and endpoints.
#[derive(Debug, Clone)]
pub struct DictionaryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DictionaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct Dictionaries {
    statuses: Vec<Status>,
    transaction_types: Vec<TransactionType>,
    categories: Vec<CategoryListing>,
    subcategories: Vec<SubcategoryListing>,
}

impl Dictionaries {
    fn load(connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            statuses: StatusRepository::new(connection).get_all()?,
            transaction_types: TransactionTypeRepository::new(connection).get_all()?,
            categories: CategoryRepository::new(connection).get_all()?,
            subcategories: SubcategoryRepository::new(connection).get_all()?,
        })
    }
}

/// Renders every dictionary with forms for adding, renaming and deleting
/// entries.
pub async fn get_dictionaries_page(State(state): State<DictionaryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let dictionaries = match Dictionaries::load(&connection) {
        Ok(dictionaries) => dictionaries,
        Err(error) => {
            tracing::error!("could not load dictionaries: {error}");
            return error.into_response();
        }
    };

    Html(dictionaries_view(&dictionaries).into_string()).into_response()
}

fn dictionaries_view(dictionaries: &Dictionaries) -> Markup {
    let type_options = dictionaries
        .transaction_types
        .iter()
        .map(|kind| (kind.id.to_string(), kind.name.to_string()))
        .collect::<Vec<_>>();
    let category_options = dictionaries
        .categories
        .iter()
        .map(|listing| (listing.category.id.to_string(), listing.to_string()))
        .collect::<Vec<_>>();

    let status_rows = dictionaries
        .statuses
        .iter()
        .map(|status| EntryRow {
            id: status.id.as_i64(),
            name: status.name.as_ref(),
            parent: None,
            extra_columns: Vec::new(),
        })
        .collect::<Vec<_>>();
    let type_rows = dictionaries
        .transaction_types
        .iter()
        .map(|kind| EntryRow {
            id: kind.id.as_i64(),
            name: kind.name.as_ref(),
            parent: None,
            extra_columns: Vec::new(),
        })
        .collect::<Vec<_>>();
    let category_rows = dictionaries
        .categories
        .iter()
        .map(|listing| EntryRow {
            id: listing.category.id.as_i64(),
            name: listing.category.name.as_ref(),
            parent: Some(listing.category.transaction_type_id.to_string()),
            extra_columns: Vec::new(),
        })
        .collect::<Vec<_>>();
    let subcategory_rows = dictionaries
        .subcategories
        .iter()
        .map(|listing| EntryRow {
            id: listing.subcategory.id.as_i64(),
            name: listing.subcategory.name.as_ref(),
            parent: Some(listing.subcategory.category_id.to_string()),
            extra_columns: vec![listing.transaction_type_name.to_string()],
        })
        .collect::<Vec<_>>();

    let content = html! {
        (NavBar::new(endpoints::DICTIONARIES_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-10"
            {
                h1 class="text-xl font-bold" { "Dictionaries" }

                (DictionarySection {
                    kind: EntryKind::Status,
                    create_endpoint: endpoints::STATUSES_API,
                    edit_endpoint: endpoints::EDIT_STATUS,
                    delete_endpoint: endpoints::DELETE_STATUS,
                    parent: None,
                    extra_headers: &[],
                    rows: &status_rows,
                }.into_html())

                (DictionarySection {
                    kind: EntryKind::TransactionType,
                    create_endpoint: endpoints::TRANSACTION_TYPES_API,
                    edit_endpoint: endpoints::EDIT_TRANSACTION_TYPE,
                    delete_endpoint: endpoints::DELETE_TRANSACTION_TYPE,
                    parent: None,
                    extra_headers: &[],
                    rows: &type_rows,
                }.into_html())

                (DictionarySection {
                    kind: EntryKind::Category,
                    create_endpoint: endpoints::CATEGORIES_API,
                    edit_endpoint: endpoints::EDIT_CATEGORY,
                    delete_endpoint: endpoints::DELETE_CATEGORY,
                    parent: Some(ParentField {
                        name: "transaction_type",
                        label: "Transaction type",
                        options: &type_options,
                    }),
                    extra_headers: &[],
                    rows: &category_rows,
                }.into_html())

                (DictionarySection {
                    kind: EntryKind::Subcategory,
                    create_endpoint: endpoints::SUBCATEGORIES_API,
                    edit_endpoint: endpoints::EDIT_SUBCATEGORY,
                    delete_endpoint: endpoints::DELETE_SUBCATEGORY,
                    parent: Some(ParentField {
                        name: "category",
                        label: "Category",
                        options: &category_options,
                    }),
                    extra_headers: &["Transaction type"],
                    rows: &subcategory_rows,
                }.into_html())
            }
        }
    };

    base("Dictionaries", &[], &content)
}

/// The dropdown for choosing the parent of a category or subcategory.
#[derive(Clone, Copy)]
struct ParentField<'a> {
    name: &'a str,
    label: &'a str,
    options: &'a [(String, String)],
}

impl ParentField<'_> {
    fn into_html(self, selected: &str) -> Markup {
        html! {
            select
                name=(self.name)
                aria-label=(self.label)
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a " (self.label.to_lowercase()) }

                @for (value, label) in self.options {
                    option value=(value) selected[value == selected] { (label) }
                }
            }
        }
    }
}

struct EntryRow<'a> {
    id: i64,
    name: &'a str,
    /// The ID of the parent entry, if the entry has one.
    parent: Option<String>,
    /// Read-only cells shown after the edit form.
    extra_columns: Vec<String>,
}

struct DictionarySection<'a> {
    kind: EntryKind,
    create_endpoint: &'a str,
    edit_endpoint: &'a str,
    delete_endpoint: &'a str,
    parent: Option<ParentField<'a>>,
    extra_headers: &'a [&'a str],
    rows: &'a [EntryRow<'a>],
}

impl DictionarySection<'_> {
    fn into_html(self) -> Markup {
        let kind = self.kind;

        html! {
            section id=(format!("{}-section", kind.plural_title().to_lowercase().replace(' ', "-")))
            {
                h2 class="text-lg font-semibold mb-2" { (kind.plural_title()) }

                form
                    hx-post=(self.create_endpoint)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap gap-2 mb-4"
                {
                    input
                        type="text"
                        name="name"
                        placeholder={"New " (kind)}
                        aria-label={"New " (kind) " name"}
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    @if let Some(parent) = self.parent {
                        (parent.into_html(""))
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Add" }
                }

                div class="relative overflow-x-auto shadow-md sm:rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                @for header in self.extra_headers {
                                    th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                                }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Delete" } }
                            }
                        }

                        tbody
                        {
                            @for row in self.rows {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        form
                                            hx-post=(format_endpoint(self.edit_endpoint, row.id))
                                            hx-target-error="#alert-container"
                                            class="flex flex-wrap gap-2"
                                        {
                                            input
                                                type="text"
                                                name="name"
                                                value=(row.name)
                                                aria-label={(kind.title()) " name"}
                                                required
                                                class=(FORM_TEXT_INPUT_STYLE);

                                            @if let (Some(parent), Some(selected)) = (self.parent, &row.parent) {
                                                (parent.into_html(selected))
                                            }

                                            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
                                        }
                                    }

                                    @for column in &row.extra_columns {
                                        td class=(TABLE_CELL_STYLE) { (column) }
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        form
                                            hx-post=(format_endpoint(self.delete_endpoint, row.id))
                                            hx-confirm={"Are you sure you want to delete the " (kind) " '" (row.name) "'?"}
                                            hx-target-error="#alert-container"
                                        {
                                            button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                                        }
                                    }
                                }
                            }

                            @if self.rows.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td
                                        colspan=(self.extra_headers.len() + 2)
                                        class={(TABLE_CELL_STYLE) " text-center"}
                                    {
                                        "No " (kind.plural_title().to_lowercase()) " yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
