//! The transaction form shared by the create and edit pages: raw field
//! values, the dependent choice sets, validation and rendering.

use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Amount, CategoryId, Error, StatusId, SubcategoryId, TransactionTypeId, endpoints,
    dictionary::{Status, StatusRepository, TransactionType, TransactionTypeRepository},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, SelectInput, base, field_error,
    },
    navigation::NavBar,
    parse_date,
    transaction::{
        Transaction, TransactionBuilder,
        choices::{Choice, ParentSelection, category_choices, subcategory_choices},
    },
};

/// The raw values of the transaction form, exactly as submitted.
///
/// Fields missing from a submission deserialize as empty strings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionForm {
    pub date: String,
    pub status: String,
    pub transaction_type: String,
    pub category: String,
    pub subcategory: String,
    pub amount: String,
    pub comment: String,
}

impl TransactionForm {
    /// An empty form dated `today`.
    pub fn new_with_date(today: Date) -> Self {
        Self {
            date: today.to_string(),
            ..Default::default()
        }
    }

    /// A form filled in with the values of an existing transaction.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            date: transaction.date.to_string(),
            status: transaction.status_id.to_string(),
            transaction_type: transaction.transaction_type_id.to_string(),
            category: transaction.category_id.to_string(),
            subcategory: transaction.subcategory_id.to_string(),
            amount: transaction.amount.to_string(),
            comment: transaction.comment.clone(),
        }
    }
}

/// The options for each dropdown on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormChoices {
    pub statuses: Vec<Status>,
    pub transaction_types: Vec<TransactionType>,
    pub categories: Vec<Choice<CategoryId>>,
    pub subcategories: Vec<Choice<SubcategoryId>>,
    /// Every category, offered again when the transaction type is cleared.
    pub all_categories: Vec<Choice<CategoryId>>,
    /// Every subcategory, offered again when the category is cleared.
    pub all_subcategories: Vec<Choice<SubcategoryId>>,
}

impl FormChoices {
    /// Load the dropdown options.
    ///
    /// The category and subcategory options depend on, in order of priority,
    /// the `submitted` form, the transaction being edited (`instance`), and
    /// otherwise include every entry.
    pub fn load(
        submitted: Option<&TransactionForm>,
        instance: Option<&Transaction>,
        connection: &Connection,
    ) -> Result<Self, Error> {
        let submitted_type = submitted
            .map(|form| ParentSelection::parse(Some(form.transaction_type.as_str())))
            .unwrap_or(ParentSelection::Absent);
        let submitted_category = submitted
            .map(|form| ParentSelection::parse(Some(form.category.as_str())))
            .unwrap_or(ParentSelection::Absent);

        Ok(Self {
            statuses: StatusRepository::new(connection).get_all()?,
            transaction_types: TransactionTypeRepository::new(connection).get_all()?,
            categories: category_choices(
                submitted_type,
                instance.map(|transaction| transaction.transaction_type_id),
                connection,
            )?,
            subcategories: subcategory_choices(
                submitted_category,
                instance.map(|transaction| transaction.category_id),
                connection,
            )?,
            all_categories: category_choices(ParentSelection::Absent, None, connection)?,
            all_subcategories: subcategory_choices(ParentSelection::Absent, None, connection)?,
        })
    }
}

/// Validation messages for each field of the form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub date: Option<String>,
    pub status: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub amount: Option<String>,
}

const REQUIRED: &str = "This field is required.";

fn invalid_choice(label: &str) -> String {
    format!("Select a valid {label}. That choice is not one of the available choices.")
}

/// Parse a required dropdown value and check that it is one of `options`.
fn pick<Id: std::str::FromStr + PartialEq + Copy>(
    raw: &str,
    label: &str,
    options: impl IntoIterator<Item = Id>,
) -> Result<Id, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED.to_owned());
    }

    let id = raw.parse::<Id>().map_err(|_| invalid_choice(label))?;

    if options.into_iter().any(|option| option == id) {
        Ok(id)
    } else {
        Err(invalid_choice(label))
    }
}

/// Check every field of `form` against `choices`.
///
/// A blank date means `today`.
///
/// # Errors
/// Returns the message for each invalid field if any field is invalid.
pub fn validate(
    form: &TransactionForm,
    choices: &FormChoices,
    today: Date,
) -> Result<TransactionBuilder, FieldErrors> {
    let date = if form.date.trim().is_empty() {
        Ok(today)
    } else {
        parse_date(&form.date).map_err(|error| error.to_string())
    };
    let status = pick::<StatusId>(
        &form.status,
        "status",
        choices.statuses.iter().map(|status| status.id),
    );
    let transaction_type = pick::<TransactionTypeId>(
        &form.transaction_type,
        "transaction type",
        choices.transaction_types.iter().map(|kind| kind.id),
    );
    let category = pick::<CategoryId>(
        &form.category,
        "category",
        choices.categories.iter().map(|choice| choice.id),
    );
    let subcategory = pick::<SubcategoryId>(
        &form.subcategory,
        "subcategory",
        choices.subcategories.iter().map(|choice| choice.id),
    );
    let amount = if form.amount.trim().is_empty() {
        Err(REQUIRED.to_owned())
    } else {
        form.amount
            .parse::<Amount>()
            .map_err(|error| error.to_string())
    };

    match (date, status, transaction_type, category, subcategory, amount) {
        (
            Ok(date),
            Ok(status_id),
            Ok(transaction_type_id),
            Ok(category_id),
            Ok(subcategory_id),
            Ok(amount),
        ) => Ok(Transaction::build(
            date,
            status_id,
            transaction_type_id,
            category_id,
            subcategory_id,
            amount,
        )
        .comment(form.comment.trim())),
        (date, status, transaction_type, category, subcategory, amount) => Err(FieldErrors {
            date: date.err(),
            status: status.err(),
            transaction_type: transaction_type.err(),
            category: category.err(),
            subcategory: subcategory.err(),
            amount: amount.err(),
        }),
    }
}

/// Render the transaction form.
///
/// The form replaces itself with the response of `endpoint`, so a response
/// with validation errors shows up in place.
pub fn transaction_form_view(
    endpoint: &str,
    submit_label: &str,
    form: &TransactionForm,
    choices: &FormChoices,
    errors: &FieldErrors,
) -> Markup {
    let status_options = choices
        .statuses
        .iter()
        .map(|status| (status.id.to_string(), status.name.to_string()))
        .collect::<Vec<_>>();
    let type_options = choices
        .transaction_types
        .iter()
        .map(|kind| (kind.id.to_string(), kind.name.to_string()))
        .collect::<Vec<_>>();
    let category_options = to_options(&choices.categories);
    let subcategory_options = to_options(&choices.subcategories);
    let all_category_options = to_options(&choices.all_categories);
    let all_subcategory_options = to_options(&choices.all_subcategories);

    html! {
        form
            hx-post=(endpoint)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(form.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.date.as_deref()))
            }

            (SelectInput {
                name: "status",
                label: "Status",
                placeholder: "Select a status",
                options: &status_options,
                selected: &form.status,
                required: true,
                error: errors.status.as_deref(),
            }.into_html())

            (SelectInput {
                name: "transaction_type",
                label: "Transaction type",
                placeholder: "Select a transaction type",
                options: &type_options,
                selected: &form.transaction_type,
                required: true,
                error: errors.transaction_type.as_deref(),
            }.into_html())

            (SelectInput {
                name: "category",
                label: "Category",
                placeholder: "Select a category",
                options: &category_options,
                selected: &form.category,
                required: true,
                error: errors.category.as_deref(),
            }.into_cascading_html(
                "transaction_type",
                endpoints::LOAD_CATEGORIES,
                "transaction_type",
                &all_category_options,
            ))

            (SelectInput {
                name: "subcategory",
                label: "Subcategory",
                placeholder: "Select a subcategory",
                options: &subcategory_options,
                selected: &form.subcategory,
                required: true,
                error: errors.subcategory.as_deref(),
            }.into_cascading_html(
                "category",
                endpoints::LOAD_SUBCATEGORIES,
                "category",
                &all_subcategory_options,
            ))

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    value=(form.amount)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.amount.as_deref()))
            }

            div
            {
                label for="comment" class=(FORM_LABEL_STYLE) { "Comment" }

                textarea
                    id="comment"
                    name="comment"
                    rows="3"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (form.comment)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

/// Wrap a rendered transaction form in a full page that loads the script
/// for the dependent dropdowns.
pub fn transaction_form_page(title: &str, active_endpoint: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(active_endpoint).into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full bg-white rounded-lg shadow dark:border sm:max-w-md
                dark:bg-gray-800 dark:border-gray-700 p-6 space-y-4 md:space-y-6 sm:p-8"
            {
                h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl"
                {
                    (title)
                }

                (form)
            }
        }
    };

    base(
        title,
        &[HeadElement::ScriptLink(CASCADE_SCRIPT.to_owned())],
        &content,
    )
}

/// The script that reloads the category and subcategory options.
const CASCADE_SCRIPT: &str = "/static/app.js";

fn to_options<Id: ToString>(choices: &[Choice<Id>]) -> Vec<(String, String)> {
    choices
        .iter()
        .map(|choice| (choice.id.to_string(), choice.label.clone()))
        .collect()
}
