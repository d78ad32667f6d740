//! Turns the query string of the transactions page into a
//! [TransactionFilter] and renders the filter form.

use std::str::FromStr;

use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    dictionary::{
        CategoryRepository, StatusRepository, SubcategoryRepository, TransactionTypeRepository,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, SelectInput,
        field_error,
    },
    parse_date,
    transaction::TransactionFilter,
};

/// The raw query parameters of the transactions page.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub page: Option<String>,
}

/// Messages for filter values that could not be understood.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterErrors {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Blank values count as not given.
pub(crate) fn present_value(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn parse_id<Id: FromStr>(raw: &Option<String>, error: &mut Option<String>) -> Option<Id> {
    let text = present_value(raw)?;

    match text.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            *error = Some(format!("\"{text}\" is not a valid choice, the filter was ignored."));
            None
        }
    }
}

fn parse_date_field(raw: &Option<String>, error: &mut Option<String>) -> Option<Date> {
    let text = present_value(raw)?;

    match parse_date(text) {
        Ok(date) => Some(date),
        Err(date_error) => {
            *error = Some(date_error.to_string());
            None
        }
    }
}

impl FilterQuery {
    /// Build the filter from the values that are present.
    ///
    /// Values that cannot be parsed are left out of the filter and reported
    /// in the returned errors.
    pub fn to_filter(&self) -> (TransactionFilter, FilterErrors) {
        let mut errors = FilterErrors::default();

        let filter = TransactionFilter {
            date_from: parse_date_field(&self.date_from, &mut errors.date_from),
            date_to: parse_date_field(&self.date_to, &mut errors.date_to),
            status_id: parse_id(&self.status, &mut errors.status),
            transaction_type_id: parse_id(&self.transaction_type, &mut errors.transaction_type),
            category_id: parse_id(&self.category, &mut errors.category),
            subcategory_id: parse_id(&self.subcategory, &mut errors.subcategory),
            comment: None,
        };

        (filter, errors)
    }

    /// The URL of `page` of the transactions page with the same filters.
    pub fn page_url(&self, page: u64) -> String {
        let page = page.to_string();
        let mut params = [
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
            ("status", &self.status),
            ("transaction_type", &self.transaction_type),
            ("category", &self.category),
            ("subcategory", &self.subcategory),
        ]
        .into_iter()
        .filter_map(|(key, raw)| present_value(raw).map(|value| (key, value)))
        .collect::<Vec<_>>();
        params.push(("page", page.as_str()));

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
            Err(error) => {
                tracing::error!("could not encode filter query: {error}");
                format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW)
            }
        }
    }
}

/// The options for each dropdown of the filter form as `(value, label)`
/// pairs.
#[derive(Debug, Default)]
pub struct FilterOptions {
    pub statuses: Vec<(String, String)>,
    pub transaction_types: Vec<(String, String)>,
    pub categories: Vec<(String, String)>,
    pub subcategories: Vec<(String, String)>,
}

impl FilterOptions {
    /// Load every entry of each dictionary.
    ///
    /// Categories and subcategories are labelled with their parent since
    /// names may repeat under different parents.
    pub fn load(connection: &Connection) -> Result<Self, Error> {
        let pair = |id: i64, label: String| (id.to_string(), label);

        Ok(Self {
            statuses: StatusRepository::new(connection)
                .get_all()?
                .into_iter()
                .map(|status| pair(status.id.as_i64(), status.name.to_string()))
                .collect(),
            transaction_types: TransactionTypeRepository::new(connection)
                .get_all()?
                .into_iter()
                .map(|kind| pair(kind.id.as_i64(), kind.name.to_string()))
                .collect(),
            categories: CategoryRepository::new(connection)
                .get_all()?
                .into_iter()
                .map(|listing| pair(listing.category.id.as_i64(), listing.to_string()))
                .collect(),
            subcategories: SubcategoryRepository::new(connection)
                .get_all()?
                .into_iter()
                .map(|listing| pair(listing.subcategory.id.as_i64(), listing.to_string()))
                .collect(),
        })
    }
}

pub fn filter_form_view(
    query: &FilterQuery,
    options: &FilterOptions,
    errors: &FilterErrors,
) -> Markup {
    let selected = |raw: &Option<String>| present_value(raw).unwrap_or_default().to_owned();
    let date_from = selected(&query.date_from);
    let date_to = selected(&query.date_to);
    let status = selected(&query.status);
    let transaction_type = selected(&query.transaction_type);
    let category = selected(&query.category);
    let subcategory = selected(&query.subcategory);

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full grid gap-4 md:grid-cols-3 lg:grid-cols-4 items-end mb-6"
        {
            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="date_from"
                    type="date"
                    name="date_from"
                    value=(date_from)
                    class=(FORM_TEXT_INPUT_STYLE);
                (field_error(errors.date_from.as_deref()))
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="date_to"
                    type="date"
                    name="date_to"
                    value=(date_to)
                    class=(FORM_TEXT_INPUT_STYLE);
                (field_error(errors.date_to.as_deref()))
            }

            (SelectInput {
                name: "status",
                label: "Status",
                placeholder: "All",
                options: &options.statuses,
                selected: &status,
                required: false,
                error: errors.status.as_deref(),
            }.into_html())

            (SelectInput {
                name: "transaction_type",
                label: "Type",
                placeholder: "All",
                options: &options.transaction_types,
                selected: &transaction_type,
                required: false,
                error: errors.transaction_type.as_deref(),
            }.into_html())

            (SelectInput {
                name: "category",
                label: "Category",
                placeholder: "All",
                options: &options.categories,
                selected: &category,
                required: false,
                error: errors.category.as_deref(),
            }.into_html())

            (SelectInput {
                name: "subcategory",
                label: "Subcategory",
                placeholder: "All",
                options: &options.subcategories,
                selected: &subcategory,
                required: false,
                error: errors.subcategory.as_deref(),
            }.into_html())

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Reset" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        StatusId, TransactionTypeId,
        transaction::filter::{FilterErrors, FilterQuery},
    };

    #[test]
    fn blank_values_are_ignored() {
        let query = FilterQuery {
            date_from: Some(String::new()),
            status: Some("  ".to_owned()),
            ..Default::default()
        };

        let (filter, errors) = query.to_filter();

        assert_eq!(filter, Default::default());
        assert_eq!(errors, FilterErrors::default());
    }

    #[test]
    fn present_values_are_parsed() {
        let query = FilterQuery {
            date_from: Some("2024-01-01".to_owned()),
            date_to: Some("2024-01-31".to_owned()),
            status: Some("2".to_owned()),
            transaction_type: Some("1".to_owned()),
            ..Default::default()
        };

        let (filter, errors) = query.to_filter();

        assert_eq!(filter.date_from, Some(date!(2024 - 01 - 01)));
        assert_eq!(filter.date_to, Some(date!(2024 - 01 - 31)));
        assert_eq!(filter.status_id, Some(StatusId::new(2)));
        assert_eq!(filter.transaction_type_id, Some(TransactionTypeId::new(1)));
        assert_eq!(errors, FilterErrors::default());
    }

    #[test]
    fn invalid_values_are_reported_and_ignored() {
        let query = FilterQuery {
            date_to: Some("yesterday".to_owned()),
            category: Some("food".to_owned()),
            ..Default::default()
        };

        let (filter, errors) = query.to_filter();

        assert_eq!(filter, Default::default());
        assert!(errors.date_to.is_some());
        assert!(errors.category.is_some());
        assert_eq!(errors.status, None);
    }

    #[test]
    fn page_url_keeps_filters() {
        let query = FilterQuery {
            date_from: Some("2024-01-01".to_owned()),
            status: Some(String::new()),
            category: Some("3".to_owned()),
            page: Some("7".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            query.page_url(2),
            "/transactions?date_from=2024-01-01&category=3&page=2"
        );
    }
}
