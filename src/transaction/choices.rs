//! Works out which categories and subcategories may be picked on the
//! transaction form, given what has been selected above them.
//!
//! The same rules drive the form and the JSON lookup endpoints:
//! 1. a submitted parent ID wins,
//! 2. otherwise the parent of the transaction being edited is used,
//! 3. otherwise every entry is offered.
//!
//! A blank submitted value counts as not submitted. A submitted value that is
//! not an ID gives no choices at all.

use std::str::FromStr;

use rusqlite::Connection;

use crate::{
    CategoryId, Error, SubcategoryId, TransactionTypeId,
    dictionary::{CategoryRepository, SubcategoryRepository},
};

/// An entry that can be selected in a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<Id> {
    pub id: Id,
    pub label: String,
}

/// How a raw form or query value selects a parent entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSelection<Id> {
    /// The field was missing or blank.
    Absent,
    /// The field held an ID.
    Selected(Id),
    /// The field held something that is not an ID.
    Malformed,
}

impl<Id: FromStr> ParentSelection<Id> {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ParentSelection::Absent,
            Some(text) => match text.parse() {
                Ok(id) => ParentSelection::Selected(id),
                Err(_) => ParentSelection::Malformed,
            },
        }
    }
}

/// The categories that may be picked.
///
/// `submitted` is the raw transaction type value from the request and
/// `current` is the transaction type of the transaction being edited, if any.
pub fn category_choices(
    submitted: ParentSelection<TransactionTypeId>,
    current: Option<TransactionTypeId>,
    connection: &Connection,
) -> Result<Vec<Choice<CategoryId>>, Error> {
    let repository = CategoryRepository::new(connection);

    let transaction_type_id = match (submitted, current) {
        (ParentSelection::Selected(id), _) => id,
        (ParentSelection::Malformed, _) => return Ok(Vec::new()),
        (ParentSelection::Absent, Some(id)) => id,
        (ParentSelection::Absent, None) => {
            return Ok(repository
                .get_all()?
                .into_iter()
                .map(|listing| Choice {
                    id: listing.category.id,
                    label: listing.to_string(),
                })
                .collect());
        }
    };

    Ok(repository
        .for_transaction_type(transaction_type_id)?
        .into_iter()
        .map(|category| Choice {
            id: category.id,
            label: category.name.to_string(),
        })
        .collect())
}

/// The subcategories that may be picked.
///
/// `submitted` is the raw category value from the request and `current` is
/// the category of the transaction being edited, if any.
pub fn subcategory_choices(
    submitted: ParentSelection<CategoryId>,
    current: Option<CategoryId>,
    connection: &Connection,
) -> Result<Vec<Choice<SubcategoryId>>, Error> {
    let repository = SubcategoryRepository::new(connection);

    let category_id = match (submitted, current) {
        (ParentSelection::Selected(id), _) => id,
        (ParentSelection::Malformed, _) => return Ok(Vec::new()),
        (ParentSelection::Absent, Some(id)) => id,
        (ParentSelection::Absent, None) => {
            return Ok(repository
                .get_all()?
                .into_iter()
                .map(|listing| Choice {
                    id: listing.subcategory.id,
                    label: listing.to_string(),
                })
                .collect());
        }
    };

    Ok(repository
        .for_category(category_id)?
        .into_iter()
        .map(|subcategory| Choice {
            id: subcategory.id,
            label: subcategory.name.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use crate::{
        CategoryId, TransactionTypeId,
        transaction::{
            choices::{ParentSelection, category_choices, subcategory_choices},
            core::test_fixture::{create_taxonomy, get_test_connection},
        },
    };

    #[test]
    fn parse_selection() {
        assert_eq!(
            ParentSelection::<CategoryId>::parse(None),
            ParentSelection::Absent
        );
        assert_eq!(
            ParentSelection::<CategoryId>::parse(Some("  ")),
            ParentSelection::Absent
        );
        assert_eq!(
            ParentSelection::<CategoryId>::parse(Some("3")),
            ParentSelection::Selected(CategoryId::new(3))
        );
        assert_eq!(
            ParentSelection::<CategoryId>::parse(Some("abc")),
            ParentSelection::Malformed
        );
    }

    #[test]
    fn submitted_type_restricts_categories() {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        let got = category_choices(
            ParentSelection::Selected(taxonomy.expense.id),
            Some(taxonomy.income.id),
            &connection,
        )
        .unwrap();

        let ids = got.iter().map(|choice| choice.id).collect::<Vec<_>>();
        assert_eq!(ids, [taxonomy.marketing.id]);
        assert_eq!(got[0].label, "Marketing");
    }

    #[test]
    fn current_type_used_when_nothing_submitted() {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        let got = category_choices(
            ParentSelection::Absent,
            Some(taxonomy.income.id),
            &connection,
        )
        .unwrap();

        let ids = got.iter().map(|choice| choice.id).collect::<Vec<_>>();
        assert_eq!(ids, [taxonomy.salary.id]);
    }

    #[test]
    fn all_categories_offered_for_new_transaction() {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        let got = category_choices(ParentSelection::Absent, None, &connection).unwrap();

        let labels = got.iter().map(|choice| choice.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["Marketing (Expense)", "Salary (Income)"]);
        assert_eq!(got[1].id, taxonomy.salary.id);
    }

    #[test]
    fn malformed_type_gives_no_categories() {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        let got = category_choices(
            ParentSelection::Malformed,
            Some(taxonomy.income.id),
            &connection,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn unknown_type_gives_no_categories() {
        let connection = get_test_connection();
        create_taxonomy(&connection);

        let got = category_choices(
            ParentSelection::Selected(TransactionTypeId::new(999)),
            None,
            &connection,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn submitted_category_restricts_subcategories_sorted_by_name() {
        let connection = get_test_connection();
        let taxonomy = create_taxonomy(&connection);

        let got = subcategory_choices(
            ParentSelection::Selected(taxonomy.salary.id),
            None,
            &connection,
        )
        .unwrap();

        let ids = got.iter().map(|choice| choice.id).collect::<Vec<_>>();
        assert_eq!(ids, [taxonomy.main_job.id, taxonomy.side_job.id]);
    }

    #[test]
    fn all_subcategories_labelled_with_category() {
        let connection = get_test_connection();
        create_taxonomy(&connection);

        let got = subcategory_choices(ParentSelection::Absent, None, &connection).unwrap();

        let labels = got.iter().map(|choice| choice.label.as_str()).collect::<Vec<_>>();
        assert_eq!(
            labels,
            ["Avito (Marketing)", "Main job (Salary)", "Side job (Salary)"]
        );
    }
}
