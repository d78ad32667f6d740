//! Categories, the second level of the taxonomy. Each category belongs to
//! exactly one transaction type.

use std::fmt::Display;

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use serde::Serialize;

use crate::{
    CategoryId, Error, TransactionTypeId,
    db::{Constraint, contains_pattern, violated_constraint},
    dictionary::{EntryKind, EntryName, TransactionTypeRepository},
};

/// A category of income or expense, e.g. 'Marketing'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: EntryName,
    pub transaction_type_id: TransactionTypeId,
}

/// A category together with the name of its transaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub category: Category,
    pub transaction_type_name: EntryName,
}

impl Display for CategoryListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.category.name, self.transaction_type_name
        )
    }
}

const LISTING_COLUMNS: &str = "category.id, category.name, category.transaction_type_id, \
    transaction_type.name";

const LISTING_FROM: &str =
    "category INNER JOIN transaction_type ON transaction_type.id = category.transaction_type_id";

/// Reads and writes categories.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRepository<'a> {
    connection: &'a Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Create a category under `transaction_type_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateName] if the transaction type already has a category with the same name,
    /// - [Error::InvalidReference] if `transaction_type_id` does not refer to a transaction type,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn create(
        &self,
        name: EntryName,
        transaction_type_id: TransactionTypeId,
    ) -> Result<Category, Error> {
        self.connection
            .prepare(
                "INSERT INTO category (name, transaction_type_id) VALUES (?1, ?2)
                RETURNING id, name, transaction_type_id",
            )?
            .query_row((name.as_ref(), transaction_type_id), map_row)
            .map_err(|error| match violated_constraint(&error) {
                Some(Constraint::Unique) => {
                    Error::DuplicateName(EntryKind::Category, name.to_string())
                }
                Some(Constraint::ForeignKey) => {
                    Error::InvalidReference(EntryKind::TransactionType)
                }
                _ => error.into(),
            })
    }

    /// Retrieve a single category by ID.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a category.
    pub fn get(&self, id: CategoryId) -> Result<Category, Error> {
        self.connection
            .prepare("SELECT id, name, transaction_type_id FROM category WHERE id = ?1")?
            .query_row((id,), map_row)
            .map_err(Error::from)
    }

    /// Retrieve every category with its transaction type, ordered by
    /// category name.
    pub fn get_all(&self) -> Result<Vec<CategoryListing>, Error> {
        self.search("", None)
    }

    /// Retrieve the categories of `transaction_type_id` ordered by name.
    ///
    /// An ID that does not refer to a transaction type gives an empty list.
    pub fn for_transaction_type(
        &self,
        transaction_type_id: TransactionTypeId,
    ) -> Result<Vec<Category>, Error> {
        self.connection
            .prepare(
                "SELECT id, name, transaction_type_id FROM category
                WHERE transaction_type_id = ?1
                ORDER BY name ASC, id ASC",
            )?
            .query_map((transaction_type_id,), map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::from))
            .collect()
    }

    /// Get the category called `name` under `transaction_type_id`, creating it
    /// if it does not exist. The returned flag is `true` if it was created.
    pub fn get_or_create(
        &self,
        name: EntryName,
        transaction_type_id: TransactionTypeId,
    ) -> Result<(Category, bool), Error> {
        let existing = self
            .connection
            .prepare(
                "SELECT id, name, transaction_type_id FROM category
                WHERE name = ?1 AND transaction_type_id = ?2",
            )?
            .query_row((name.as_ref(), transaction_type_id), map_row);

        match existing {
            Ok(category) => Ok((category, false)),
            Err(rusqlite::Error::QueryReturnedNoRows) => self
                .create(name, transaction_type_id)
                .map(|category| (category, true)),
            Err(error) => Err(error.into()),
        }
    }

    /// Retrieve the categories whose name contains `query`, optionally
    /// restricted to one transaction type.
    pub fn search(
        &self,
        query: &str,
        transaction_type_id: Option<TransactionTypeId>,
    ) -> Result<Vec<CategoryListing>, Error> {
        let mut sql = format!(
            "SELECT {LISTING_COLUMNS} FROM {LISTING_FROM} WHERE category.name LIKE ?1 ESCAPE '\\'"
        );
        let mut params = vec![Value::Text(contains_pattern(query))];

        if let Some(transaction_type_id) = transaction_type_id {
            params.push(Value::Integer(transaction_type_id.as_i64()));
            sql.push_str(&format!(
                " AND category.transaction_type_id = ?{}",
                params.len()
            ));
        }

        sql.push_str(" ORDER BY category.name ASC, transaction_type.name ASC, category.id ASC");

        self.connection
            .prepare(&sql)?
            .query_map(params_from_iter(params.iter()), map_listing_row)?
            .map(|maybe_listing| maybe_listing.map_err(Error::from))
            .collect()
    }

    /// Rename a category and/or move it to another transaction type.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissing] if the category does not exist,
    /// - [Error::InvalidReference] if `transaction_type_id` does not refer to a transaction type,
    /// - [Error::MoveInUse] if the transaction type changes while transactions use the category,
    /// - [Error::DuplicateName] if the transaction type already has a category with the name.
    pub fn update(
        &self,
        id: CategoryId,
        name: EntryName,
        transaction_type_id: TransactionTypeId,
    ) -> Result<(), Error> {
        let current = match self.get(id) {
            Ok(category) => category,
            Err(Error::NotFound) => return Err(Error::UpdateMissing(EntryKind::Category)),
            Err(error) => return Err(error),
        };

        let result = if current.transaction_type_id == transaction_type_id {
            self.connection.execute(
                "UPDATE category SET name = ?1 WHERE id = ?2",
                (name.as_ref(), id),
            )
        } else {
            match TransactionTypeRepository::new(self.connection).get(transaction_type_id) {
                Ok(_) => {}
                Err(Error::NotFound) => {
                    return Err(Error::InvalidReference(EntryKind::TransactionType));
                }
                Err(error) => return Err(error),
            }

            self.connection.execute(
                "UPDATE category SET name = ?1, transaction_type_id = ?2 WHERE id = ?3",
                (name.as_ref(), transaction_type_id, id),
            )
        };

        result.map_err(|error| match violated_constraint(&error) {
            Some(Constraint::Unique) => Error::DuplicateName(EntryKind::Category, name.to_string()),
            Some(Constraint::ForeignKey) => Error::MoveInUse(EntryKind::Category),
            _ => error.into(),
        })?;

        Ok(())
    }

    /// Delete a category along with its subcategories.
    ///
    /// # Errors
    /// Returns an [Error::DeleteInUse] if any transaction uses the category or
    /// one of its subcategories, or an [Error::DeleteMissing] if the category
    /// does not exist.
    pub fn delete(&self, id: CategoryId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .execute("DELETE FROM category WHERE id = ?1", (id,))
            .map_err(|error| match violated_constraint(&error) {
                Some(Constraint::ForeignKey) => Error::DeleteInUse(EntryKind::Category),
                _ => error.into(),
            })?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissing(EntryKind::Category));
        }

        Ok(())
    }

    pub fn count(&self) -> Result<u64, Error> {
        self.connection
            .query_row("SELECT COUNT(id) FROM category", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as u64)
            .map_err(Error::from)
    }
}

/// Initialize the category table.
///
/// The extra unique key on `(id, transaction_type_id)` lets transactions
/// reference a category and its type together, so the database rejects a
/// transaction whose category belongs to another type.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            transaction_type_id INTEGER NOT NULL
                REFERENCES transaction_type(id) ON DELETE CASCADE,
            UNIQUE (name, transaction_type_id),
            UNIQUE (id, transaction_type_id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_transaction_type
            ON category(transaction_type_id);",
    )
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let transaction_type_id = row.get(2)?;

    Ok(Category {
        id,
        name: EntryName::new_unchecked(&raw_name),
        transaction_type_id,
    })
}

fn map_listing_row(row: &Row) -> Result<CategoryListing, rusqlite::Error> {
    let category = map_row(row)?;
    let raw_type_name: String = row.get(3)?;

    Ok(CategoryListing {
        category,
        transaction_type_name: EntryName::new_unchecked(&raw_type_name),
    })
}
