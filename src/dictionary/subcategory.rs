//! Subcategories, the leaves of the taxonomy.

use std::fmt::Display;

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use serde::Serialize;

use crate::{
    CategoryId, Error, SubcategoryId, TransactionTypeId,
    db::{Constraint, contains_pattern, violated_constraint},
    dictionary::{CategoryRepository, EntryKind, EntryName},
};

/// A subcategory, e.g. 'VPS' under 'Infrastructure'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: EntryName,
    pub category_id: CategoryId,
}

/// A subcategory along with its category and transaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryListing {
    pub subcategory: Subcategory,
    pub category_name: EntryName,
    pub transaction_type_id: TransactionTypeId,
    pub transaction_type_name: EntryName,
}

impl Display for SubcategoryListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.subcategory.name, self.category_name)
    }
}

/// Optional criteria for [SubcategoryRepository::search].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubcategoryScope {
    pub transaction_type_id: Option<TransactionTypeId>,
    pub category_id: Option<CategoryId>,
}

const LISTING_QUERY: &str = "SELECT subcategory.id, subcategory.name, subcategory.category_id, \
        category.name, category.transaction_type_id, transaction_type.name
    FROM subcategory
    INNER JOIN category ON category.id = subcategory.category_id
    INNER JOIN transaction_type ON transaction_type.id = category.transaction_type_id";

/// Reads and writes subcategories.
#[derive(Debug, Clone, Copy)]
pub struct SubcategoryRepository<'a> {
    connection: &'a Connection,
}

impl<'a> SubcategoryRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Create a subcategory under `category_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateName] if the category already has a subcategory with the same name,
    /// - [Error::InvalidReference] if `category_id` does not refer to a category,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn create(&self, name: EntryName, category_id: CategoryId) -> Result<Subcategory, Error> {
        self.connection
            .prepare(
                "INSERT INTO subcategory (name, category_id) VALUES (?1, ?2)
                RETURNING id, name, category_id",
            )?
            .query_row((name.as_ref(), category_id), map_row)
            .map_err(|error| match violated_constraint(&error) {
                Some(Constraint::Unique) => {
                    Error::DuplicateName(EntryKind::Subcategory, name.to_string())
                }
                Some(Constraint::ForeignKey) => Error::InvalidReference(EntryKind::Category),
                _ => error.into(),
            })
    }

    pub fn get(&self, id: SubcategoryId) -> Result<Subcategory, Error> {
        self.connection
            .prepare("SELECT id, name, category_id FROM subcategory WHERE id = ?1")?
            .query_row((id,), map_row)
            .map_err(Error::from)
    }

    /// Retrieve every subcategory with its parents, ordered by name.
    pub fn get_all(&self) -> Result<Vec<SubcategoryListing>, Error> {
        self.search("", SubcategoryScope::default())
    }

    /// Retrieve the subcategories of `category_id` ordered by name.
    ///
    /// An ID that does not refer to a category gives an empty list.
    pub fn for_category(&self, category_id: CategoryId) -> Result<Vec<Subcategory>, Error> {
        self.connection
            .prepare(
                "SELECT id, name, category_id FROM subcategory
                WHERE category_id = ?1
                ORDER BY name ASC, id ASC",
            )?
            .query_map((category_id,), map_row)?
            .map(|maybe_subcategory| maybe_subcategory.map_err(Error::from))
            .collect()
    }

    /// Get the subcategory called `name` under `category_id`, creating it if
    /// it does not exist. The returned flag is `true` if it was created.
    pub fn get_or_create(
        &self,
        name: EntryName,
        category_id: CategoryId,
    ) -> Result<(Subcategory, bool), Error> {
        let existing = self
            .connection
            .prepare(
                "SELECT id, name, category_id FROM subcategory
                WHERE name = ?1 AND category_id = ?2",
            )?
            .query_row((name.as_ref(), category_id), map_row);

        match existing {
            Ok(subcategory) => Ok((subcategory, false)),
            Err(rusqlite::Error::QueryReturnedNoRows) => self
                .create(name, category_id)
                .map(|subcategory| (subcategory, true)),
            Err(error) => Err(error.into()),
        }
    }

    /// Retrieve the subcategories whose name contains `query` within `scope`.
    pub fn search(
        &self,
        query: &str,
        scope: SubcategoryScope,
    ) -> Result<Vec<SubcategoryListing>, Error> {
        let mut sql = format!("{LISTING_QUERY} WHERE subcategory.name LIKE ?1 ESCAPE '\\'");
        let mut params = vec![Value::Text(contains_pattern(query))];

        if let Some(transaction_type_id) = scope.transaction_type_id {
            params.push(Value::Integer(transaction_type_id.as_i64()));
            sql.push_str(&format!(
                " AND category.transaction_type_id = ?{}",
                params.len()
            ));
        }

        if let Some(category_id) = scope.category_id {
            params.push(Value::Integer(category_id.as_i64()));
            sql.push_str(&format!(" AND subcategory.category_id = ?{}", params.len()));
        }

        sql.push_str(" ORDER BY subcategory.name ASC, category.name ASC, subcategory.id ASC");

        self.connection
            .prepare(&sql)?
            .query_map(params_from_iter(params.iter()), map_listing_row)?
            .map(|maybe_listing| maybe_listing.map_err(Error::from))
            .collect()
    }

    /// Rename a subcategory and/or move it to another category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissing] if the subcategory does not exist,
    /// - [Error::InvalidReference] if `category_id` does not refer to a category,
    /// - [Error::MoveInUse] if the category changes while transactions use the subcategory,
    /// - [Error::DuplicateName] if the category already has a subcategory with the name.
    pub fn update(
        &self,
        id: SubcategoryId,
        name: EntryName,
        category_id: CategoryId,
    ) -> Result<(), Error> {
        let current = match self.get(id) {
            Ok(subcategory) => subcategory,
            Err(Error::NotFound) => return Err(Error::UpdateMissing(EntryKind::Subcategory)),
            Err(error) => return Err(error),
        };

        let result = if current.category_id == category_id {
            self.connection.execute(
                "UPDATE subcategory SET name = ?1 WHERE id = ?2",
                (name.as_ref(), id),
            )
        } else {
            match CategoryRepository::new(self.connection).get(category_id) {
                Ok(_) => {}
                Err(Error::NotFound) => return Err(Error::InvalidReference(EntryKind::Category)),
                Err(error) => return Err(error),
            }

            self.connection.execute(
                "UPDATE subcategory SET name = ?1, category_id = ?2 WHERE id = ?3",
                (name.as_ref(), category_id, id),
            )
        };

        result.map_err(|error| match violated_constraint(&error) {
            Some(Constraint::Unique) => {
                Error::DuplicateName(EntryKind::Subcategory, name.to_string())
            }
            Some(Constraint::ForeignKey) => Error::MoveInUse(EntryKind::Subcategory),
            _ => error.into(),
        })?;

        Ok(())
    }

    /// Delete a subcategory.
    ///
    /// # Errors
    /// Returns an [Error::DeleteInUse] if any transaction uses the subcategory,
    /// or an [Error::DeleteMissing] if it does not exist.
    pub fn delete(&self, id: SubcategoryId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .execute("DELETE FROM subcategory WHERE id = ?1", (id,))
            .map_err(|error| match violated_constraint(&error) {
                Some(Constraint::ForeignKey) => Error::DeleteInUse(EntryKind::Subcategory),
                _ => error.into(),
            })?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissing(EntryKind::Subcategory));
        }

        Ok(())
    }

    pub fn count(&self) -> Result<u64, Error> {
        self.connection
            .query_row("SELECT COUNT(id) FROM subcategory", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as u64)
            .map_err(Error::from)
    }
}

/// Initialize the subcategory table.
pub fn create_subcategory_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
            UNIQUE (name, category_id),
            UNIQUE (id, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_subcategory_category ON subcategory(category_id);",
    )
}

fn map_row(row: &Row) -> Result<Subcategory, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let category_id = row.get(2)?;

    Ok(Subcategory {
        id,
        name: EntryName::new_unchecked(&raw_name),
        category_id,
    })
}

fn map_listing_row(row: &Row) -> Result<SubcategoryListing, rusqlite::Error> {
    let subcategory = map_row(row)?;
    let raw_category_name: String = row.get(3)?;
    let transaction_type_id = row.get(4)?;
    let raw_type_name: String = row.get(5)?;

    Ok(SubcategoryListing {
        subcategory,
        category_name: EntryName::new_unchecked(&raw_category_name),
        transaction_type_id,
        transaction_type_name: EntryName::new_unchecked(&raw_type_name),
    })
}

#[cfg(test)]
mod subcategory_repository_tests {
    use rusqlite::Connection;

    use crate::{
        CategoryId, EntryKind, EntryName, Error, SubcategoryId,
        db::initialize,
        dictionary::{
            Category, CategoryRepository, SubcategoryRepository, SubcategoryScope,
            TransactionTypeRepository,
        },
    };

    struct Fixture {
        connection: Connection,
        salary: Category,
        marketing: Category,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let types = TransactionTypeRepository::new(&connection);
        let income = types.create(EntryName::new_unchecked("Income")).unwrap();
        let expense = types.create(EntryName::new_unchecked("Expense")).unwrap();
        let categories = CategoryRepository::new(&connection);
        let salary = categories
            .create(EntryName::new_unchecked("Salary"), income.id)
            .unwrap();
        let marketing = categories
            .create(EntryName::new_unchecked("Marketing"), expense.id)
            .unwrap();

        Fixture {
            connection,
            salary,
            marketing,
        }
    }

    #[test]
    fn create_subcategory_succeeds() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);

        let subcategory = repository
            .create(EntryName::new_unchecked("Avito"), fixture.marketing.id)
            .unwrap();

        assert_eq!(repository.get(subcategory.id), Ok(subcategory));
    }

    #[test]
    fn create_fails_on_duplicate_name_within_category() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);
        repository
            .create(EntryName::new_unchecked("Avito"), fixture.marketing.id)
            .unwrap();

        let result = repository.create(EntryName::new_unchecked("Avito"), fixture.marketing.id);

        assert_eq!(
            result,
            Err(Error::DuplicateName(
                EntryKind::Subcategory,
                "Avito".to_owned()
            ))
        );
    }

    #[test]
    fn create_fails_on_unknown_category() {
        let fixture = get_fixture();

        let result = SubcategoryRepository::new(&fixture.connection)
            .create(EntryName::new_unchecked("Avito"), CategoryId::new(404));

        assert_eq!(result, Err(Error::InvalidReference(EntryKind::Category)));
    }

    #[test]
    fn for_category_is_sorted_and_scoped() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);
        let farpost = repository
            .create(EntryName::new_unchecked("Farpost"), fixture.marketing.id)
            .unwrap();
        let avito = repository
            .create(EntryName::new_unchecked("Avito"), fixture.marketing.id)
            .unwrap();
        repository
            .create(EntryName::new_unchecked("Main job"), fixture.salary.id)
            .unwrap();

        let got = repository.for_category(fixture.marketing.id).unwrap();

        assert_eq!(got, vec![avito, farpost]);
    }

    #[test]
    fn search_by_transaction_type() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);
        repository
            .create(EntryName::new_unchecked("Avito"), fixture.marketing.id)
            .unwrap();
        let main_job = repository
            .create(EntryName::new_unchecked("Main job"), fixture.salary.id)
            .unwrap();

        let got = repository
            .search(
                "",
                SubcategoryScope {
                    transaction_type_id: Some(fixture.salary.transaction_type_id),
                    category_id: None,
                },
            )
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].subcategory, main_job);
        assert_eq!(got[0].category_name.as_ref(), "Salary");
        assert_eq!(got[0].transaction_type_name.as_ref(), "Income");
        assert_eq!(got[0].to_string(), "Main job (Salary)");
    }

    #[test]
    fn move_unused_subcategory() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);
        let misc = repository
            .create(EntryName::new_unchecked("Misc"), fixture.salary.id)
            .unwrap();

        repository
            .update(misc.id, misc.name.clone(), fixture.marketing.id)
            .unwrap();

        assert_eq!(
            repository.get(misc.id).unwrap().category_id,
            fixture.marketing.id
        );
    }

    #[test]
    fn update_missing_subcategory_fails() {
        let fixture = get_fixture();

        let result = SubcategoryRepository::new(&fixture.connection).update(
            SubcategoryId::new(12),
            EntryName::new_unchecked("Foo"),
            fixture.salary.id,
        );

        assert_eq!(result, Err(Error::UpdateMissing(EntryKind::Subcategory)));
    }

    #[test]
    fn deleting_category_removes_its_subcategories() {
        let fixture = get_fixture();
        let repository = SubcategoryRepository::new(&fixture.connection);
        repository
            .create(EntryName::new_unchecked("Avito"), fixture.marketing.id)
            .unwrap();

        CategoryRepository::new(&fixture.connection)
            .delete(fixture.marketing.id)
            .unwrap();

        assert_eq!(repository.count(), Ok(0));
    }
}
