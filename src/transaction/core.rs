//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Amount, CategoryId, EntryKind, Error, StatusId, SubcategoryId, TransactionId,
    TransactionTypeId,
    dictionary::{
        CategoryRepository, StatusRepository, SubcategoryRepository, TransactionTypeRepository,
    },
};

// ============================================================================
// MODELS
// ============================================================================

/// An income or expense recorded in the ledger.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    pub status_id: StatusId,
    pub transaction_type_id: TransactionTypeId,
    /// Must belong to `transaction_type_id`.
    pub category_id: CategoryId,
    /// Must belong to `category_id`.
    pub subcategory_id: SubcategoryId,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// A free text note, may be empty.
    pub comment: String,
    /// When the transaction was first saved, in UTC.
    pub created_at: OffsetDateTime,
    /// When the transaction was last saved, in UTC.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        date: Date,
        status_id: StatusId,
        transaction_type_id: TransactionTypeId,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        amount: Amount,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            status_id,
            transaction_type_id,
            category_id,
            subcategory_id,
            amount,
            comment: String::new(),
        }
    }
}

/// The fields of a [Transaction] that are chosen by the user.
///
/// Pass the builder to [TransactionRepository::create] or
/// [TransactionRepository::update].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TransactionBuilder {
    pub date: Date,
    pub status_id: StatusId,
    pub transaction_type_id: TransactionTypeId,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub amount: Amount,
    /// Defaults to an empty string.
    pub comment: String,
}

impl TransactionBuilder {
    /// Set the comment for the transaction.
    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, date, status_id, transaction_type_id, category_id, \
    subcategory_id, amount, comment, created_at, updated_at";

/// Reads and writes transactions.
#[derive(Debug, Clone, Copy)]
pub struct TransactionRepository<'a> {
    pub(super) connection: &'a Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Create a new transaction in the database from a builder.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidReference] if one of the IDs does not refer to an existing entry,
    /// - [Error::CategoryTypeMismatch] if the category belongs to another transaction type,
    /// - [Error::SubcategoryCategoryMismatch] if the subcategory belongs to another category,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        self.check_taxonomy(&builder)?;
        let now = OffsetDateTime::now_utc();

        self.connection
            .prepare(&format!(
                "INSERT INTO \"transaction\"
                    (date, status_id, transaction_type_id, category_id, subcategory_id, amount,
                    comment, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    builder.date,
                    builder.status_id,
                    builder.transaction_type_id,
                    builder.category_id,
                    builder.subcategory_id,
                    builder.amount,
                    builder.comment,
                    now,
                ),
                map_transaction_row,
            )
            .map_err(Error::from)
    }

    /// Retrieve a transaction by its ID.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a transaction.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1"
            ))?
            .query_row((id,), map_transaction_row)
            .map_err(Error::from)
    }

    /// Overwrite the user editable fields of a transaction and bump its
    /// `updated_at` time.
    ///
    /// # Errors
    /// Returns an [Error::UpdateMissing] if the transaction does not exist, or
    /// the same errors as [TransactionRepository::create] for invalid fields.
    pub fn update(
        &self,
        id: TransactionId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        self.check_taxonomy(&builder)?;

        self.connection
            .prepare(&format!(
                "UPDATE \"transaction\"
                SET date = ?1, status_id = ?2, transaction_type_id = ?3, category_id = ?4,
                    subcategory_id = ?5, amount = ?6, comment = ?7, updated_at = ?8
                WHERE id = ?9
                RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    builder.date,
                    builder.status_id,
                    builder.transaction_type_id,
                    builder.category_id,
                    builder.subcategory_id,
                    builder.amount,
                    builder.comment,
                    OffsetDateTime::now_utc(),
                    id,
                ),
                map_transaction_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::UpdateMissing(EntryKind::Transaction)
                }
                error => error.into(),
            })
    }

    /// Delete a transaction.
    ///
    /// # Errors
    /// Returns an [Error::DeleteMissing] if the transaction does not exist.
    pub fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissing(EntryKind::Transaction));
        }

        Ok(())
    }

    /// Count all transactions.
    pub fn count(&self) -> Result<u64, Error> {
        self.connection
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as u64)
            .map_err(Error::from)
    }

    /// Check that every ID in `builder` exists and that the category and
    /// subcategory agree with the transaction type.
    fn check_taxonomy(&self, builder: &TransactionBuilder) -> Result<(), Error> {
        StatusRepository::new(self.connection)
            .get(builder.status_id)
            .map_err(missing_as(EntryKind::Status))?;
        TransactionTypeRepository::new(self.connection)
            .get(builder.transaction_type_id)
            .map_err(missing_as(EntryKind::TransactionType))?;
        let category = CategoryRepository::new(self.connection)
            .get(builder.category_id)
            .map_err(missing_as(EntryKind::Category))?;
        let subcategory = SubcategoryRepository::new(self.connection)
            .get(builder.subcategory_id)
            .map_err(missing_as(EntryKind::Subcategory))?;

        if category.transaction_type_id != builder.transaction_type_id {
            return Err(Error::CategoryTypeMismatch);
        }

        if subcategory.category_id != builder.category_id {
            return Err(Error::SubcategoryCategoryMismatch);
        }

        Ok(())
    }
}

/// Treat a missing entry of `kind` as an invalid reference.
fn missing_as(kind: EntryKind) -> impl Fn(Error) -> Error {
    move |error| match error {
        Error::NotFound => Error::InvalidReference(kind),
        error => error,
    }
}

/// Create the transaction table.
///
/// The composite foreign keys make the database itself reject a category
/// from another transaction type or a subcategory from another category.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            status_id INTEGER NOT NULL REFERENCES status(id),
            transaction_type_id INTEGER NOT NULL
                REFERENCES transaction_type(id),
            category_id INTEGER NOT NULL,
            subcategory_id INTEGER NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 1),
            comment TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (category_id, transaction_type_id)
                REFERENCES category(id, transaction_type_id),
            FOREIGN KEY (subcategory_id, category_id)
                REFERENCES subcategory(id, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date
            ON \"transaction\"(date DESC, created_at DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_transaction_status ON \"transaction\"(status_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_type_category
            ON \"transaction\"(category_id, transaction_type_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_subcategory
            ON \"transaction\"(subcategory_id, category_id);",
    )
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        status_id: row.get(2)?,
        transaction_type_id: row.get(3)?,
        category_id: row.get(4)?,
        subcategory_id: row.get(5)?,
        amount: row.get(6)?,
        comment: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_fixture {
    use rusqlite::Connection;
    use time::Date;

    use crate::{
        Amount, EntryName,
        db::initialize,
        dictionary::{
            Category, CategoryRepository, Status, StatusRepository, Subcategory,
            SubcategoryRepository, TransactionType, TransactionTypeRepository,
        },
        transaction::{Transaction, TransactionBuilder},
    };

    /// A small taxonomy with one income and one expense branch.
    pub(crate) struct Taxonomy {
        pub personal: Status,
        pub business: Status,
        pub income: TransactionType,
        pub expense: TransactionType,
        pub salary: Category,
        pub marketing: Category,
        pub main_job: Subcategory,
        pub side_job: Subcategory,
        pub avito: Subcategory,
    }

    pub(crate) fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    pub(crate) fn create_taxonomy(connection: &Connection) -> Taxonomy {
        let statuses = StatusRepository::new(connection);
        let types = TransactionTypeRepository::new(connection);
        let categories = CategoryRepository::new(connection);
        let subcategories = SubcategoryRepository::new(connection);
        let name = EntryName::new_unchecked;

        let personal = statuses.create(name("Personal")).unwrap();
        let business = statuses.create(name("Business")).unwrap();
        let income = types.create(name("Income")).unwrap();
        let expense = types.create(name("Expense")).unwrap();
        let salary = categories.create(name("Salary"), income.id).unwrap();
        let marketing = categories.create(name("Marketing"), expense.id).unwrap();
        let main_job = subcategories.create(name("Main job"), salary.id).unwrap();
        let side_job = subcategories.create(name("Side job"), salary.id).unwrap();
        let avito = subcategories.create(name("Avito"), marketing.id).unwrap();

        Taxonomy {
            personal,
            business,
            income,
            expense,
            salary,
            marketing,
            main_job,
            side_job,
            avito,
        }
    }

    impl Taxonomy {
        /// A personal income from the main job.
        pub(crate) fn income_on(&self, date: Date, amount: &str) -> TransactionBuilder {
            Transaction::build(
                date,
                self.personal.id,
                self.income.id,
                self.salary.id,
                self.main_job.id,
                amount.parse::<Amount>().unwrap(),
            )
        }

        /// A business expense on Avito.
        pub(crate) fn expense_on(&self, date: Date, amount: &str) -> TransactionBuilder {
            Transaction::build(
                date,
                self.business.id,
                self.expense.id,
                self.marketing.id,
                self.avito.id,
                amount.parse::<Amount>().unwrap(),
            )
        }
    }
}
