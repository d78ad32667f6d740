//! Transaction types, i.e. 'Income' and 'Expense', the top level of the
//! taxonomy.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, TransactionTypeId,
    dictionary::{
        EntryKind, EntryName,
        named::{self, NamedRecord},
    },
};

/// The top level of the taxonomy, owns many categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct TransactionType {
    pub id: TransactionTypeId,
    pub name: EntryName,
}

impl NamedRecord for TransactionType {
    type Id = TransactionTypeId;

    const TABLE: &'static str = "transaction_type";
    const KIND: EntryKind = EntryKind::TransactionType;

    fn from_parts(id: Self::Id, name: EntryName) -> Self {
        Self { id, name }
    }
}

/// Reads and writes transaction types.
#[derive(Debug, Clone, Copy)]
pub struct TransactionTypeRepository<'a> {
    connection: &'a Connection,
}

impl<'a> TransactionTypeRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub fn create(&self, name: EntryName) -> Result<TransactionType, Error> {
        named::insert(name, self.connection)
    }

    pub fn get(&self, id: TransactionTypeId) -> Result<TransactionType, Error> {
        named::get(id, self.connection)
    }

    /// Retrieve all transaction types ordered alphabetically by name.
    pub fn get_all(&self) -> Result<Vec<TransactionType>, Error> {
        self.search("")
    }

    /// Get the transaction type called `name`, creating it if it does not
    /// exist. The returned flag is `true` if it was created.
    pub fn get_or_create(&self, name: EntryName) -> Result<(TransactionType, bool), Error> {
        match named::get_by_name(&name, self.connection)? {
            Some(transaction_type) => Ok((transaction_type, false)),
            None => self
                .create(name)
                .map(|transaction_type| (transaction_type, true)),
        }
    }

    pub fn search(&self, query: &str) -> Result<Vec<TransactionType>, Error> {
        named::search(query, self.connection)
    }

    pub fn update(&self, id: TransactionTypeId, name: EntryName) -> Result<(), Error> {
        named::update::<TransactionType>(id, name, self.connection)
    }

    /// Delete a transaction type along with its categories and their
    /// subcategories.
    ///
    /// # Errors
    /// Returns an [Error::DeleteInUse] if any transaction has the type or one
    /// of its categories, or an [Error::DeleteMissing] if the type does not
    /// exist.
    pub fn delete(&self, id: TransactionTypeId) -> Result<(), Error> {
        named::delete::<TransactionType>(id, self.connection)
    }

    pub fn count(&self) -> Result<u64, Error> {
        named::count::<TransactionType>(self.connection)
    }
}

/// Initialize the transaction type table.
pub fn create_transaction_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    named::create_table::<TransactionType>(connection)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        EntryKind, EntryName, Error,
        db::initialize,
        dictionary::{CategoryRepository, TransactionTypeRepository},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn rename_keeps_id() {
        let connection = get_test_connection();
        let repository = TransactionTypeRepository::new(&connection);
        let income = repository.create(EntryName::new_unchecked("Incme")).unwrap();

        repository
            .update(income.id, EntryName::new_unchecked("Income"))
            .unwrap();

        let got = repository.get(income.id).unwrap();
        assert_eq!(got.name.as_ref(), "Income");
    }

    #[test]
    fn rename_fails_on_duplicate_name() {
        let connection = get_test_connection();
        let repository = TransactionTypeRepository::new(&connection);
        repository.create(EntryName::new_unchecked("Income")).unwrap();
        let expense = repository.create(EntryName::new_unchecked("Expense")).unwrap();

        let result = repository.update(expense.id, EntryName::new_unchecked("Income"));

        assert_eq!(
            result,
            Err(Error::DuplicateName(
                EntryKind::TransactionType,
                "Income".to_owned()
            ))
        );
    }

    #[test]
    fn delete_unused_type_removes_its_categories() {
        let connection = get_test_connection();
        let repository = TransactionTypeRepository::new(&connection);
        let categories = CategoryRepository::new(&connection);
        let expense = repository.create(EntryName::new_unchecked("Expense")).unwrap();
        categories
            .create(EntryName::new_unchecked("Marketing"), expense.id)
            .unwrap();

        repository.delete(expense.id).expect("Could not delete type");

        assert_eq!(repository.count(), Ok(0));
        assert_eq!(categories.count(), Ok(0));
    }
}
