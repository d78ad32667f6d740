//! Statuses, e.g. 'Business' or 'Personal', which tag every transaction.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, StatusId,
    dictionary::{
        EntryKind, EntryName,
        named::{self, NamedRecord},
    },
};

/// A status that transactions are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Status {
    pub id: StatusId,
    pub name: EntryName,
}

impl NamedRecord for Status {
    type Id = StatusId;

    const TABLE: &'static str = "status";
    const KIND: EntryKind = EntryKind::Status;

    fn from_parts(id: Self::Id, name: EntryName) -> Self {
        Self { id, name }
    }
}

/// Reads and writes statuses.
#[derive(Debug, Clone, Copy)]
pub struct StatusRepository<'a> {
    connection: &'a Connection,
}

impl<'a> StatusRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Create a status and return it with its generated ID.
    ///
    /// # Errors
    /// Returns an [Error::DuplicateName] if a status with the same name exists.
    pub fn create(&self, name: EntryName) -> Result<Status, Error> {
        named::insert(name, self.connection)
    }

    /// Retrieve a single status by ID.
    pub fn get(&self, id: StatusId) -> Result<Status, Error> {
        named::get(id, self.connection)
    }

    /// Retrieve all statuses ordered alphabetically by name.
    pub fn get_all(&self) -> Result<Vec<Status>, Error> {
        self.search("")
    }

    /// Get the status called `name`, creating it if it does not exist.
    ///
    /// The returned flag is `true` if the status was created.
    pub fn get_or_create(&self, name: EntryName) -> Result<(Status, bool), Error> {
        match named::get_by_name(&name, self.connection)? {
            Some(status) => Ok((status, false)),
            None => self.create(name).map(|status| (status, true)),
        }
    }

    /// Retrieve the statuses whose name contains `query`, ignoring ASCII case.
    pub fn search(&self, query: &str) -> Result<Vec<Status>, Error> {
        named::search(query, self.connection)
    }

    /// Rename a status.
    ///
    /// # Errors
    /// Returns an [Error::UpdateMissing] if the status does not exist, or an
    /// [Error::DuplicateName] if another status already has the name.
    pub fn update(&self, id: StatusId, name: EntryName) -> Result<(), Error> {
        named::update::<Status>(id, name, self.connection)
    }

    /// Delete a status.
    ///
    /// # Errors
    /// Returns an [Error::DeleteInUse] if any transaction has the status, or an
    /// [Error::DeleteMissing] if the status does not exist.
    pub fn delete(&self, id: StatusId) -> Result<(), Error> {
        named::delete::<Status>(id, self.connection)
    }

    pub fn count(&self) -> Result<u64, Error> {
        named::count::<Status>(self.connection)
    }
}

/// Initialize the status table.
pub fn create_status_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    named::create_table::<Status>(connection)
}

#[cfg(test)]
mod status_repository_tests {
    use rusqlite::Connection;

    use crate::{
        EntryKind, EntryName, Error, StatusId,
        db::initialize,
        dictionary::{Status, StatusRepository},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_status_succeeds() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);
        let name = EntryName::new_unchecked("Business");

        let status = repository.create(name.clone()).expect("Could not create status");

        assert!(status.id.as_i64() > 0);
        assert_eq!(status.name, name);
    }

    #[test]
    fn create_fails_on_duplicate_name() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);
        repository
            .create(EntryName::new_unchecked("Tax"))
            .expect("Could not create status");

        let result = repository.create(EntryName::new_unchecked("Tax"));

        assert_eq!(
            result,
            Err(Error::DuplicateName(EntryKind::Status, "Tax".to_owned()))
        );
    }

    #[test]
    fn get_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);

        assert_eq!(repository.get(StatusId::new(42)), Err(Error::NotFound));
    }

    #[test]
    fn get_all_orders_by_name() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);
        for name in ["Tax", "Business", "Personal"] {
            repository.create(EntryName::new_unchecked(name)).unwrap();
        }

        let names = repository
            .get_all()
            .unwrap()
            .into_iter()
            .map(|status| status.name.to_string())
            .collect::<Vec<_>>();

        assert_eq!(names, ["Business", "Personal", "Tax"]);
    }

    #[test]
    fn get_or_create_reuses_existing_status() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);

        let (first, first_created) = repository
            .get_or_create(EntryName::new_unchecked("Personal"))
            .unwrap();
        let (second, second_created) = repository
            .get_or_create(EntryName::new_unchecked("Personal"))
            .unwrap();

        assert!(first_created);
        assert!(!second_created);
        assert_eq!(first, second);
        assert_eq!(repository.count(), Ok(1));
    }

    #[test]
    fn search_ignores_case() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);
        let business = repository.create(EntryName::new_unchecked("Business")).unwrap();
        repository.create(EntryName::new_unchecked("Tax")).unwrap();

        let got = repository.search("SIN").unwrap();

        assert_eq!(got, vec![business]);
    }

    #[test]
    fn update_renames_status() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);
        let status = repository.create(EntryName::new_unchecked("Personl")).unwrap();

        repository
            .update(status.id, EntryName::new_unchecked("Personal"))
            .unwrap();

        assert_eq!(
            repository.get(status.id),
            Ok(Status {
                id: status.id,
                name: EntryName::new_unchecked("Personal")
            })
        );
    }

    #[test]
    fn update_with_invalid_id_returns_update_missing() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);

        let result = repository.update(StatusId::new(999), EntryName::new_unchecked("Foo"));

        assert_eq!(result, Err(Error::UpdateMissing(EntryKind::Status)));
    }

    #[test]
    fn delete_with_invalid_id_returns_delete_missing() {
        let connection = get_test_connection();
        let repository = StatusRepository::new(&connection);

        let result = repository.delete(StatusId::new(999));

        assert_eq!(result, Err(Error::DeleteMissing(EntryKind::Status)));
    }
}
