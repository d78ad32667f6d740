//! Queries shared by the dictionary tables that hold nothing but a unique name.

use rusqlite::{
    Connection, Row, ToSql,
    types::FromSql,
};

use crate::{
    Error,
    db::{Constraint, contains_pattern, violated_constraint},
    dictionary::{EntryKind, EntryName},
};

/// A row in a table with the columns `id` and `name`.
pub(super) trait NamedRecord: Sized {
    type Id: ToSql + FromSql + Copy;

    const TABLE: &'static str;
    const KIND: EntryKind;

    fn from_parts(id: Self::Id, name: EntryName) -> Self;
}

pub(super) fn create_table<R: NamedRecord>(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE CHECK (length(trim(name)) > 0)
        );",
        table = R::TABLE
    ))
}

pub(super) fn insert<R: NamedRecord>(name: EntryName, connection: &Connection) -> Result<R, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO {} (name) VALUES (?1) RETURNING id, name",
            R::TABLE
        ))?
        .query_row((name.as_ref(),), map_row::<R>)
        .map_err(|error| match violated_constraint(&error) {
            Some(Constraint::Unique) => Error::DuplicateName(R::KIND, name.to_string()),
            _ => error.into(),
        })
}

pub(super) fn get<R: NamedRecord>(id: R::Id, connection: &Connection) -> Result<R, Error> {
    connection
        .prepare(&format!("SELECT id, name FROM {} WHERE id = ?1", R::TABLE))?
        .query_row((id,), map_row::<R>)
        .map_err(Error::from)
}

pub(super) fn get_by_name<R: NamedRecord>(
    name: &EntryName,
    connection: &Connection,
) -> Result<Option<R>, Error> {
    match connection
        .prepare(&format!("SELECT id, name FROM {} WHERE name = ?1", R::TABLE))?
        .query_row((name.as_ref(),), map_row::<R>)
    {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Get every row whose name contains `query`, ordered by name.
///
/// An empty query matches every row.
pub(super) fn search<R: NamedRecord>(query: &str, connection: &Connection) -> Result<Vec<R>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, name FROM {} WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name ASC, id ASC",
            R::TABLE
        ))?
        .query_map((contains_pattern(query),), map_row::<R>)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

pub(super) fn update<R: NamedRecord>(
    id: R::Id,
    name: EntryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            &format!("UPDATE {} SET name = ?1 WHERE id = ?2", R::TABLE),
            (name.as_ref(), id),
        )
        .map_err(|error| match violated_constraint(&error) {
            Some(Constraint::Unique) => Error::DuplicateName(R::KIND, name.to_string()),
            _ => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(R::KIND));
    }

    Ok(())
}

pub(super) fn delete<R: NamedRecord>(id: R::Id, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE), (id,))
        .map_err(|error| match violated_constraint(&error) {
            Some(Constraint::ForeignKey) => Error::DeleteInUse(R::KIND),
            _ => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing(R::KIND));
    }

    Ok(())
}

pub(super) fn count<R: NamedRecord>(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(&format!("SELECT COUNT(id) FROM {}", R::TABLE), [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as u64)
        .map_err(Error::from)
}

fn map_row<R: NamedRecord>(row: &Row) -> Result<R, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(R::from_parts(id, EntryName::new_unchecked(&raw_name)))
}
