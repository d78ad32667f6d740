//! Typed identifiers for the rows in each table.
//!
//! Each table gets its own ID type so that, for example, a category ID cannot
//! be passed where a subcategory ID is expected.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

macro_rules! database_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database ID.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw database ID.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

database_id!(
    /// Identifies a [crate::dictionary::Status].
    StatusId
);
database_id!(
    /// Identifies a [crate::dictionary::TransactionType].
    TransactionTypeId
);
database_id!(
    /// Identifies a [crate::dictionary::Category].
    CategoryId
);
database_id!(
    /// Identifies a [crate::dictionary::Subcategory].
    SubcategoryId
);
database_id!(
    /// Identifies a [crate::transaction::Transaction].
    TransactionId
);

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{CategoryId, TransactionId};

    #[test]
    fn parses_surrounding_whitespace() {
        assert_eq!(" 42 ".parse::<CategoryId>(), Ok(CategoryId::new(42)));
    }

    #[test]
    fn rejects_non_integer() {
        assert!("4x".parse::<CategoryId>().is_err());
        assert!("".parse::<CategoryId>().is_err());
        assert!("1.5".parse::<CategoryId>().is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&TransactionId::new(7)).unwrap();

        assert_eq!(json, "7");
    }

    #[test]
    fn reads_and_writes_sqlite_integers() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch("CREATE TABLE thing (id INTEGER PRIMARY KEY);")
            .unwrap();

        connection
            .execute("INSERT INTO thing (id) VALUES (?1)", (CategoryId::new(3),))
            .unwrap();
        let got: CategoryId = connection
            .query_row("SELECT id FROM thing", [], |row| row.get(0))
            .unwrap();

        assert_eq!(got, CategoryId::new(3));
    }
}
