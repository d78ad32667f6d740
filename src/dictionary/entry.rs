//! Types shared by all dictionary entries.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The kinds of record stored in the ledger, used to build user facing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A [crate::dictionary::Status].
    Status,
    /// A [crate::dictionary::TransactionType].
    TransactionType,
    /// A [crate::dictionary::Category].
    Category,
    /// A [crate::dictionary::Subcategory].
    Subcategory,
    /// A [crate::transaction::Transaction].
    Transaction,
}

impl EntryKind {
    /// The capitalised singular name, e.g. "Transaction type".
    pub fn title(&self) -> &'static str {
        match self {
            EntryKind::Status => "Status",
            EntryKind::TransactionType => "Transaction type",
            EntryKind::Category => "Category",
            EntryKind::Subcategory => "Subcategory",
            EntryKind::Transaction => "Transaction",
        }
    }

    /// The capitalised plural name, e.g. "Categories".
    pub fn plural_title(&self) -> &'static str {
        match self {
            EntryKind::Status => "Statuses",
            EntryKind::TransactionType => "Transaction types",
            EntryKind::Category => "Categories",
            EntryKind::Subcategory => "Subcategories",
            EntryKind::Transaction => "Transactions",
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntryKind::Status => "status",
            EntryKind::TransactionType => "transaction type",
            EntryKind::Category => "category",
            EntryKind::Subcategory => "subcategory",
            EntryKind::Transaction => "transaction",
        };

        f.write_str(name)
    }
}

/// A validated, non-empty name for a dictionary entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct EntryName(String);

impl EntryName {
    /// The maximum number of characters in a name.
    pub const MAX_LENGTH: usize = 100;

    /// Create an entry name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or
    /// only whitespace, or an [Error::NameTooLong] if it has more than
    /// [EntryName::MAX_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else if name.chars().count() > Self::MAX_LENGTH {
            Err(Error::NameTooLong)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create an entry name without validation.
    ///
    /// The caller should ensure that the string is not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryName::new(s)
    }
}

impl Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod entry_name_tests {
    use crate::{EntryName, Error};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(EntryName::new(""), Err(Error::EmptyName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(EntryName::new("\n\t \r"), Err(Error::EmptyName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = EntryName::new("  Marketing ").unwrap();

        assert_eq!(name.as_ref(), "Marketing");
    }

    #[test]
    fn new_counts_characters_not_bytes() {
        let at_limit = "é".repeat(EntryName::MAX_LENGTH);
        let over_limit = "a".repeat(EntryName::MAX_LENGTH + 1);

        assert!(EntryName::new(&at_limit).is_ok());
        assert_eq!(EntryName::new(&over_limit), Err(Error::NameTooLong));
    }
}
