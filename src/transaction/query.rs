//! Filtered, paginated listing of transactions joined with their reference
//! data.

use rusqlite::{Row, params_from_iter, types::Value};
use time::Date;

use crate::{
    Amount, CategoryId, EntryName, Error, StatusId, SubcategoryId, TransactionId,
    TransactionTypeId, db::contains_pattern, transaction::TransactionRepository,
};

/// Criteria for narrowing down the transaction list.
///
/// Every field is optional and the criteria that are set are combined with
/// AND. Both ends of the date range are inclusive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
    pub status_id: Option<StatusId>,
    pub transaction_type_id: Option<TransactionTypeId>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    /// Case-insensitive substring of the comment.
    pub comment: Option<String>,
}

impl TransactionFilter {
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        let mut push = |condition: &str, value: Value| {
            params.push(value);
            conditions.push(format!("{condition} ?{}", params.len()));
        };

        if let Some(date_from) = self.date_from {
            push("t.date >=", Value::Text(date_from.to_string()));
        }
        if let Some(date_to) = self.date_to {
            push("t.date <=", Value::Text(date_to.to_string()));
        }
        if let Some(status_id) = self.status_id {
            push("t.status_id =", Value::Integer(status_id.as_i64()));
        }
        if let Some(transaction_type_id) = self.transaction_type_id {
            push(
                "t.transaction_type_id =",
                Value::Integer(transaction_type_id.as_i64()),
            );
        }
        if let Some(category_id) = self.category_id {
            push("t.category_id =", Value::Integer(category_id.as_i64()));
        }
        if let Some(subcategory_id) = self.subcategory_id {
            push("t.subcategory_id =", Value::Integer(subcategory_id.as_i64()));
        }
        if let Some(comment) = self.comment.as_deref().filter(|text| !text.trim().is_empty()) {
            push("t.comment LIKE", Value::Text(contains_pattern(comment)));
            if let Some(last) = conditions.last_mut() {
                last.push_str(" ESCAPE '\\'");
            }
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// A transaction with the names of the entries it references, for display in
/// tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionListing {
    pub id: TransactionId,
    pub date: Date,
    pub status: EntryName,
    pub transaction_type: EntryName,
    pub category: EntryName,
    pub subcategory: EntryName,
    pub amount: Amount,
    pub comment: String,
}

const LISTING_QUERY: &str = "SELECT t.id, t.date, status.name, transaction_type.name, \
        category.name, subcategory.name, t.amount, t.comment
    FROM \"transaction\" AS t
    INNER JOIN status ON status.id = t.status_id
    INNER JOIN transaction_type ON transaction_type.id = t.transaction_type_id
    INNER JOIN category ON category.id = t.category_id
    INNER JOIN subcategory ON subcategory.id = t.subcategory_id";

impl TransactionRepository<'_> {
    /// Count the transactions that match `filter`.
    pub fn count_filtered(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let (where_clause, params) = filter.where_clause();

        self.connection
            .prepare(&format!(
                "SELECT COUNT(t.id) FROM \"transaction\" AS t {where_clause}"
            ))?
            .query_row(params_from_iter(params.iter()), |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as u64)
            .map_err(Error::from)
    }

    /// Get a page of the transactions that match `filter`, newest first.
    ///
    /// Transactions on the same day are ordered by when they were created,
    /// newest first.
    pub fn list_filtered(
        &self,
        filter: &TransactionFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<TransactionListing>, Error> {
        let (where_clause, mut params) = filter.where_clause();
        params.push(Value::Integer(limit as i64));
        let limit_index = params.len();
        params.push(Value::Integer(offset as i64));
        let offset_index = params.len();

        self.connection
            .prepare(&format!(
                "{LISTING_QUERY} {where_clause}
                ORDER BY t.date DESC, t.created_at DESC, t.id DESC
                LIMIT ?{limit_index} OFFSET ?{offset_index}"
            ))?
            .query_map(params_from_iter(params.iter()), map_listing_row)?
            .map(|maybe_listing| maybe_listing.map_err(Error::from))
            .collect()
    }

    /// Get a single transaction with the names of the entries it references.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to a transaction.
    pub fn get_listing(&self, id: TransactionId) -> Result<TransactionListing, Error> {
        self.connection
            .prepare(&format!("{LISTING_QUERY} WHERE t.id = ?1"))?
            .query_row((id,), map_listing_row)
            .map_err(Error::from)
    }
}

fn map_listing_row(row: &Row) -> Result<TransactionListing, rusqlite::Error> {
    let name = |index: usize| -> Result<EntryName, rusqlite::Error> {
        let raw_name: String = row.get(index)?;
        Ok(EntryName::new_unchecked(&raw_name))
    };

    Ok(TransactionListing {
        id: row.get(0)?,
        date: row.get(1)?,
        status: name(2)?,
        transaction_type: name(3)?,
        category: name(4)?,
        subcategory: name(5)?,
        amount: row.get(6)?,
        comment: row.get(7)?,
    })
}
