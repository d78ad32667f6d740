//! The validated monetary amount of a transaction.

use std::{fmt::Display, str::FromStr, sync::OnceLock};

use numfmt::{Formatter, Precision};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Error;

/// A positive amount of money with at most two decimal places.
///
/// Amounts are stored in the database as whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    /// The number of digits allowed after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;

    /// The total number of digits allowed, including the decimal places.
    pub const MAX_DIGITS: u32 = 12;

    /// Create an amount.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::AmountTooSmall] if `value` is less than 0.01,
    /// - [Error::AmountTooPrecise] if `value` has more than two decimal places,
    /// - [Error::AmountTooLarge] if `value` has more than 12 digits.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let value = value.normalize();

        if value < Decimal::new(1, Self::DECIMAL_PLACES) {
            return Err(Error::AmountTooSmall);
        }

        if value.scale() > Self::DECIMAL_PLACES {
            return Err(Error::AmountTooPrecise);
        }

        let limit = Decimal::from(10_i64.pow(Self::MAX_DIGITS - Self::DECIMAL_PLACES));
        if value >= limit {
            return Err(Error::AmountTooLarge);
        }

        Ok(Self(value))
    }

    /// Create an amount from a number of cents.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [Amount::new].
    pub fn from_cents(cents: i64) -> Result<Self, Error> {
        Self::new(Decimal::new(cents, Self::DECIMAL_PLACES))
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The amount in whole cents.
    pub fn cents(&self) -> i64 {
        let mut scaled = self.0;
        scaled.rescale(Self::DECIMAL_PLACES);

        // Safe to narrow, the digit limit keeps the mantissa far below i64::MAX.
        scaled.mantissa() as i64
    }

    /// Format the amount with thousands separators and two decimal places,
    /// e.g. "12,345.60".
    pub fn to_grouped_string(&self) -> String {
        let cents = self.cents();
        let whole = cents / 100;
        let fraction = cents % 100;

        format!("{}.{fraction:02}", thousands_separator_formatter().fmt_string(whole))
    }
}

fn thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .expect("',' is a valid separator")
            .precision(Precision::Decimals(0))
    })
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| Error::InvalidAmount(s.trim().to_owned()))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let cents = i64::column_result(value)?;

        Ok(Amount(Decimal::new(cents, Amount::DECIMAL_PLACES).normalize()))
    }
}
