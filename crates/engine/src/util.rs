//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! mapping logic between stored rows and domain types.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Stored data the engine cannot interpret. Reported as an internal failure,
/// never as a client error.
pub(crate) fn corrupt_row(message: impl Into<String>) -> EngineError {
    EngineError::Database(DbErr::Custom(message.into()))
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| corrupt_row(format!("stored {label} id is not a uuid: {value}")))
}

/// Parse an optional stored UUID.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Re-labels a parse failure on a stored column as corrupt data.
pub(crate) fn stored<T>(parsed: ResultEngine<T>, column: &str) -> ResultEngine<T> {
    parsed.map_err(|err| match err {
        EngineError::InvalidInput(message) => corrupt_row(format!("stored {column}: {message}")),
        other => other,
    })
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    stored(Currency::try_from(value), "currency")
}

/// First day of the month containing `day`.
pub(crate) fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// First day of the current month through today (UTC).
pub(crate) fn current_month_to_date() -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    (month_start(today), today)
}

/// `part * 100 / whole`, truncated to two decimals. Zero when `whole <= 0`.
pub(crate) fn percent_of(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    let basis_points = (i128::from(part) * 10_000) / i128::from(whole);
    basis_points as f64 / 100.0
}

/// Reject `start > end` date ranges.
pub(crate) fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidInput(format!(
            "invalid range: {start} is after {end}"
        )));
    }
    Ok(())
}
