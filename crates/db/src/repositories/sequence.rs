//! Per-day document number allocation.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DbBackend, Statement};

use hivedrive_core::numbering::{DocumentPrefix, format_number};
use hivedrive_shared::{AppError, AppResult};

use crate::error::map_db_err;

const NEXT_VALUE_SQL: &str = r"
INSERT INTO document_sequences (prefix, seq_date, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (prefix, seq_date)
DO UPDATE SET last_value = document_sequences.last_value + 1
RETURNING last_value
";

/// Allocates the next number for `prefix` on `date`.
///
/// Runs on the caller's transaction, so a rolled back operation also gives
/// its number back.
pub(crate) async fn next_number<C: ConnectionTrait>(
    conn: &C,
    prefix: DocumentPrefix,
    date: NaiveDate,
) -> AppResult<String> {
    let statement = Statement::from_sql_and_values(
        DbBackend::Postgres,
        NEXT_VALUE_SQL,
        [prefix.as_str().into(), date.into()],
    );
    let row = conn
        .query_one(statement)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::Internal("sequence upsert returned no row".to_string()))?;
    let value: i32 = row.try_get("", "last_value").map_err(map_db_err)?;
    let value = u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("negative sequence value {value}")))?;

    Ok(format_number(prefix, date, value))
}
