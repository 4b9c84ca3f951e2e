//! Mapping of database failures onto the shared error taxonomy.

use std::future::Future;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use sea_orm::sqlx;

use hivedrive_shared::{AppError, AppResult};

/// Converts a `SeaORM` error.
///
/// Connection-class failures become `BackendUnavailable` (retryable),
/// unique violations become `Conflict`, anything else is `Internal`.
pub fn map_db_err(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return AppError::Conflict(detail);
    }

    match err {
        DbErr::ConnectionAcquire(e) => AppError::BackendUnavailable(e.to_string()),
        DbErr::Conn(e) => AppError::BackendUnavailable(e.to_string()),
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))
            if is_connection_error(&e) =>
        {
            AppError::BackendUnavailable(e.to_string())
        }
        other => {
            tracing::error!(error = %other, "database error");
            AppError::Internal(other.to_string())
        }
    }
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Runs an idempotent read, retrying once when the backend was unavailable.
///
/// Writes must not go through this.
pub async fn retry_read<T, F, Fut>(mut read: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match read().await {
        Err(err) if err.is_retryable() => {
            tracing::warn!(error = %err, "read failed, retrying once");
            read().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_record_not_found_is_internal() {
        let err = map_db_err(DbErr::RecordNotFound("quotations".to_string()));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_custom_error_is_not_retryable() {
        let err = map_db_err(DbErr::Custom("boom".to_string()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_retry_read_retries_once() {
        let calls = &AtomicU32::new(0);
        let result: AppResult<u32> = retry_read(|| async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(AppError::BackendUnavailable("connection reset".to_string()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_read_gives_up_after_second_failure() {
        let calls = &AtomicU32::new(0);
        let result: AppResult<()> = retry_read(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::BackendUnavailable("down".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_read_does_not_retry_other_errors() {
        let calls = &AtomicU32::new(0);
        let result: AppResult<()> = retry_read(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::not_found("Invoice", "x"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
