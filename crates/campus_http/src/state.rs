use crate::error::{ApiError, ApiResult};
use campus_core::{RepoResult, ServiceError, SqliteStore};
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handler state: one migrated SQLite connection.
///
/// The connection is serialized behind a mutex; a request holds the lock for
/// exactly one service call, on the blocking pool rather than a runtime
/// worker.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - Returns the store readiness error when the connection is not migrated.
    pub fn new(conn: Connection) -> RepoResult<Self> {
        SqliteStore::try_new(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs one service call against the store on the blocking pool.
    ///
    /// A panic inside `f` surfaces as an internal error. The lock it poisons
    /// is taken over by the next caller: the open transaction was rolled
    /// back when its guard dropped during unwinding.
    pub(crate) async fn with_store<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(SqliteStore<'_>) -> Result<T, ServiceError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let conn = conn.lock().unwrap_or_else(|poisoned| {
                warn!("event=store_lock module=http status=recovered reason=poisoned");
                PoisonError::into_inner(poisoned)
            });
            let store = SqliteStore::try_new(&conn).map_err(ServiceError::from)?;
            Ok(f(store)?)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use crate::error::ApiError;
    use campus_core::{open_db_in_memory, DepartmentService, ServiceError};

    fn state() -> AppState {
        AppState::new(open_db_in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn panicking_call_reports_internal_and_store_stays_usable() {
        let state = state();

        let err = state
            .with_store(|_store| -> Result<(), ServiceError> { panic!("service blew up") })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let departments = state
            .with_store(|store| DepartmentService::new(store).list_departments())
            .await
            .unwrap();
        assert!(departments.is_empty());
    }
}
