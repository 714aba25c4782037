use sqlx::PgPool;

use crate::app_error::AppError;

pub mod profile;
pub mod sync_cursor;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a failed read. The driver error is logged, not returned to the caller.
pub(crate) fn lookup_error(err: sqlx::Error) -> AppError {
    tracing::error!(error = ?err, "Database read failed");
    AppError::ProfileLookupFailed("Database operation failed".into())
}

/// Map a failed write. The driver error is logged, not returned to the caller.
pub(crate) fn update_error(err: sqlx::Error) -> AppError {
    tracing::error!(error = ?err, "Database write failed");
    AppError::StorageUpdateFailed("Database operation failed".into())
}
