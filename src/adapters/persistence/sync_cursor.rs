use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, lookup_error, update_error},
    app_error::AppResult,
    application::use_cases::subscription_sync::SyncCursorRepo,
    domain::entities::profile::SyncCursor,
};

fn row_to_cursor(row: sqlx::postgres::PgRow) -> SyncCursor {
    SyncCursor {
        user_id: row.get("user_id"),
        last_event_created: row.get("last_event_created"),
        applied_event_ids: row.get("applied_event_ids"),
    }
}

/// Upsert mirroring `SyncCursor::record`: a newer second replaces the applied
/// ids, the same second moves the id to the end, an older second is a no-op.
const ADVANCE_SQL: &str = r#"
    INSERT INTO subscription_sync_cursors (user_id, last_event_created, applied_event_ids)
    VALUES ($1, $2, CASE WHEN $3::text IS NULL THEN ARRAY[]::text[] ELSE ARRAY[$3::text] END)
    ON CONFLICT (user_id) DO UPDATE
        SET applied_event_ids = CASE
                WHEN subscription_sync_cursors.last_event_created = EXCLUDED.last_event_created
                    THEN array_remove(subscription_sync_cursors.applied_event_ids, $3::text)
                        || EXCLUDED.applied_event_ids
                ELSE EXCLUDED.applied_event_ids
            END,
            last_event_created = EXCLUDED.last_event_created,
            updated_at = NOW()
        WHERE subscription_sync_cursors.last_event_created <= EXCLUDED.last_event_created
"#;

#[async_trait]
impl SyncCursorRepo for PostgresPersistence {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<SyncCursor>> {
        let row = sqlx::query(
            "SELECT user_id, last_event_created, applied_event_ids FROM subscription_sync_cursors WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(lookup_error)?;

        Ok(row.map(row_to_cursor))
    }

    async fn advance(
        &self,
        user_id: Uuid,
        event_id: Option<&str>,
        event_created: i64,
    ) -> AppResult<()> {
        sqlx::query(ADVANCE_SQL)
            .bind(user_id)
            .bind(event_created)
            .bind(event_id)
            .execute(self.pool())
            .await
            .map_err(update_error)?;

        Ok(())
    }
}

