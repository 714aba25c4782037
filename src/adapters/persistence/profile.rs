use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, lookup_error, update_error},
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::ProfileRepo,
    domain::entities::{profile::Profile, subscription_plan::SubscriptionPlan},
};

/// Column value to plan. NULL is free; an unknown label is logged and treated as free.
fn parse_plan_column(value: Option<&str>) -> SubscriptionPlan {
    value
        .map(|p| {
            p.parse().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Unknown subscription_plan value, treating as free");
                SubscriptionPlan::Free
            })
        })
        .unwrap_or_default()
}

fn row_to_profile(row: &sqlx::postgres::PgRow) -> Profile {
    let plan: Option<String> = row.get("subscription_plan");

    Profile {
        user_id: row.get("user_id"),
        stripe_customer_id: row.get("stripe_customer_id"),
        subscription_plan: parse_plan_column(plan.as_deref()),
    }
}

/// A customer id must resolve to at most one profile.
fn at_most_one<T>(mut rows: Vec<T>, stripe_customer_id: &str) -> AppResult<Option<T>> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        _ => {
            tracing::error!(stripe_customer_id, "Multiple profiles share a customer id");
            Err(AppError::ProfileLookupFailed(format!(
                "multiple profiles for customer {}",
                stripe_customer_id
            )))
        }
    }
}

/// An update that touched no row means the profile is gone.
fn ensure_updated(rows_affected: u64, user_id: Uuid) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::StorageUpdateFailed(format!(
            "no profile row for user {}",
            user_id
        )));
    }
    Ok(())
}

const SELECT_COLS: &str = "user_id, stripe_customer_id, subscription_plan::text AS subscription_plan";

#[async_trait]
impl ProfileRepo for PostgresPersistence {
    async fn get_by_customer_id(&self, stripe_customer_id: &str) -> AppResult<Option<Profile>> {
        // LIMIT 2 so a duplicated customer id is detected instead of picking one row.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE stripe_customer_id = $1 LIMIT 2",
            SELECT_COLS
        ))
        .bind(stripe_customer_id)
        .fetch_all(self.pool())
        .await
        .map_err(lookup_error)?;

        let row = at_most_one(rows, stripe_customer_id)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn set_subscription_plan(&self, user_id: Uuid, plan: SubscriptionPlan) -> AppResult<()> {
        let result = sqlx::query("UPDATE profiles SET subscription_plan = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(plan.as_str())
            .execute(self.pool())
            .await
            .map_err(update_error)?;

        ensure_updated(result.rows_affected(), user_id)
    }
}
