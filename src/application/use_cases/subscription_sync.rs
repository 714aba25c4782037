use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::{
    profile::{Profile, SyncCursor},
    subscription_plan::SubscriptionPlan,
    webhook_event::{WebhookEvent, WebhookEventKind},
};

// ============================================================================
// Repository Traits
// ============================================================================

/// Profile store. The receiver only reads by customer id and writes the plan field.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get_by_customer_id(&self, stripe_customer_id: &str) -> AppResult<Option<Profile>>;

    /// Single-field update. Must not create a profile.
    async fn set_subscription_plan(&self, user_id: Uuid, plan: SubscriptionPlan) -> AppResult<()>;
}

/// Per-user record of the newest provider event applied.
#[async_trait]
pub trait SyncCursorRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<SyncCursor>>;

    /// Record an applied event per [`SyncCursor::record`]. Never moves the cursor backwards.
    async fn advance(
        &self,
        user_id: Uuid,
        event_id: Option<&str>,
        event_created: i64,
    ) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied {
        user_id: Uuid,
        plan: SubscriptionPlan,
    },
    /// A status event arrived after a newer one was applied: either it is
    /// older, or it is a redelivery of an event from the same second that
    /// another event has since followed. A same-second event never seen
    /// before is applied, so two distinct events sharing a second and
    /// delivered out of order resolve to the one delivered last.
    SkippedStale {
        user_id: Uuid,
        last_event_created: i64,
    },
    /// Event category carries no subscription change.
    Ignored,
}

#[derive(Clone)]
pub struct SubscriptionSyncUseCases {
    profiles: Arc<dyn ProfileRepo>,
    cursors: Arc<dyn SyncCursorRepo>,
    ordering_guard: bool,
}

impl SubscriptionSyncUseCases {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        cursors: Arc<dyn SyncCursorRepo>,
        ordering_guard: bool,
    ) -> Self {
        Self {
            profiles,
            cursors,
            ordering_guard,
        }
    }

    /// Apply the plan transition carried by `event`.
    ///
    /// The target plan is a function of the event alone, so redelivery of the
    /// same event leaves the profile in the same state.
    #[instrument(skip(self, event), fields(event_id = %event.id_or_empty(), event_type = %event.event_type))]
    pub async fn apply(&self, event: &WebhookEvent) -> AppResult<SyncOutcome> {
        let (customer_id, plan, guarded) = match &event.kind {
            WebhookEventKind::CheckoutCompleted(checkout) => {
                (checkout.customer_id.as_str(), SubscriptionPlan::Premium, false)
            }
            WebhookEventKind::SubscriptionStatusChanged(change) => (
                change.customer_id.as_str(),
                SubscriptionPlan::from_provider_status(&change.status),
                true,
            ),
            WebhookEventKind::Unrecognized => return Ok(SyncOutcome::Ignored),
        };

        let profile = self.resolve_profile(customer_id).await?;
        let event_created = event.created.filter(|_| self.ordering_guard);

        if let (true, Some(created)) = (guarded, event_created) {
            if let Some(cursor) = self.cursors.get(profile.user_id).await? {
                if cursor.supersedes(event.id.as_deref(), created) {
                    tracing::info!(
                        user_id = %profile.user_id,
                        customer_id,
                        event_created = created,
                        last_event_created = cursor.last_event_created,
                        last_event_id = cursor.last_event_id().unwrap_or_default(),
                        "Skipping subscription event superseded by a newer one"
                    );
                    return Ok(SyncOutcome::SkippedStale {
                        user_id: profile.user_id,
                        last_event_created: cursor.last_event_created,
                    });
                }
            }
        }

        self.profiles
            .set_subscription_plan(profile.user_id, plan)
            .await?;

        tracing::info!(
            user_id = %profile.user_id,
            customer_id,
            previous_plan = %profile.subscription_plan,
            plan = %plan,
            "Updated subscription plan"
        );

        // The plan write already succeeded; a lost cursor only weakens the ordering guard.
        if let Some(created) = event_created {
            if let Err(e) = self
                .cursors
                .advance(profile.user_id, event.id.as_deref(), created)
                .await
            {
                tracing::warn!(
                    error = %e,
                    user_id = %profile.user_id,
                    "Failed to advance sync cursor (non-critical)"
                );
            }
        }

        Ok(SyncOutcome::Applied {
            user_id: profile.user_id,
            plan,
        })
    }

    async fn resolve_profile(&self, customer_id: &str) -> AppResult<Profile> {
        self.profiles
            .get_by_customer_id(customer_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(customer_id.to_string()))
    }
}
