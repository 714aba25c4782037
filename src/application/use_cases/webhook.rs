use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::subscription_sync::{SubscriptionSyncUseCases, SyncOutcome};
use crate::domain::entities::webhook_event::WebhookEvent;
use crate::infra::signature::{self, Freshness};

/// Result of one accepted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReceipt {
    pub event_id: Option<String>,
    pub event_type: String,
    /// The signature timestamp was outside the window and accepted under the warn-only policy.
    pub stale_signature: bool,
    pub outcome: SyncOutcome,
}

/// Entry point for provider deliveries: verify, parse, dispatch.
/// Holds no per-request state; safe to share across concurrent requests.
pub struct WebhookUseCases {
    signing_secret: SecretString,
    freshness: Freshness,
    subscription_sync: Arc<SubscriptionSyncUseCases>,
}

impl WebhookUseCases {
    pub fn new(
        signing_secret: SecretString,
        freshness: Freshness,
        subscription_sync: Arc<SubscriptionSyncUseCases>,
    ) -> Self {
        Self {
            signing_secret,
            freshness,
            subscription_sync,
        }
    }

    /// Authenticate the raw body, then dispatch it. Nothing is parsed before the
    /// signature checks out.
    #[instrument(skip(self, body, signature_header), fields(body_len = body.len()))]
    pub async fn receive(
        &self,
        body: &[u8],
        signature_header: Option<&str>,
        now: i64,
    ) -> AppResult<WebhookReceipt> {
        let signature_header = signature_header
            .ok_or_else(|| AppError::MalformedRequest("No Stripe signature found".into()))?;

        let verified = signature::verify(
            body,
            signature_header,
            self.signing_secret.expose_secret().as_bytes(),
            now,
            self.freshness,
        )?;

        if verified.stale {
            tracing::warn!(
                signature_timestamp = verified.timestamp,
                age_secs = now.saturating_sub(verified.timestamp),
                tolerance_secs = self.freshness.tolerance_secs,
                "Webhook timestamp is outside the tolerance window, accepting"
            );
        }

        let mut receipt = self.handle(body).await?;
        receipt.stale_signature = verified.stale;
        Ok(receipt)
    }

    /// Parse a verified body and route it by event category.
    pub async fn handle(&self, verified_body: &[u8]) -> AppResult<WebhookReceipt> {
        let event = WebhookEvent::from_slice(verified_body)?;

        tracing::info!(
            event_id = %event.id_or_empty(),
            event_type = %event.event_type,
            "Received webhook event"
        );

        let outcome = if event.is_recognized() {
            self.subscription_sync.apply(&event).await?
        } else {
            tracing::debug!(event_type = %event.event_type, "Unhandled webhook event type");
            SyncOutcome::Ignored
        };

        Ok(WebhookReceipt {
            event_id: event.id,
            event_type: event.event_type,
            stale_signature: false,
            outcome,
        })
    }
}
