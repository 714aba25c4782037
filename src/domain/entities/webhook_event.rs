//! Typed provider webhook events.
//!
//! A delivery is parsed once from the verified body into [`WebhookEvent`].
//! Only the categories that move a subscription plan are modelled; every
//! other provider event type becomes [`WebhookEventKind::Unrecognized`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CUSTOMER_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const CUSTOMER_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

#[derive(Error, Debug)]
pub enum EventParseError {
    #[error("Invalid webhook payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Event {event_type} is missing {field}")]
    MissingField {
        event_type: String,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// Provider event id (e.g. `evt_...`).
    pub id: Option<String>,
    /// Empty when the envelope carries no string `type`.
    pub event_type: String,
    /// Provider creation time in unix seconds, when it is an integer.
    pub created: Option<i64>,
    pub kind: WebhookEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutCompleted(CheckoutCompleted),
    SubscriptionStatusChanged(SubscriptionStatusChanged),
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCompleted {
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatusChanged {
    pub customer_id: String,
    pub status: String,
}

impl WebhookEvent {
    /// Parse a verified request body.
    ///
    /// Only the body being JSON is required of every delivery. Envelope fields
    /// are read leniently so unrecognized events are always acknowledged; the
    /// payload is typed strictly only for the categories that change a plan.
    pub fn from_slice(body: &[u8]) -> Result<Self, EventParseError> {
        let envelope: Value = serde_json::from_slice(body)?;
        let event_type = envelope
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let object = envelope
            .pointer("/data/object")
            .cloned()
            .unwrap_or(Value::Null);

        let kind = match event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                let session: CheckoutSessionObject = serde_json::from_value(object)?;
                let customer_id = session
                    .customer
                    .map(CustomerRef::into_id)
                    .ok_or_else(|| missing(&event_type, "customer"))?;
                WebhookEventKind::CheckoutCompleted(CheckoutCompleted { customer_id })
            }
            CUSTOMER_SUBSCRIPTION_UPDATED | CUSTOMER_SUBSCRIPTION_DELETED => {
                let subscription: SubscriptionObject = serde_json::from_value(object)?;
                let customer_id = subscription
                    .customer
                    .map(CustomerRef::into_id)
                    .ok_or_else(|| missing(&event_type, "customer"))?;
                let status = subscription
                    .status
                    .ok_or_else(|| missing(&event_type, "status"))?;
                WebhookEventKind::SubscriptionStatusChanged(SubscriptionStatusChanged {
                    customer_id,
                    status,
                })
            }
            _ => WebhookEventKind::Unrecognized,
        };

        Ok(WebhookEvent {
            id: envelope
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string),
            event_type,
            created: envelope.get("created").and_then(Value::as_i64),
            kind,
        })
    }

    /// Event id for logs and receipts; empty when the provider omitted it.
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self.kind, WebhookEventKind::Unrecognized)
    }
}

fn missing(event_type: &str, field: &'static str) -> EventParseError {
    EventParseError::MissingField {
        event_type: event_type.to_string(),
        field,
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// `customer` is either a bare id or an expanded customer object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomerRef {
    Id(String),
    Expanded { id: String },
}

impl CustomerRef {
    fn into_id(self) -> String {
        match self {
            CustomerRef::Id(id) => id,
            CustomerRef::Expanded { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<CustomerRef>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    customer: Option<CustomerRef>,
    status: Option<String>,
}
