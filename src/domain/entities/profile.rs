use uuid::Uuid;

use super::subscription_plan::SubscriptionPlan;

/// The subset of a user profile the webhook receiver reads and writes.
/// Rows are created by onboarding and owned by the profile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub stripe_customer_id: Option<String>,
    pub subscription_plan: SubscriptionPlan,
}

/// Newest provider events applied to a user's plan, used to drop stale deliveries.
///
/// `applied_event_ids` lists the events applied at `last_event_created`, in
/// the order they were last applied. Provider timestamps have one-second
/// resolution, so this list is what orders events from the same second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCursor {
    pub user_id: Uuid,
    pub last_event_created: i64,
    pub applied_event_ids: Vec<String>,
}

impl SyncCursor {
    pub fn new(user_id: Uuid, event_id: Option<&str>, event_created: i64) -> Self {
        Self {
            user_id,
            last_event_created: event_created,
            applied_event_ids: event_id.map(str::to_string).into_iter().collect(),
        }
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.applied_event_ids.last().map(String::as_str)
    }

    /// True when applying this event would undo a newer one.
    ///
    /// Within the same second, a redelivery of an event that was followed by
    /// another one is superseded; the most recently applied event and events
    /// not seen before are not.
    pub fn supersedes(&self, event_id: Option<&str>, event_created: i64) -> bool {
        if event_created != self.last_event_created {
            return event_created < self.last_event_created;
        }
        match event_id {
            Some(id) => {
                self.last_event_id() != Some(id) && self.applied_event_ids.iter().any(|a| a == id)
            }
            None => false,
        }
    }

    /// Record an applied event. Older events leave the cursor unchanged.
    pub fn record(&mut self, event_id: Option<&str>, event_created: i64) {
        if event_created < self.last_event_created {
            return;
        }
        if event_created > self.last_event_created {
            self.last_event_created = event_created;
            self.applied_event_ids.clear();
        }
        if let Some(id) = event_id {
            self.applied_event_ids.retain(|a| a != id);
            self.applied_event_ids.push(id.to_string());
        }
    }
}
