//! In-memory mock implementations for the profile store traits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{ProfileRepo, SyncCursorRepo},
    domain::entities::{
        profile::{Profile, SyncCursor},
        subscription_plan::SubscriptionPlan,
    },
};

// ============================================================================
// InMemoryProfileRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepo {
    pub profiles: Mutex<Vec<Profile>>,
    writes: AtomicUsize,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn get_all(&self) -> Vec<Profile> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn plan_of(&self, user_id: Uuid) -> Option<SubscriptionPlan> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.subscription_plan)
    }

    /// Number of successful plan writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepo for InMemoryProfileRepo {
    async fn get_by_customer_id(&self, stripe_customer_id: &str) -> AppResult<Option<Profile>> {
        let profiles = self.profiles.lock().unwrap();
        let mut matches = profiles
            .iter()
            .filter(|p| p.stripe_customer_id.as_deref() == Some(stripe_customer_id));
        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(AppError::ProfileLookupFailed(format!(
                "multiple profiles for customer {}",
                stripe_customer_id
            )));
        }
        Ok(first)
    }

    async fn set_subscription_plan(&self, user_id: Uuid, plan: SubscriptionPlan) -> AppResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::StorageUpdateFailed(format!("no profile {}", user_id)))?;
        profile.subscription_plan = plan;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// FailingProfileRepo
// ============================================================================

/// Reads succeed, every write fails as if the store were unavailable.
pub struct FailingProfileRepo {
    profile: Profile,
}

impl FailingProfileRepo {
    pub fn with_profile(profile: Profile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ProfileRepo for FailingProfileRepo {
    async fn get_by_customer_id(&self, stripe_customer_id: &str) -> AppResult<Option<Profile>> {
        Ok(
            (self.profile.stripe_customer_id.as_deref() == Some(stripe_customer_id))
                .then(|| self.profile.clone()),
        )
    }

    async fn set_subscription_plan(
        &self,
        _user_id: Uuid,
        _plan: SubscriptionPlan,
    ) -> AppResult<()> {
        Err(AppError::StorageUpdateFailed(
            "profile store unavailable".into(),
        ))
    }
}

// ============================================================================
// InMemorySyncCursorRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySyncCursorRepo {
    pub cursors: Mutex<HashMap<Uuid, SyncCursor>>,
}

impl InMemorySyncCursorRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self) -> Vec<SyncCursor> {
        self.cursors.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SyncCursorRepo for InMemorySyncCursorRepo {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<SyncCursor>> {
        Ok(self.cursors.lock().unwrap().get(&user_id).cloned())
    }

    async fn advance(
        &self,
        user_id: Uuid,
        event_id: Option<&str>,
        event_created: i64,
    ) -> AppResult<()> {
        let mut cursors = self.cursors.lock().unwrap();
        cursors
            .entry(user_id)
            .and_modify(|c| c.record(event_id, event_created))
            .or_insert_with(|| SyncCursor::new(user_id, event_id, event_created));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_profile;

    #[tokio::test]
    async fn profile_repo_never_inserts() {
        let repo = InMemoryProfileRepo::new();
        let err = repo
            .set_subscription_plan(Uuid::new_v4(), SubscriptionPlan::Premium)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageUpdateFailed(_)));
        assert!(repo.get_all().is_empty());
    }

    #[tokio::test]
    async fn profile_repo_rejects_ambiguous_customer() {
        let a = create_test_profile(|p| p.stripe_customer_id = Some("cus_dup".into()));
        let b = create_test_profile(|p| p.stripe_customer_id = Some("cus_dup".into()));
        let repo = InMemoryProfileRepo::with_profiles(vec![a, b]);

        let err = repo.get_by_customer_id("cus_dup").await.unwrap_err();
        assert!(matches!(err, AppError::ProfileLookupFailed(_)));
    }

    #[tokio::test]
    async fn cursor_never_moves_backwards() {
        let repo = InMemorySyncCursorRepo::new();
        let user_id = Uuid::new_v4();

        repo.advance(user_id, Some("evt_2"), 200).await.unwrap();
        repo.advance(user_id, Some("evt_1"), 100).await.unwrap();

        let cursor = repo.get(user_id).await.unwrap().unwrap();
        assert_eq!(cursor.last_event_id(), Some("evt_2"));
        assert_eq!(cursor.last_event_created, 200);
    }
}
