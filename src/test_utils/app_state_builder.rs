//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory repositories
//! and signs with `TEST_WEBHOOK_SECRET`.

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        subscription_sync::{ProfileRepo, SubscriptionSyncUseCases},
        webhook::WebhookUseCases,
    },
    domain::entities::profile::Profile,
    infra::{
        config::AppConfig,
        signature::{Freshness, TimestampPolicy},
    },
    test_utils::{FailingProfileRepo, InMemoryProfileRepo, InMemorySyncCursorRepo, TEST_WEBHOOK_SECRET},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let profile = create_test_profile(|p| p.stripe_customer_id = Some("cus_1".into()));
/// let (app_state, profiles) = TestAppStateBuilder::new().with_profile(profile).build();
/// ```
pub struct TestAppStateBuilder {
    profiles: Vec<Profile>,
    freshness: Freshness,
    event_ordering_guard: bool,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            freshness: Freshness::default(),
            event_ordering_guard: true,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_ordering_guard(mut self, enabled: bool) -> Self {
        self.event_ordering_guard = enabled;
        self
    }

    /// Build the state and hand back the profile store for assertions.
    pub fn build(self) -> (AppState, Arc<InMemoryProfileRepo>) {
        let profiles = Arc::new(InMemoryProfileRepo::with_profiles(self.profiles.clone()));
        let state = self.build_with_repo(profiles.clone());
        (state, profiles)
    }

    /// Build a state whose profile store rejects every write.
    pub fn build_with_failing_writes(self, profile: Profile) -> AppState {
        self.build_with_repo(Arc::new(FailingProfileRepo::with_profile(profile)))
    }

    fn build_with_repo(self, profiles: Arc<dyn ProfileRepo>) -> AppState {
        let config = test_config(self.freshness, self.event_ordering_guard);

        let subscription_sync = Arc::new(SubscriptionSyncUseCases::new(
            profiles,
            Arc::new(InMemorySyncCursorRepo::new()),
            config.event_ordering_guard,
        ));
        let webhook_use_cases = WebhookUseCases::new(
            SecretString::new(TEST_WEBHOOK_SECRET.into()),
            config.freshness(),
            subscription_sync,
        );

        AppState {
            config: Arc::new(config),
            webhook_use_cases: Arc::new(webhook_use_cases),
        }
    }
}

fn test_config(freshness: Freshness, event_ordering_guard: bool) -> AppConfig {
    AppConfig {
        stripe_webhook_secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
        database_url: SecretString::new("postgres://localhost/test".into()),
        database_max_connections: 1,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        webhook_tolerance_secs: freshness.tolerance_secs,
        webhook_timestamp_policy: freshness.policy,
        event_ordering_guard,
        log_file: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reflects_builder_freshness() {
        let freshness = Freshness {
            tolerance_secs: 60,
            policy: TimestampPolicy::WarnOnly,
        };
        let (state, _) = TestAppStateBuilder::new()
            .with_freshness(freshness)
            .with_ordering_guard(false)
            .build();

        assert_eq!(state.config.freshness(), freshness);
        assert!(!state.config.event_ordering_guard);
    }
}
