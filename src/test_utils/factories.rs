//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use uuid::Uuid;

use crate::domain::entities::{profile::Profile, subscription_plan::SubscriptionPlan};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Create a free-tier profile with a random customer id.
pub fn create_test_profile(overrides: impl FnOnce(&mut Profile)) -> Profile {
    let mut profile = Profile {
        user_id: Uuid::new_v4(),
        stripe_customer_id: Some(format!("cus_{}", Uuid::new_v4().simple())),
        subscription_plan: SubscriptionPlan::Free,
    };
    overrides(&mut profile);
    profile
}
