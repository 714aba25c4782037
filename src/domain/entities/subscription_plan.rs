use serde::{Deserialize, Serialize};

/// Subscription tier stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Premium,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Premium => "premium",
        }
    }

    /// Plan implied by a provider subscription status.
    /// Only "active" grants premium; every other status falls back to free.
    pub fn from_provider_status(status: &str) -> Self {
        if status == "active" {
            SubscriptionPlan::Premium
        } else {
            SubscriptionPlan::Free
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "premium" => Ok(SubscriptionPlan::Premium),
            _ => Err(format!(
                "Invalid subscription plan: {}. Must be 'free' or 'premium'",
                s
            )),
        }
    }
}
