use std::net::SocketAddr;

use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::infra::signature::{DEFAULT_TOLERANCE_SECS, Freshness, TimestampPolicy};

pub struct AppConfig {
    /// Shared secret the provider signs deliveries with.
    pub stripe_webhook_secret: SecretString,
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Allowed distance between the signature timestamp and now.
    pub webhook_tolerance_secs: i64,
    /// `enforce` rejects stale signatures, `warn` only logs them.
    pub webhook_timestamp_policy: TimestampPolicy,
    /// Drop subscription events older than the last one applied to the same user.
    pub event_ordering_guard: bool,
    /// Optional path for JSON logs in addition to the console.
    pub log_file: Option<String>,
}

impl AppConfig {
    /// Reads the process environment. Missing required variables abort startup.
    pub fn from_env() -> Self {
        let stripe_webhook_secret =
            SecretString::new(get_env::<String>("STRIPE_WEBHOOK_SECRET").into());
        let database_url = SecretString::new(get_env::<String>("DATABASE_URL").into());
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );

        let webhook_tolerance_secs: i64 =
            get_env_default("WEBHOOK_TOLERANCE_SECS", DEFAULT_TOLERANCE_SECS);
        let webhook_timestamp_policy: TimestampPolicy =
            get_env_default("WEBHOOK_TIMESTAMP_POLICY", TimestampPolicy::Enforce);
        let event_ordering_guard: bool = get_env_default("EVENT_ORDERING_GUARD", true);

        let log_file: Option<String> = std::env::var("LOG_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty());

        Self {
            stripe_webhook_secret,
            database_url,
            database_max_connections,
            bind_addr,
            webhook_tolerance_secs,
            webhook_timestamp_policy,
            event_ordering_guard,
            log_file,
        }
    }

    pub fn freshness(&self) -> Freshness {
        Freshness {
            tolerance_secs: self.webhook_tolerance_secs,
            policy: self.webhook_timestamp_policy,
        }
    }
}
