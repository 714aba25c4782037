use crate::{
    adapters::http::app_state::AppState,
    infra::{config::AppConfig, postgres_persistence},
    use_cases::{
        subscription_sync::{ProfileRepo, SubscriptionSyncUseCases, SyncCursorRepo},
        webhook::WebhookUseCases,
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    init_tracing(config.log_file.as_deref());

    let postgres_arc = Arc::new(
        postgres_persistence(
            config.database_url.expose_secret(),
            config.database_max_connections,
        )
        .await?,
    );

    let subscription_sync = Arc::new(SubscriptionSyncUseCases::new(
        postgres_arc.clone() as Arc<dyn ProfileRepo>,
        postgres_arc.clone() as Arc<dyn SyncCursorRepo>,
        config.event_ordering_guard,
    ));

    let webhook_use_cases = WebhookUseCases::new(
        SecretString::new(config.stripe_webhook_secret.expose_secret().into()),
        config.freshness(),
        subscription_sync,
    );

    tracing::info!(
        timestamp_policy = ?config.webhook_timestamp_policy,
        tolerance_secs = config.webhook_tolerance_secs,
        event_ordering_guard = config.event_ordering_guard,
        "Webhook receiver configured"
    );

    Ok(AppState {
        config: Arc::new(config),
        webhook_use_cases: Arc::new(webhook_use_cases),
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billing_webhook=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true)
        .pretty();

    // File (structured JSON logs), only when LOG_FILE is set
    let file = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot create log file {path}: {e}");
            None
        }
    });
    let json_layer = file.map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
