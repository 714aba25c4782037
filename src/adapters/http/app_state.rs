use std::sync::Arc;

use crate::{infra::config::AppConfig, use_cases::webhook::WebhookUseCases};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub webhook_use_cases: Arc<WebhookUseCases>,
}
