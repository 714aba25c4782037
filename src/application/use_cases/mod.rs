pub mod subscription_sync;
pub mod webhook;
