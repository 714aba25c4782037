pub mod profile;
pub mod subscription_plan;
pub mod webhook_event;
