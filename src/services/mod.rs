pub mod billing_service;
pub mod campaign_service;
pub mod stats_service;
pub mod user_service;
