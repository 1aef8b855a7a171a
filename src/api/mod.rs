pub mod billing;
pub mod campaigns;
pub mod health;
pub mod metrics;
pub mod stats;
pub mod swagger;
pub mod users;
