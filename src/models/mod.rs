pub mod campaign;
pub mod email_activity;
pub mod lead;
pub mod list;
pub mod mail;
pub mod plan;
pub mod user;

pub use campaign::*;
pub use email_activity::*;
pub use lead::*;
pub use list::*;
pub use mail::*;
pub use plan::*;
pub use user::*;
