//! Auth-domain types: credential secrets, user records, and session lifecycle events.

pub mod credential;
pub mod event;
pub mod user;

pub use credential::*;
pub use event::*;
pub use user::*;
