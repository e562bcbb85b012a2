//! # imsg-store
//!
//! Read-only query layer over the Messages app's SQLite database (`chat.db`).

pub mod store;
pub mod types;

pub use store::ChatStore;
pub use types::{Attachment, Chat, Contact, Message};
