//! Data models
//!
//! Shared between asset-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod alert;
pub mod approval;
pub mod asset;
pub mod asset_operation;
pub mod consumable;
pub mod consumable_operation;
pub mod inventory;
pub mod metadata;
pub mod operation;
pub mod outbox;

// Re-exports
pub use alert::*;
pub use approval::*;
pub use asset::*;
pub use asset_operation::*;
pub use consumable::*;
pub use consumable_operation::*;
pub use inventory::*;
pub use metadata::*;
pub use operation::*;
pub use outbox::*;
