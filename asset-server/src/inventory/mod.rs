//! 盘点 (inventory audit)
//!
//! A task snapshots expected stock of the consumables its filter matches;
//! counts recorded against the snapshot produce per-entry variance. Stock
//! itself is never corrected here.

mod service;

pub use service::InventoryService;
