//! Shared types for the asset ledger
//!
//! Domain models, the unified error system and small utilities used by
//! the server crate and by API clients.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
pub use types::Page;
