//! Consumable Model (耗材库存)
//!
//! `quantity`, `reserved_quantity` and `status` form the stock ledger: they
//! are only ever written by applying a consumable ledger entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ConsumableStatus {
    InStock,
    LowStock,
    OutOfStock,
    Reserved,
    Archived,
}

impl ConsumableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::LowStock => "low_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Reserved => "reserved",
            Self::Archived => "archived",
        }
    }

    /// Derive status from stock levels.
    ///
    /// Precedence: archived (sticky) > out_of_stock > reserved > low_stock > in_stock.
    pub fn derive(
        current: ConsumableStatus,
        quantity: i64,
        reserved: i64,
        safety_stock: i64,
    ) -> ConsumableStatus {
        if current == Self::Archived {
            Self::Archived
        } else if quantity <= 0 {
            Self::OutOfStock
        } else if reserved >= quantity {
            Self::Reserved
        } else if safety_stock > 0 && quantity <= safety_stock {
            Self::LowStock
        } else {
            Self::InStock
        }
    }
}

impl fmt::Display for ConsumableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Consumable {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Person responsible for this stock
    pub keeper_id: Option<String>,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub safety_stock: i64,
    pub status: ConsumableStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Consumable {
    /// Stock not earmarked by a reservation
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }
}

/// Create consumable payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumableCreate {
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub keeper_id: Option<String>,
    #[serde(default)]
    pub safety_stock: i64,
    /// Recorded as a `done` inbound ledger entry, never written directly
    #[serde(default)]
    pub initial_quantity: i64,
    pub actor_id: String,
}

/// Archive / unarchive payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsumableArchive {
    pub archived: bool,
}

/// Consumable list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumableQuery {
    pub category: Option<String>,
    pub keeper_id: Option<String>,
    pub status: Option<ConsumableStatus>,
    pub keyword: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::ConsumableStatus::*;
    use super::*;

    #[test]
    fn derive_precedence() {
        // out_of_stock beats reserved
        assert_eq!(ConsumableStatus::derive(InStock, 0, 0, 3), OutOfStock);
        // reserved beats low_stock
        assert_eq!(ConsumableStatus::derive(InStock, 2, 2, 3), Reserved);
        assert_eq!(ConsumableStatus::derive(InStock, 2, 0, 3), LowStock);
        assert_eq!(ConsumableStatus::derive(InStock, 10, 1, 3), InStock);
    }

    #[test]
    fn zero_safety_stock_never_low() {
        assert_eq!(ConsumableStatus::derive(InStock, 1, 0, 0), InStock);
    }

    #[test]
    fn archived_is_sticky() {
        assert_eq!(ConsumableStatus::derive(Archived, 0, 0, 3), Archived);
        assert_eq!(ConsumableStatus::derive(Archived, 50, 0, 3), Archived);
    }
}
