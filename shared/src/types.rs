//! Shared Types
//!
//! Common response wrappers used across the application

use serde::{Deserialize, Serialize};

/// Offset/limit paginated list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// 数据列表
    pub items: Vec<T>,
    /// 总记录数
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, offset: i64, limit: i64) -> Self {
        Self {
            items,
            total,
            offset,
            limit,
        }
    }

    /// Whether another page exists after this one
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }
}
