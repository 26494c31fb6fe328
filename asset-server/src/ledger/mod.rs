//! 账本模块
//!
//! - [`asset`] - 资产目录与资产操作记录
//! - [`consumable`] - 耗材与出入库记录服务
//! - [`stock`] - 库存效果应用 (事务内)

pub mod asset;
pub mod consumable;
pub mod stock;

pub use asset::AssetLedger;
pub use consumable::ConsumableLedger;
