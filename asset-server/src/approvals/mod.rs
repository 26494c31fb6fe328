//! 审批模块
//!
//! - [`ApprovalService`] - 审批单的创建、查询、改派与决策入口
//! - [`orchestrator`] - 决策事务: 审批单 → 关联操作 → 资产/库存效果 → 后续操作 → outbox

pub mod orchestrator;
mod service;

pub use orchestrator::DecisionOutcome;
pub use service::ApprovalService;
