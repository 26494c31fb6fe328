//! Asset Server - 带审批流的资产与耗材台账
//!
//! # 模块结构
//!
//! ```text
//! asset-server/src/
//! ├── core/          # 配置、状态、错误、后台任务、HTTP 服务
//! ├── db/            # SQLite 连接池 + repository
//! ├── approvals/     # 审批单 + 决策编排
//! ├── ledger/        # 资产操作记录、耗材库存账本
//! ├── inventory/     # 盘点任务
//! ├── alerts/        # 库存预警传播
//! ├── notify/        # 外部待办 outbox 投递
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验
//! ```

pub mod alerts;
pub mod api;
pub mod approvals;
pub mod core;
pub mod db;
pub mod inventory;
pub mod ledger;
pub mod notify;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

use tracing_appender::non_blocking::WorkerGuard;

/// 按配置初始化日志 (.env 由 main.rs 加载)
///
/// 返回的 guard 需要在进程生命周期内持有 (文件日志)。
pub fn setup_environment(config: &Config) -> Option<WorkerGuard> {
    if let Some(dir) = &config.log_dir {
        let _ = std::fs::create_dir_all(dir);
    }
    init_logger_with_file(&config.log_level, config.log_dir.as_deref())
}
