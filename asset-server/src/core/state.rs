use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::alerts::{AlertPropagator, StockAlertService};
use crate::approvals::ApprovalService;
use crate::core::{BackgroundTasks, Config, Result, ServerError};
use crate::db::DbService;
use crate::inventory::InventoryService;
use crate::ledger::{AssetLedger, ConsumableLedger};
use crate::notify::{OutboxHandle, OutboxWorker, todo_sync_from_config};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有服务内部只持有 `SqlitePool` (Arc) 和配置，clone 成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | approvals | 审批单 + 决策编排 |
/// | assets | 资产目录与资产操作记录 |
/// | consumables | 耗材与库存账本 |
/// | inventory | 盘点任务 |
/// | alerts | 库存预警传播 |
/// | outbox | outbox worker 唤醒句柄 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub approvals: ApprovalService,
    pub assets: AssetLedger,
    pub consumables: ConsumableLedger,
    pub inventory: InventoryService,
    pub alerts: Arc<dyn AlertPropagator>,
    pub outbox: OutboxHandle,
}

impl ServerState {
    /// 基于已打开的连接池组装所有服务
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let alerts: Arc<dyn AlertPropagator> = Arc::new(StockAlertService::new(pool.clone()));
        let outbox = OutboxHandle::new();

        Self {
            approvals: ApprovalService::new(
                pool.clone(),
                config.approval.clone(),
                alerts.clone(),
                outbox.clone(),
            ),
            assets: AssetLedger::new(pool.clone()),
            consumables: ConsumableLedger::new(pool.clone(), alerts.clone()),
            inventory: InventoryService::new(pool.clone()),
            alerts,
            outbox,
            config,
            pool,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (WAL + migrations)
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_file();
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::new(config.clone(), db.pool))
    }

    /// 启动后台任务 (outbox worker)
    ///
    /// 必须在 `Server::run()` 开始服务之前调用
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) -> Result<()> {
        let sync = todo_sync_from_config(&self.config.todo_sync)
            .map_err(|e| ServerError::Config(format!("todo sync client: {e}")))?;
        let worker = OutboxWorker::new(
            self.pool.clone(),
            sync,
            self.config.outbox.clone(),
            self.outbox.clone(),
        );
        let token = tasks.shutdown_token();
        tasks.spawn("outbox_worker", async move { worker.run(token).await });
        Ok(())
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
