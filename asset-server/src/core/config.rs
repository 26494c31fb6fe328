use std::path::PathBuf;

/// 审批配置
#[derive(Debug, Clone, Default)]
pub struct ApprovalConfig {
    /// 创建审批单时必须能解析出审批人
    pub require_approver: bool,
    /// 请求未指定审批人时使用的默认审批人
    pub default_approver_id: Option<String>,
}

/// 外部待办同步配置
#[derive(Debug, Clone)]
pub struct TodoSyncConfig {
    /// 外部任务系统地址，未配置时不投递
    pub url: Option<String>,
    /// Bearer token
    pub token: Option<String>,
    /// 单次请求超时 (毫秒)
    pub timeout_ms: u64,
}

/// Outbox worker 配置
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    /// 超过该次数后事件标记为 failed
    pub max_attempts: i64,
    /// 指数退避基数 (毫秒)
    pub base_backoff_ms: u64,
    /// 无唤醒时的轮询间隔 (毫秒)
    pub poll_interval_ms: u64,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/database/assets.db | SQLite 文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | LOG_LEVEL | info | 日志级别 / EnvFilter 指令 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | REQUIRE_APPROVER | false | 审批单必须有审批人 |
/// | DEFAULT_APPROVER_ID | - | 默认审批人 |
/// | TODO_SYNC_URL | - | 外部待办同步地址 |
/// | TODO_SYNC_TOKEN | - | 外部待办同步令牌 |
/// | TODO_SYNC_TIMEOUT_MS | 5000 | 同步请求超时 |
/// | OUTBOX_MAX_ATTEMPTS | 8 | 最大投递次数 |
/// | OUTBOX_BASE_BACKOFF_MS | 1000 | 退避基数 |
/// | OUTBOX_POLL_INTERVAL_MS | 5000 | 轮询间隔 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/assets HTTP_PORT=8080 cargo run -p asset-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// 数据库文件路径，未设置时放在工作目录下
    pub database_path: Option<String>,
    /// HTTP API 服务端口
    pub http_port: u16,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub approval: ApprovalConfig,
    pub todo_sync: TodoSyncConfig,
    pub outbox: OutboxConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            database_path: env_opt("DATABASE_PATH"),
            http_port: env_parse("HTTP_PORT", 3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            approval: ApprovalConfig {
                require_approver: env_parse("REQUIRE_APPROVER", false),
                default_approver_id: env_opt("DEFAULT_APPROVER_ID"),
            },
            todo_sync: TodoSyncConfig {
                url: env_opt("TODO_SYNC_URL"),
                token: env_opt("TODO_SYNC_TOKEN"),
                timeout_ms: env_parse("TODO_SYNC_TIMEOUT_MS", 5000),
            },
            outbox: OutboxConfig {
                max_attempts: env_parse("OUTBOX_MAX_ATTEMPTS", 8),
                base_backoff_ms: env_parse("OUTBOX_BASE_BACKOFF_MS", 1000),
                poll_interval_ms: env_parse("OUTBOX_POLL_INTERVAL_MS", 5000),
            },
        }
    }

    /// 测试用配置：不读环境变量，不投递外部待办
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            database_path: None,
            http_port: 0,
            log_level: "debug".into(),
            log_dir: None,
            approval: ApprovalConfig::default(),
            todo_sync: TodoSyncConfig {
                url: None,
                token: None,
                timeout_ms: 1000,
            },
            outbox: OutboxConfig {
                max_attempts: 3,
                base_backoff_ms: 10,
                poll_interval_ms: 50,
            },
        }
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件路径
    pub fn database_file(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => PathBuf::from(path),
            None => self.database_dir().join("assets.db"),
        }
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(parent) = self.database_file().parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_file_defaults_under_work_dir() {
        let config = Config::for_tests("/tmp/assets");
        assert_eq!(
            config.database_file(),
            PathBuf::from("/tmp/assets/database/assets.db")
        );

        let config = Config {
            database_path: Some("/srv/ledger.db".into()),
            ..Config::for_tests("/tmp/assets")
        };
        assert_eq!(config.database_file(), PathBuf::from("/srv/ledger.db"));
    }
}
