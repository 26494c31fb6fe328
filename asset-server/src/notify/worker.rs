//! Outbox 后台 Worker
//!
//! 被唤醒或轮询到期时投递 pending 事件，收到取消信号后退出。

use super::{ExternalTodoSync, OutboxHandle};
use crate::core::config::OutboxConfig;
use crate::db::repository::{RepoResult, outbox};
use shared::models::OutboxEvent;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Events fetched per drain pass
const BATCH_SIZE: i64 = 50;

/// Upper bound for a single retry delay (1h)
const MAX_BACKOFF_MS: i64 = 3_600_000;

/// Delay before attempt `attempts + 1`: `base * 2^(attempts - 1)`, capped
pub fn backoff_ms(base_ms: u64, attempts: i64) -> i64 {
    let exp = (attempts - 1).clamp(0, 30) as u32;
    let delay = base_ms.saturating_mul(1u64 << exp);
    i64::try_from(delay).unwrap_or(MAX_BACKOFF_MS).min(MAX_BACKOFF_MS)
}

pub struct OutboxWorker {
    pool: SqlitePool,
    sync: Arc<dyn ExternalTodoSync>,
    config: OutboxConfig,
    handle: OutboxHandle,
}

impl OutboxWorker {
    pub fn new(
        pool: SqlitePool,
        sync: Arc<dyn ExternalTodoSync>,
        config: OutboxConfig,
        handle: OutboxHandle,
    ) -> Self {
        Self {
            pool,
            sync,
            config,
            handle,
        }
    }

    /// 运行 worker（阻塞直到取消）
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!("📮 Outbox worker started");
        let poll = Duration::from_millis(self.config.poll_interval_ms.max(10));

        loop {
            if let Err(e) = self.drain().await {
                tracing::error!(error = %e, "Outbox drain failed");
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.handle.notified() => {}
                _ = tokio::time::sleep(poll) => {}
            }
        }

        tracing::info!("Outbox worker stopping");
    }

    /// Deliver every due event once. Returns the number of events attempted.
    pub async fn drain(&self) -> RepoResult<usize> {
        let due = outbox::find_due(&self.pool, shared::util::now_millis(), BATCH_SIZE).await?;
        for event in &due {
            self.deliver(event).await?;
        }
        Ok(due.len())
    }

    async fn deliver(&self, event: &OutboxEvent) -> RepoResult<()> {
        let attempts = event.attempts + 1;
        match self
            .sync
            .update_external_approval_todo(&event.payload, &event.external_todo_id)
            .await
        {
            Ok(()) => {
                outbox::mark_delivered(&self.pool, event.id, attempts).await?;
                tracing::debug!(
                    event_id = event.id,
                    approval_id = event.approval_id,
                    attempts,
                    "Outbox event delivered"
                );
            }
            Err(e) if attempts >= self.config.max_attempts => {
                outbox::mark_failed(&self.pool, event.id, attempts, &e.to_string()).await?;
                tracing::error!(
                    event_id = event.id,
                    approval_id = event.approval_id,
                    external_todo_id = %event.external_todo_id,
                    attempts,
                    error = %e,
                    "Outbox event gave up"
                );
            }
            Err(e) => {
                let next = shared::util::now_millis()
                    + backoff_ms(self.config.base_backoff_ms, attempts);
                outbox::mark_retry(&self.pool, event.id, attempts, next, &e.to_string()).await?;
                let retry_at = chrono::DateTime::from_timestamp_millis(next).map(|t| t.to_rfc3339());
                tracing::warn!(
                    event_id = event.id,
                    approval_id = event.approval_id,
                    attempts,
                    retry_at = ?retry_at,
                    error = %e,
                    "Outbox delivery failed, will retry"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::notify::SyncError;
    use async_trait::async_trait;
    use shared::models::{
        ApprovalStatus, ApprovalType, OutboxQuery, OutboxStatus, TodoSyncPayload,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls
    struct FlakySync {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FlakySync {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ExternalTodoSync for FlakySync {
        async fn update_external_approval_todo(
            &self,
            _payload: &TodoSyncPayload,
            _external_todo_id: &str,
        ) -> Result<(), SyncError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SyncError::Rejected {
                    status: 503,
                    body: "busy".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn config() -> OutboxConfig {
        OutboxConfig {
            max_attempts: 3,
            base_backoff_ms: 1,
            poll_interval_ms: 10,
        }
    }

    async fn seed(pool: &SqlitePool) {
        let payload = TodoSyncPayload {
            approval_id: 1,
            external_todo_id: "T-1".into(),
            approval_type: ApprovalType::Borrow,
            status: ApprovalStatus::Approved,
            title: "Borrow projector".into(),
            result: Some("Approved by u-1".into()),
            approver_id: Some("u-1".into()),
            completed_at: Some(1),
        };
        let mut conn = pool.acquire().await.unwrap();
        outbox::enqueue(&mut conn, &payload).await.unwrap();
    }

    async fn only_event(pool: &SqlitePool) -> OutboxEvent {
        let (mut items, total) = outbox::find_all(pool, &OutboxQuery::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 1);
        items.remove(0)
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_ms(1000, 1), 1000);
        assert_eq!(backoff_ms(1000, 2), 2000);
        assert_eq!(backoff_ms(1000, 4), 8000);
        assert_eq!(backoff_ms(1000, 40), MAX_BACKOFF_MS);
    }

    #[tokio::test]
    async fn retries_then_delivers() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        let sync = FlakySync::new(1);
        let worker = OutboxWorker::new(db.pool.clone(), sync.clone(), config(), OutboxHandle::new());

        assert_eq!(worker.drain().await.unwrap(), 1);
        let event = only_event(&db.pool).await;
        assert_eq!(event.status, OutboxStatus::Pending);
        assert_eq!(event.attempts, 1);
        assert!(event.last_error.is_some());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(worker.drain().await.unwrap(), 1);
        let event = only_event(&db.pool).await;
        assert_eq!(event.status, OutboxStatus::Delivered);
        assert_eq!(event.attempts, 2);
        assert!(event.last_error.is_none());

        assert_eq!(worker.drain().await.unwrap(), 0);
        assert_eq!(sync.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        let worker = OutboxWorker::new(db.pool.clone(), FlakySync::new(usize::MAX), config(), OutboxHandle::new());

        for _ in 0..3 {
            worker.drain().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let event = only_event(&db.pool).await;
        assert_eq!(event.status, OutboxStatus::Failed);
        assert_eq!(event.attempts, 3);
        assert_eq!(worker.drain().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        let handle = OutboxHandle::new();
        let worker = OutboxWorker::new(db.pool.clone(), FlakySync::new(0), config(), handle.clone());
        let token = CancellationToken::new();
        let task = tokio::spawn(worker.run(token.clone()));

        handle.wake();
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        task.await.unwrap();

        assert_eq!(only_event(&db.pool).await.status, OutboxStatus::Delivered);
    }
}
