//! External todo sync clients

use super::{ExternalTodoSync, SyncError};
use async_trait::async_trait;
use shared::models::TodoSyncPayload;
use std::time::Duration;

/// Longest response body kept in `last_error`
const MAX_ERROR_BODY: usize = 300;

/// JSON POST to the task tracker endpoint
#[derive(Debug, Clone)]
pub struct HttpTodoSync {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpTodoSync {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn endpoint(&self, external_todo_id: &str) -> String {
        format!("{}/todos/{}", self.url, external_todo_id)
    }
}

#[async_trait]
impl ExternalTodoSync for HttpTodoSync {
    async fn update_external_approval_todo(
        &self,
        payload: &TodoSyncPayload,
        external_todo_id: &str,
    ) -> Result<(), SyncError> {
        let mut req = self.client.post(self.endpoint(external_todo_id)).json(payload);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(
            approval_id = payload.approval_id,
            external_todo_id,
            status = %payload.status,
            "External todo updated"
        );
        Ok(())
    }
}

/// Used when no endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTodoSync;

#[async_trait]
impl ExternalTodoSync for NoopTodoSync {
    async fn update_external_approval_todo(
        &self,
        payload: &TodoSyncPayload,
        external_todo_id: &str,
    ) -> Result<(), SyncError> {
        tracing::debug!(
            approval_id = payload.approval_id,
            external_todo_id,
            "Todo sync disabled, skipping"
        );
        Ok(())
    }
}
