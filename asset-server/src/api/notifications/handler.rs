//! Notification API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::core::ServerState;
use crate::db::repository::outbox;
use crate::utils::AppResult;
use shared::models::{OutboxEvent, OutboxQuery};
use shared::types::Page;
use shared::util::clamp_page;

/// GET /api/notifications/outbox - ?status=failed 查看放弃投递的事件
pub async fn list_outbox(
    State(state): State<ServerState>,
    Query(query): Query<OutboxQuery>,
) -> AppResult<Json<Page<OutboxEvent>>> {
    let (offset, limit) = clamp_page(query.offset, query.limit);
    let (items, total) = outbox::find_all(&state.pool, &query, offset, limit).await?;
    Ok(Json(Page::new(items, total, offset, limit)))
}
