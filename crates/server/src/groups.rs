//! Group endpoints. Everything but creation requires group membership.

use api_types::{
    PageQuery,
    group::{GroupDetailView, GroupLedgerView, GroupNew, GroupView, MemberAdd},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{group_view, history_view, users_view},
};

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .create_group(
            &user.id,
            &payload.name,
            payload.description.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetailView>, ServerError> {
    let detail = state.engine.group_detail(&user.id, group_id).await?;
    Ok(Json(GroupDetailView {
        group: group_view(detail.group),
        members: users_view(detail.members),
    }))
}

/// Admin only.
pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(&user.id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .join_group(&user.id, group_id, &payload.member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.leave_group(&user.id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn ledger(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<GroupLedgerView>, ServerError> {
    let ledger = state
        .engine
        .fetch_group_ledger(&user.id, group_id, query.page.unwrap_or(1))
        .await?;
    Ok(Json(GroupLedgerView {
        group: group_view(ledger.group),
        members: users_view(ledger.members),
        history: history_view(ledger.history),
    }))
}
