//! Expense endpoints

use api_types::{
    PageQuery,
    expense::{DetailedExpenseView, ExpenseNew, ExpenseUpdate, ExpenseView, HistoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewExpenseCmd, UpdateExpenseCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{detailed_view, expense_view, history_view, to_payer, to_split},
};

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let mut cmd = NewExpenseCmd::new(
        &user.id,
        payload.amount,
        to_split(payload.split),
        to_payer(payload.payer)?,
    )
    .description(payload.description);
    if let Some(group_id) = payload.group_id {
        cmd = cmd.group_id(group_id);
    }

    let expense = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

/// Draft expenses of the caller, newest first.
pub async fn history(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<HistoryView>, ServerError> {
    let history = state
        .engine
        .fetch_expense_history(&user.id, query.page.unwrap_or(1))
        .await?;
    Ok(Json(history_view(history)))
}

pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<DetailedExpenseView>, ServerError> {
    let detailed = state.engine.expense(&user.id, expense_id).await?;
    Ok(Json(detailed_view(detailed)))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let cmd = UpdateExpenseCmd::new(
        expense_id,
        &user.id,
        payload.amount,
        to_split(payload.split),
        to_payer(payload.payer)?,
    )
    .description(payload.description)
    .group_id(payload.group_id);

    let expense = state.engine.update_expense(cmd).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(&user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn settle(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.settle_expense(&user.id, expense_id).await?;
    Ok(Json(expense_view(expense)))
}
