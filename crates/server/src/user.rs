//! Account endpoints.

use api_types::{
    group::UserHomeView,
    user::{SignupRequest, UserView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::ServerState,
    views::{group_balance_view, user_view},
};

/// Register a new account. The only route without authentication.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .signup(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn me(Extension(user): Extension<engine::User>) -> Json<UserView> {
    Json(user_view(user))
}

/// Per-group balances and the overall net position.
pub async fn home(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<UserHomeView>, ServerError> {
    let home = state.engine.user_home(&user.id).await?;
    Ok(Json(UserHomeView {
        user: user_view(home.user),
        groups: home.groups.into_iter().map(group_balance_view).collect(),
        total_owed: home.total_owed,
        total_borrowed: home.total_borrowed,
    }))
}
