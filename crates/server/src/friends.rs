use api_types::{
    friend::{FriendAdd, FriendsResponse},
    user::UserView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::ServerState,
    views::{user_view, users_view},
};

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<FriendsResponse>, ServerError> {
    let friends = state.engine.friends(&user.id).await?;
    Ok(Json(FriendsResponse {
        friends: users_view(friends),
    }))
}

pub async fn add(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendAdd>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let friend = state.engine.add_friend(&user.id, &payload.email).await?;
    Ok((StatusCode::CREATED, Json(user_view(friend))))
}
