use crate::error::Result;
use crate::extract::{ApiJson, AuthUser};
use crate::model::{ApiResponse, Credentials, SessionView, UserView};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>)> {
    let session = state
        .auth()
        .register(&credentials.email, &credentials.password)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session.into()))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<ApiResponse<SessionView>>> {
    let session = state
        .auth()
        .login(&credentials.email, &credentials.password)
        .await?;

    Ok(Json(ApiResponse::ok(session.into())))
}

pub async fn me_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<UserView>>> {
    let user = state.auth().me(identity.user_id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
