use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use linkhop_auth::{AuthError, Identity};
use linkhop_core::LinkId;
use serde::de::DeserializeOwned;

/// The caller authenticated by an `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        Ok(AuthUser(state.auth().authenticate(token)?))
    }
}

/// An [`AuthUser`] that also holds the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::Forbidden("Admin access only".to_string()));
        }
        Ok(AdminUser(identity))
    }
}

/// `Json` whose rejections use the gateway's error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Parses a link id path segment.
pub fn parse_link_id(raw: &str) -> Result<LinkId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid URL ID format".to_string()))
}
