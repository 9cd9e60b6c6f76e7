use crate::error::{AppError, Result, SHORT_URL_NOT_FOUND_MESSAGE};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use linkhop_core::ShortToken;
use tracing::{error, trace};

/// `307` to the target, counting the click first.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Response> {
    let token = ShortToken::new(short_id).map_err(|e| {
        trace!(error = %e, "malformed short token");
        AppError::NotFound(SHORT_URL_NOT_FOUND_MESSAGE.to_string())
    })?;

    let target = state.redirector().visit(&token).await?;
    let location = HeaderValue::try_from(target).map_err(|e| {
        error!(token = %token, error = %e, "stored target is not a valid Location header");
        AppError::Internal(e.to_string())
    })?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
