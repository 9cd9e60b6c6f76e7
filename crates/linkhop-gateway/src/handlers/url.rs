use crate::error::{AppError, Result};
use crate::extract::{parse_link_id, ApiJson, AuthUser};
use crate::model::{
    ApiResponse, CreateUrlRequest, LinkStatsView, LinkView, ListUrlsParams, MessageResponse,
    PaginatedResponse, UpdateUrlRequest,
};
use crate::state::AppState;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use linkhop_core::LinkQuery;

pub async fn create_url_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(request): ApiJson<CreateUrlRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LinkView>>)> {
    let record = state
        .shortener()
        .create(identity.user_id, request.into())
        .await?;
    let short_url = state.short_url(&record.short_token);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(LinkView::new(record, short_url))),
    ))
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(params): Query<ListUrlsParams>,
) -> Result<Json<PaginatedResponse<LinkView>>> {
    let page = state
        .shortener()
        .list(identity.user_id, LinkQuery::from(params))
        .await?;

    let page = page.map(|record| {
        let short_url = state.short_url(&record.short_token);
        LinkView::new(record, short_url)
    });
    Ok(Json(page.into()))
}

pub async fn get_url_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LinkView>>> {
    let id = parse_link_id(&id)?;
    let record = state.shortener().get(identity.user_id, id).await?;
    let short_url = state.short_url(&record.short_token);

    Ok(Json(ApiResponse::ok(LinkView::new(record, short_url))))
}

pub async fn get_url_stats_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LinkStatsView>>> {
    let id = parse_link_id(&id)?;
    let stats = state.shortener().stats(identity.user_id, id).await?;
    let short_url = state.short_url(&stats.short_token);

    Ok(Json(ApiResponse::ok(LinkStatsView::new(stats, short_url))))
}

pub async fn update_url_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateUrlRequest>,
) -> Result<Json<ApiResponse<LinkView>>> {
    let id = parse_link_id(&id)?;
    let record = state
        .shortener()
        .update(identity.user_id, id, request.into())
        .await?;
    let short_url = state.short_url(&record.short_token);

    Ok(Json(ApiResponse::ok(LinkView::new(record, short_url))))
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_link_id(&id)?;
    state.shortener().delete(identity.user_id, id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "URL deleted successfully",
    }))
}

pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("Not found - {}", uri.path()))
}
