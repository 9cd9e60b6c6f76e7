use crate::error::Result;
use crate::extract::AdminUser;
use crate::model::{AdminUrlView, AdminUserView, ApiResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use std::collections::HashMap;

pub async fn list_users_handler(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<ApiResponse<Vec<AdminUserView>>>> {
    let users = state.auth().list_users().await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(AdminUserView::from).collect(),
    )))
}

pub async fn list_all_urls_handler(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<ApiResponse<Vec<AdminUrlView>>>> {
    let links = state.shortener().list_all().await?;
    let emails: HashMap<_, _> = state
        .auth()
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id, user.email))
        .collect();

    let views = links
        .into_iter()
        .map(|record| AdminUrlView {
            id: record.id,
            short_url: state.short_url(&record.short_token),
            short_id: record.short_token.into(),
            original_url: record.original_url,
            owner_email: emails
                .get(&record.owner)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            clicks: record.clicks,
            created_at: record.created_at,
            is_active: record.is_active,
        })
        .collect();

    Ok(Json(ApiResponse::ok(views)))
}
