mod admin;
mod auth;
mod url;

pub use admin::{AdminUrlView, AdminUserView};
pub use auth::{Credentials, SessionView, UserView};
pub use url::{CreateUrlRequest, LinkStatsView, LinkView, ListUrlsParams, UpdateUrlRequest};

use linkhop_core::Page;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
            total_items: page.total_items,
        };
        Self {
            success: true,
            data: page.items,
            pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}
