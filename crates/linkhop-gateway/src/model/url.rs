use jiff::Timestamp;
use linkhop_core::{CreateLink, LinkId, LinkPatch, LinkQuery, LinkRecord, LinkStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub original_url: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<CreateUrlRequest> for CreateLink {
    fn from(request: CreateUrlRequest) -> Self {
        CreateLink {
            original_url: request.original_url,
            title: request.title,
            tags: request.tags,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlRequest {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl From<UpdateUrlRequest> for LinkPatch {
    fn from(request: UpdateUrlRequest) -> Self {
        LinkPatch {
            original_url: request.original_url,
            title: request.title,
            tags: request.tags,
            is_active: request.is_active,
        }
    }
}

/// Raw listing parameters. Unparseable numbers fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListUrlsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl From<ListUrlsParams> for LinkQuery {
    fn from(params: ListUrlsParams) -> Self {
        let number = |raw: Option<String>| raw.and_then(|s| s.trim().parse::<u32>().ok());
        LinkQuery::new(
            number(params.page),
            number(params.limit),
            params.search.as_deref(),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub id: LinkId,
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub clicks: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub is_active: bool,
}

impl LinkView {
    pub fn new(record: LinkRecord, short_url: String) -> Self {
        Self {
            id: record.id,
            short_id: record.short_token.into(),
            short_url,
            original_url: record.original_url,
            title: record.title,
            tags: record.tags,
            clicks: record.clicks,
            created_at: record.created_at,
            updated_at: record.updated_at,
            last_accessed_at: record.last_accessed_at,
            is_active: record.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatsView {
    pub id: LinkId,
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub title: String,
    pub total_clicks: u64,
    pub created_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub is_active: bool,
}

impl LinkStatsView {
    pub fn new(stats: LinkStats, short_url: String) -> Self {
        Self {
            id: stats.id,
            short_id: stats.short_token.into(),
            short_url,
            original_url: stats.original_url,
            title: stats.title,
            total_clicks: stats.total_clicks,
            created_at: stats.created_at,
            last_accessed_at: stats.last_accessed_at,
            is_active: stats.is_active,
        }
    }
}
