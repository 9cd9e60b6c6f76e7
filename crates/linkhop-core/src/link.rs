use crate::id::{LinkId, UserId};
use crate::token::ShortToken;
use jiff::Timestamp;

/// A stored link record.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: LinkId,
    pub short_token: ShortToken,
    /// The absolute URL the short token redirects to.
    pub original_url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub owner: UserId,
    /// Only ever changed by the redirect path.
    pub clicks: u64,
    /// `None` until the first redirect.
    pub last_accessed_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LinkRecord {
    /// Case-insensitive substring match on the target URL or the title.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.original_url.to_lowercase().contains(needle)
            || self.title.to_lowercase().contains(needle)
    }
}

/// A link about to be inserted. The store assigns the id, the timestamps,
/// a zero click count and marks it active.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_token: ShortToken,
    pub original_url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub owner: UserId,
}

/// Partial update applied by the owner. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none()
            && self.title.is_none()
            && self.tags.is_none()
            && self.is_active.is_none()
    }

    /// Applies the patch in place and refreshes `updated_at`.
    pub fn apply(self, record: &mut LinkRecord, now: Timestamp) {
        if let Some(url) = self.original_url {
            record.original_url = url;
        }
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
        if let Some(active) = self.is_active {
            record.is_active = active;
        }
        record.updated_at = now;
    }
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Paging and filtering for an owner's link listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Lowercased, trimmed search needle. `None` lists everything.
    pub search: Option<String>,
}

impl LinkQuery {
    /// Normalises raw query parameters: zero or missing values fall back to
    /// the defaults, `limit` is clamped to [`MAX_LIMIT`] and blank searches
    /// are dropped.
    pub fn new(page: Option<u32>, limit: Option<u32>, search: Option<&str>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Self {
            page,
            limit,
            search,
        }
    }

    /// Number of records to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    /// `ceil(total_items / limit)`.
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(u64::from(self.limit.max(1)))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_items: self.total_items,
        }
    }
}

/// Click statistics for a single link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStats {
    pub id: LinkId,
    pub short_token: ShortToken,
    pub original_url: String,
    pub title: String,
    pub total_clicks: u64,
    pub created_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub is_active: bool,
}

impl From<LinkRecord> for LinkStats {
    fn from(record: LinkRecord) -> Self {
        Self {
            id: record.id,
            short_token: record.short_token,
            original_url: record.original_url,
            title: record.title,
            total_clicks: record.clicks,
            created_at: record.created_at,
            last_accessed_at: record.last_accessed_at,
            is_active: record.is_active,
        }
    }
}
