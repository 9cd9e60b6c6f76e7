use async_trait::async_trait;
use jiff::Timestamp;
use linkhop_core::repository::{LinkRepository, ReadRepository, Result, UserRepository};
use linkhop_core::{
    LinkId, LinkPatch, LinkQuery, LinkRecord, NewLink, NewUser, Page, Role, ShortToken,
    StorageError, UserId, UserRecord,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

const LINKS_DDL: &str = include_str!("../ddl/mysql/links.sql");
const USERS_DDL: &str = include_str!("../ddl/mysql/users.sql");

const LINK_COLUMNS: &str = "id, short_token, original_url, title, tags, owner_id, clicks, \
                            last_accessed_at, is_active, created_at, updated_at";

/// MySQL implementation of the repository contracts.
///
/// Deleting a link is a soft delete through `deleted_at`. Reads only return
/// live rows, while [`ReadRepository::exists_by_token`] also sees deleted
/// rows, so a short token is never handed out twice. Uniqueness of
/// `short_token` is enforced by the `uk_links_short_token` index.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `links` and `users` tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for ddl in [LINKS_DDL, USERS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        info!("mysql schema is up to date");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn now_millis() -> i64 {
    Timestamp::now().as_millisecond()
}

/// Current time truncated to the millisecond precision of the timestamp columns.
fn now() -> Timestamp {
    let ts = Timestamp::now();
    Timestamp::from_millisecond(ts.as_millisecond()).unwrap_or(ts)
}

fn parse_timestamp(column: &str, millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{millis}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StorageError::InvalidData(message),
        sqlx::Error::RowNotFound => StorageError::NotFound,
        _ => StorageError::Query(message),
    }
}

/// Escapes `LIKE` wildcards so the search needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn link_from_row(row: &MySqlRow) -> Result<LinkRecord> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let short_token: String = row.try_get("short_token").map_err(map_sqlx_error)?;
    let tags: String = row.try_get("tags").map_err(map_sqlx_error)?;
    let owner: String = row.try_get("owner_id").map_err(map_sqlx_error)?;
    let last_accessed_at: Option<i64> =
        row.try_get("last_accessed_at").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    Ok(LinkRecord {
        id: id
            .parse::<LinkId>()
            .map_err(|e| StorageError::InvalidData(format!("link id: {e}")))?,
        short_token: ShortToken::new_unchecked(short_token),
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        title: row.try_get("title").map_err(map_sqlx_error)?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| StorageError::InvalidData(format!("link tags: {e}")))?,
        owner: owner
            .parse::<UserId>()
            .map_err(|e| StorageError::InvalidData(format!("link owner: {e}")))?,
        clicks: row.try_get("clicks").map_err(map_sqlx_error)?,
        last_accessed_at: last_accessed_at
            .map(|millis| parse_timestamp("last_accessed_at", millis))
            .transpose()?,
        is_active: row.try_get("is_active").map_err(map_sqlx_error)?,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
    })
}

fn user_from_row(row: &MySqlRow) -> Result<UserRecord> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let role: String = row.try_get("role").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(UserRecord {
        id: id
            .parse::<UserId>()
            .map_err(|e| StorageError::InvalidData(format!("user id: {e}")))?,
        email: row.try_get("email").map_err(map_sqlx_error)?,
        password_hash: row.try_get("password_hash").map_err(map_sqlx_error)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StorageError::InvalidData(format!("user role: {e}")))?,
        created_at: parse_timestamp("created_at", created_at)?,
    })
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| StorageError::InvalidData(format!("link tags: {e}")))
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_token(&self, token: &ShortToken) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE short_token = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(link_from_row).transpose()
    }

    async fn exists_by_token(&self, token: &ShortToken) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM links
            WHERE short_token = ?
            LIMIT 1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl LinkRepository for MySqlRepository {
    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        let now = now();
        let record = LinkRecord {
            id: LinkId::new(),
            short_token: link.short_token,
            original_url: link.original_url,
            title: link.title,
            tags: link.tags,
            owner: link.owner,
            clicks: 0,
            last_accessed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO links
                (id, short_token, original_url, title, tags, owner_id,
                 clicks, last_accessed_at, is_active, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, NULL, TRUE, ?, ?, NULL)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.short_token.as_str())
        .bind(&record.original_url)
        .bind(&record.title)
        .bind(encode_tags(&record.tags)?)
        .bind(record.owner.to_string())
        .bind(now.as_millisecond())
        .bind(now.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.short_token.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn find_owned(&self, id: LinkId, owner: UserId) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE id = ? AND owner_id = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(link_from_row).transpose()
    }

    async fn list_owned(&self, owner: UserId, query: &LinkQuery) -> Result<Page<LinkRecord>> {
        let pattern = query.search.as_deref().map(like_pattern);
        let filter = "owner_id = ? AND deleted_at IS NULL \
                      AND (? IS NULL OR LOWER(original_url) LIKE ? OR LOWER(title) LIKE ?)";

        let total_items: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM links WHERE {filter}"
        ))
        .bind(owner.to_string())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE {filter} \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(owner.to_string())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(query.limit)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Page {
            items: rows.iter().map(link_from_row).collect::<Result<_>>()?,
            page: query.page,
            limit: query.limit,
            total_items: u64::try_from(total_items).unwrap_or_default(),
        })
    }

    async fn list_all(&self) -> Result<Vec<LinkRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(link_from_row).collect()
    }

    async fn update_owned(
        &self,
        id: LinkId,
        owner: UserId,
        patch: LinkPatch,
    ) -> Result<LinkRecord> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE id = ? AND owner_id = ? AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(id.to_string())
        .bind(owner.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StorageError::NotFound)?;

        let mut record = link_from_row(&row)?;
        patch.apply(&mut record, now());

        sqlx::query(
            r#"
            UPDATE links
            SET original_url = ?, title = ?, tags = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.original_url)
        .bind(&record.title)
        .bind(encode_tags(&record.tags)?)
        .bind(record.is_active)
        .bind(record.updated_at.as_millisecond())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(id = %id, "updated link");
        Ok(record)
    }

    async fn delete_owned(&self, id: LinkId, owner: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = ?
            WHERE id = ?
              AND owner_id = ?
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_millis())
        .bind(id.to_string())
        .bind(owner.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_click_and_touch(&self, token: &ShortToken) -> Result<LinkRecord> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // The row lock taken by this UPDATE serializes concurrent visits;
        // GREATEST keeps last_accessed_at from moving backwards.
        let result = sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1,
                last_accessed_at = GREATEST(COALESCE(last_accessed_at, 0), ?)
            WHERE short_token = ?
              AND is_active = TRUE
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_millis())
        .bind(token.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_token = ? LIMIT 1"
        ))
        .bind(token.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        let record = link_from_row(&row)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(record)
    }
}

#[async_trait]
impl UserRepository for MySqlRepository {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(record.email)),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = ? LIMIT 1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(user_from_row).collect()
    }
}
