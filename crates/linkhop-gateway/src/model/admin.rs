use jiff::Timestamp;
use linkhop_core::{LinkId, Role, UserId, UserRecord};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
}

impl From<UserRecord> for AdminUserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUrlView {
    pub id: LinkId,
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    /// `"Unknown"` when the owner no longer exists.
    pub owner_email: String,
    pub clicks: u64,
    pub created_at: Timestamp,
    pub is_active: bool,
}
