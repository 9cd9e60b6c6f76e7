use linkhop_auth::AuthSession;
use linkhop_core::{Role, UserId, UserRecord};
use serde::{Deserialize, Serialize};

/// Body of both register and login.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: UserView,
    pub token: String,
}

impl From<AuthSession> for SessionView {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}
