use crate::jwt::JwtService;
use crate::password::{hash_password, validate_strength, verify_password};
use crate::{AuthError, Result};
use async_trait::async_trait;
use linkhop_core::{NewUser, Role, StorageError, UserId, UserRecord, UserRepository};
use std::sync::Arc;
use tracing::{debug, info};

/// The caller behind a validated bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserRecord,
    pub token: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Creates a regular user and logs them in.
    async fn register(&self, email: &str, password: &str) -> Result<AuthSession>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession>;

    async fn me(&self, user_id: UserId) -> Result<UserRecord>;

    /// Validates a bearer token without touching the user store.
    fn authenticate(&self, token: &str) -> Result<Identity>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;
}

/// [`Authenticator`] backed by a [`UserRepository`].
#[derive(Debug)]
pub struct AuthService<U> {
    users: Arc<U>,
    jwt: Arc<JwtService>,
}

impl<U> Clone for AuthService<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            jwt: Arc::clone(&self.jwt),
        }
    }
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, jwt: JwtService) -> Self {
        Self::from_shared(Arc::new(users), jwt)
    }

    pub fn from_shared(users: Arc<U>, jwt: JwtService) -> Self {
        Self {
            users,
            jwt: Arc::new(jwt),
        }
    }

    /// Creates a user with an explicit role. Registration always uses
    /// [`Role::User`]; this is how operators seed administrators.
    pub async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<UserRecord> {
        let email = normalize_email(email)?;
        validate_strength(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .insert_user(NewUser {
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                StorageError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Storage(other),
            })?;

        info!(user = %user.id, role = %user.role, "created user");
        Ok(user)
    }

    /// Seeds the administrator configured at startup.
    ///
    /// Restarting with the same email returns the existing admin. An email
    /// already held by a regular user fails with [`AuthError::EmailTaken`].
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<UserRecord> {
        match self.create_user(email, password, Role::Admin).await {
            Err(AuthError::EmailTaken) => {
                let email = normalize_email(email)?;
                match self.users.find_user_by_email(&email).await? {
                    Some(user) if user.role == Role::Admin => {
                        info!(user = %user.id, "admin account already present");
                        Ok(user)
                    }
                    _ => Err(AuthError::EmailTaken),
                }
            }
            other => other,
        }
    }

    fn session(&self, user: UserRecord) -> Result<AuthSession> {
        let token = self.jwt.issue(&user)?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl<U: UserRepository> Authenticator for AuthService<U> {
    async fn register(&self, email: &str, password: &str) -> Result<AuthSession> {
        let user = self.create_user(email, password, Role::User).await?;
        self.session(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let Some(user) = self.users.find_user_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash)? {
            debug!(user = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user = %user.id, "user logged in");
        self.session(user)
    }

    async fn me(&self, user_id: UserId) -> Result<UserRecord> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn authenticate(&self, token: &str) -> Result<Identity> {
        let claims = self.jwt.validate(token)?;
        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.list_users().await?)
    }
}

/// Trims and lowercases an email after a minimal `local@domain.tld` check.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let invalid = || AuthError::Validation("Invalid email format".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if local.is_empty()
        || host.is_empty()
        || tld.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(email)
}
