use crate::{AuthError, Result};
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use linkhop_core::{Role, UserId, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

/// Bearer token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: UserId,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 tokens.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: SignedDuration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str, ttl: SignedDuration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &UserRecord) -> Result<String> {
        let iat = Timestamp::now().as_second();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat,
            exp: iat.saturating_add(self.ttl.as_secs()),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(AuthError::Token)
    }

    /// Checks signature and expiry. Every failure collapses into
    /// [`AuthError::InvalidToken`].
    pub fn validate(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "rejected bearer token");
                AuthError::InvalidToken
            })
    }
}
