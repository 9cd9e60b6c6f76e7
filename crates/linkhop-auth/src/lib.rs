//! Accounts, password hashing and bearer tokens.
//!
//! [`AuthService`] registers and logs users in against a
//! [`linkhop_core::UserRepository`], issuing HS256 JWTs through
//! [`JwtService`]. The gateway only depends on the [`Authenticator`] trait.

mod error;
pub mod jwt;
pub mod password;
pub mod service;

pub use error::AuthError;
pub use jwt::{Claims, JwtService};
pub use service::{AuthService, AuthSession, Authenticator, Identity};

pub type Result<T> = std::result::Result<T, AuthError>;
