use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "LINKHOP_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "LINKHOP_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "LINKHOP_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "LINKHOP_MYSQL_DSN";
pub const JWT_SECRET_ENV: &str = "LINKHOP_JWT_SECRET";
pub const JWT_TTL_HOURS_ENV: &str = "LINKHOP_JWT_TTL_HOURS";
pub const TOKEN_LENGTH_ENV: &str = "LINKHOP_TOKEN_LENGTH";
pub const API_RATE_LIMIT_ENV: &str = "LINKHOP_API_RATE_LIMIT";
pub const REDIRECT_RATE_LIMIT_ENV: &str = "LINKHOP_REDIRECT_RATE_LIMIT";
pub const RATE_LIMIT_WINDOW_SECS_ENV: &str = "LINKHOP_RATE_LIMIT_WINDOW_SECS";
pub const LOG_FORMAT_ENV: &str = "LINKHOP_LOG_FORMAT";
pub const ADMIN_EMAIL_ENV: &str = "LINKHOP_ADMIN_EMAIL";
pub const ADMIN_PASSWORD_ENV: &str = "LINKHOP_ADMIN_PASSWORD";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4000";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "linkhop-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of every `shortUrl` handed out by the API.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = JWT_SECRET_ENV, hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = JWT_TTL_HOURS_ENV, default_value_t = 168)]
    pub jwt_ttl_hours: u32,

    #[arg(
        long,
        env = TOKEN_LENGTH_ENV,
        default_value_t = 8,
        value_parser = clap::value_parser!(u8).range(4..=32)
    )]
    pub token_length: u8,

    #[arg(long, env = API_RATE_LIMIT_ENV, default_value_t = 100)]
    pub api_rate_limit: u32,

    #[arg(long, env = REDIRECT_RATE_LIMIT_ENV, default_value_t = 1000)]
    pub redirect_rate_limit: u32,

    #[arg(long, env = RATE_LIMIT_WINDOW_SECS_ENV, default_value_t = 900)]
    pub rate_limit_window_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// Administrator created at startup if it does not exist yet.
    #[arg(long, env = ADMIN_EMAIL_ENV, requires = "admin_password")]
    pub admin_email: Option<String>,

    #[arg(long, env = ADMIN_PASSWORD_ENV, requires = "admin_email", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["linkhop-gateway", "--jwt-secret", "s3cret"]).unwrap();

        assert_eq!(cli.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.jwt_ttl_hours, 168);
        assert_eq!(cli.token_length, 8);
        assert_eq!(cli.log_format, LogFormatArg::Text);
        assert!(cli.admin_email.is_none());
        assert!(cli.admin_password.is_none());
    }

    #[test]
    fn admin_bootstrap_needs_both_flags() {
        let cli = CLI::try_parse_from([
            "linkhop-gateway",
            "--jwt-secret",
            "s3cret",
            "--admin-email",
            "root@example.com",
            "--admin-password",
            "Str0ng!pass",
        ])
        .unwrap();
        assert_eq!(cli.admin_email.as_deref(), Some("root@example.com"));
        assert_eq!(cli.admin_password.as_deref(), Some("Str0ng!pass"));

        for partial in [
            ["--admin-email", "root@example.com"],
            ["--admin-password", "Str0ng!pass"],
        ] {
            let result = CLI::try_parse_from(
                ["linkhop-gateway", "--jwt-secret", "s3cret"]
                    .into_iter()
                    .chain(partial),
            );
            assert!(result.is_err(), "{partial:?}");
        }
    }

    #[test]
    fn mysql_requires_dsn() {
        let result = CLI::try_parse_from([
            "linkhop-gateway",
            "--jwt-secret",
            "s3cret",
            "--storage",
            "mysql",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn token_length_is_bounded() {
        let result = CLI::try_parse_from([
            "linkhop-gateway",
            "--jwt-secret",
            "s3cret",
            "--token-length",
            "2",
        ]);
        assert!(result.is_err());
    }
}
