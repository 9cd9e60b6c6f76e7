mod cli;

use crate::cli::{LogFormatArg, StorageBackendArg, CLI};
use clap::Parser;
use jiff::SignedDuration;
use linkhop_auth::{AuthService, JwtService};
use linkhop_core::{LinkRepository, UserRepository};
use linkhop_gateway::rate_limit::RateLimitConfig;
use linkhop_gateway::{App, AppState, RateLimits};
use linkhop_generator::RandomGenerator;
use linkhop_redirector::RedirectorService;
use linkhop_shortener::ShortenerService;
use linkhop_storage::{InMemoryRepository, MySqlRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        token_length = config.token_length,
        "starting linkhop gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => run_server(config, InMemoryRepository::new()).await?,
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .ok_or("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.migrate().await?;
            run_server(config, repository).await?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn run_server<R>(config: CLI, repository: R) -> Result<(), Box<dyn std::error::Error>>
where
    R: LinkRepository + UserRepository + Clone,
{
    let generator = RandomGenerator::builder()
        .length(usize::from(config.token_length))
        .build();
    let jwt = JwtService::new(
        &config.jwt_secret,
        SignedDuration::from_hours(i64::from(config.jwt_ttl_hours)),
    );

    let auth = AuthService::new(repository.clone(), jwt);
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let admin = auth.ensure_admin(email, password).await?;
        info!(user = %admin.id, email = %admin.email, "admin account ready");
    }

    let state = AppState::new(
        Arc::new(ShortenerService::new(repository.clone(), generator)),
        Arc::new(RedirectorService::new(repository)),
        Arc::new(auth),
        config.public_base_url,
    );

    let window = Duration::from_secs(config.rate_limit_window_secs);
    let limits = RateLimits::builder()
        .api(
            RateLimitConfig::builder()
                .max_requests(config.api_rate_limit)
                .window(window)
                .build(),
        )
        .redirect(
            RateLimitConfig::builder()
                .max_requests(config.redirect_rate_limit)
                .window(window)
                .build(),
        )
        .build();

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(
        listener,
        App::router(state, limits).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
