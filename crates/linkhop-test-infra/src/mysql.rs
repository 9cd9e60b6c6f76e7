use crate::{Result, TestInfraError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use tracing::debug;
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;
const CREDENTIAL: &str = "linkhop";

#[derive(Debug, Clone, TypedBuilder)]
pub struct MySqlOptions {
    #[builder(default = "8.4".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = 10)]
    max_connections: u32,
    /// MySQL logs "ready" before it accepts TCP clients, so the first
    /// connects are retried.
    #[builder(default = 20)]
    connect_attempts: usize,
    #[builder(default = Duration::from_millis(500))]
    retry_interval: Duration,
}

impl Default for MySqlOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A throwaway MySQL with the `linkhop` database and a connected pool.
///
/// The schema is left to the caller. The container is removed on drop.
pub struct MySqlServer {
    _container: ContainerAsync<GenericImage>,
    pool: MySqlPool,
    database_url: String,
}

impl MySqlServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(MySqlOptions::default()).await
    }

    pub async fn start_with(options: MySqlOptions) -> Result<Self> {
        let container = GenericImage::new("mysql", options.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", CREDENTIAL)
            .with_env_var("MYSQL_USER", CREDENTIAL)
            .with_env_var("MYSQL_PASSWORD", CREDENTIAL)
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(MYSQL_PORT).await?;
        let database_url = dsn(&host.to_string(), port);
        let pool = connect_with_retry(&database_url, &options).await?;

        Ok(Self {
            _container: container,
            pool,
            database_url,
        })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn dsn(host: &str, port: u16) -> String {
    format!("mysql://{CREDENTIAL}:{CREDENTIAL}@{host}:{port}/{CREDENTIAL}")
}

async fn connect_with_retry(url: &str, options: &MySqlOptions) -> Result<MySqlPool> {
    let attempts = options.connect_attempts.max(1);
    let mut attempt = 1;
    loop {
        match MySqlPoolOptions::new()
            .max_connections(options.max_connections)
            .connect(url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(source) if attempt >= attempts => {
                return Err(TestInfraError::Unreachable { attempts, source });
            }
            Err(error) => {
                debug!(attempt, %error, "mysql not accepting connections yet");
                attempt += 1;
                tokio::time::sleep(options.retry_interval).await;
            }
        }
    }
}
