use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to start container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
    #[error("mysql not reachable after {attempts} attempts: {source}")]
    Unreachable {
        attempts: usize,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
