use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Pagination worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
