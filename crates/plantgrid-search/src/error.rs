use plantgrid_logic::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("a search is already running")]
    AlreadyRunning,

    #[error("invalid search config: {0:?}")]
    InvalidConfig(Vec<ConfigError>),

    #[error("layout worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
