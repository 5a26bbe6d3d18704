use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Start-up and terminal failures that end the session. Request failures
/// stay inside the UI as [`crate::client::ClientError`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("could not build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("base_url {url:?} is not a valid URL: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("could not install logger: {0}")]
    Logging(String),
}
