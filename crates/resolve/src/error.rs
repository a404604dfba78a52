use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Out-of-range threshold, malformed vocabulary token, etc.
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },
}
