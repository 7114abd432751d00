use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleLensError {
    #[error("Data source request failed: {0}")]
    Source(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CycleLensError>;
