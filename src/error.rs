use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot format for '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
    #[error("invalid value '{value}' for {key}")]
    Config { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
