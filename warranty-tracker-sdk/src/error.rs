use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Report is not completed (status: {0})")]
    ReportNotCompleted(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
