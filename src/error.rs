use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
