use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown category: {category}. Valid: {}", .valid.join(", "))]
    InvalidCategory { category: String, valid: Vec<String> },

    #[error("Invalid category table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
