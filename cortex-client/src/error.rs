use thiserror::Error;

/// Marker the inference endpoint puts in a 400 body when a model is not
/// served in the account's region.
pub const REGION_UNAVAILABLE_MARKER: &str = "unavailable in your region";

#[derive(Error, Debug)]
pub enum CortexError {
    #[error("Credential not found. Set {env_var} environment variable or add `{field}` to config.")]
    MissingCredential { field: String, env_var: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model unavailable. Enable cross-region inference in Snowflake: {message}")]
    RegionUnavailable { message: String },

    #[error("400 Bad Request: {message}")]
    BadRequest { message: String },

    #[error("401 Unauthorized: Check your Personal Access Token")]
    Unauthorized,

    #[error("403 Forbidden: Check your token permissions")]
    Forbidden,

    #[error("404 Not Found: Check account identifier")]
    NotFound,

    #[error("500 Server Error: {message}")]
    ServerError { message: String },

    #[error("503 Service Unavailable: Snowflake Cortex service temporarily down")]
    ServiceUnavailable,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Error reading streaming response: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Coarse classification of a [`CortexError`], stable enough to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    InvalidRequest,
    RegionUnavailable,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    ServiceUnavailable,
    Http,
    Transport,
    Stream,
    Config,
}

impl CortexError {
    /// Map an unsuccessful HTTP status and its body to an error.
    ///
    /// For 400 responses the JSON `message` field is preferred over the raw
    /// body when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => {
                let message = error_message(body);
                if message.contains(REGION_UNAVAILABLE_MARKER) {
                    Self::RegionUnavailable { message }
                } else {
                    Self::BadRequest { message }
                }
            }
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::ServerError {
                message: body.to_string(),
            },
            503 => Self::ServiceUnavailable,
            _ => Self::Http {
                status,
                message: error_message(body),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::RegionUnavailable { .. } => ErrorKind::RegionUnavailable,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound => ErrorKind::NotFound,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            Self::Http { .. } => ErrorKind::Http,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Stream(_) => ErrorKind::Stream,
            Self::ConfigError(_) | Self::Io(_) | Self::TomlParse(_) | Self::TomlSerialize(_) => {
                ErrorKind::Config
            }
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}

pub type Result<T> = std::result::Result<T, CortexError>;
