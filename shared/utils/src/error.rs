use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ShelfwatchError {
    #[error("File read error: {filename} - {message}")]
    FileRead { filename: String, message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Mail send error: {message}")]
    MailSend { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ShelfwatchError {
    pub fn file_read(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileRead {
            filename: filename.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    pub fn mail_send(message: impl Into<String>) -> Self {
        Self::MailSend {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
            Self::MailSend { .. } => "MAIL_SEND_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::FileRead { .. } => 422,
            Self::Validation { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::Export { .. } => 500,
            Self::MailSend { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }

    /// The part of the error meant for the end user, without the category prefix.
    pub fn user_message(&self) -> &str {
        match self {
            Self::FileRead { message, .. }
            | Self::Validation { message, .. }
            | Self::Configuration { message }
            | Self::Export { message }
            | Self::MailSend { message }
            | Self::Internal { message } => message,
        }
    }
}

pub type ShelfwatchResult<T> = Result<T, ShelfwatchError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<ShelfwatchError> for ErrorResponse {
    fn from(error: ShelfwatchError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.user_message().to_string(),
            details: None,
        }
    }
}

impl From<csv::Error> for ShelfwatchError {
    fn from(error: csv::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ShelfwatchError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::export(error.to_string())
    }
}

impl From<config::ConfigError> for ShelfwatchError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<serde_json::Error> for ShelfwatchError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}
