use thiserror::Error;

use crate::runtime::contract::ValidationError;

/// Every way a mail request can fail. Only validation failures are the
/// caller's fault; everything else is reported as an internal error.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Storage(String),

    #[error("template not found: {key}")]
    TemplateNotFound { key: String },

    #[error("template {key} is not valid UTF-8: {source}")]
    TemplateEncoding {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("{message}")]
    Delivery { message: String },

    #[error("{message}")]
    Archive { key: String, message: String },
}

impl HandlerError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
