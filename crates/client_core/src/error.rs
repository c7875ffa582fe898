//! Error taxonomy for remote collaborators and local validation.

use reqwest::StatusCode;
use thiserror::Error;

/// Local validation failures. Raised before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill out all fields before submitting.")]
    MissingFields,
    #[error("Amount must be a valid number.")]
    InvalidAmount,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("service responded with status {status}")]
    Status { status: StatusCode },
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid service url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Timeout,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Timeout => ErrorCategory::Timeout,
            Self::Status { .. }
            | Self::Transport(_)
            | Self::Decode(_)
            | Self::InvalidEndpoint { .. } => ErrorCategory::Transport,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.category() == ErrorCategory::Timeout
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status { status }
        } else {
            Self::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_each_variant() {
        assert_eq!(
            ClientError::from(ValidationError::MissingFields).category(),
            ErrorCategory::Validation
        );
        assert_eq!(ClientError::Timeout.category(), ErrorCategory::Timeout);
        assert_eq!(
            ClientError::Status {
                status: StatusCode::BAD_GATEWAY
            }
            .category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            ClientError::Decode("missing field `id`".into()).category(),
            ErrorCategory::Transport
        );
    }

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ClientError::from(ValidationError::MissingFields).to_string(),
            "Please fill out all fields before submitting."
        );
        assert_eq!(
            ValidationError::InvalidAmount.to_string(),
            "Amount must be a valid number."
        );
    }
}
