//! City directory error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Directory API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DirectoryError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Failed to load city data: network error.".to_string(),
            Self::Api { message, .. } => format!("Failed to load city data: {}", message),
            Self::Parse(_) => "Failed to load city data: unexpected response.".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Parse(_) => false,
        }
    }
}

impl From<DirectoryError> for wxbuddy_core::AppError {
    fn from(e: DirectoryError) -> Self {
        use wxbuddy_core::error::{DirectoryError as CoreDirectoryError, ReqwestErrorExt};

        match e {
            DirectoryError::Network(err) => Self::Network(err.into_network_error()),
            DirectoryError::Api { status, .. } if status >= 500 => {
                Self::Directory(CoreDirectoryError::Unavailable)
            }
            DirectoryError::Api { message, .. } | DirectoryError::Parse(message) => {
                Self::Directory(CoreDirectoryError::ApiError(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = DirectoryError::Api {
            status: 400,
            message: "Invalid ODSQL query".into(),
        };
        assert_eq!(err.user_message(), "Failed to load city data: Invalid ODSQL query");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_app_error_mapping() {
        let app: wxbuddy_core::AppError = DirectoryError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        }
        .into();
        assert!(matches!(
            app,
            wxbuddy_core::AppError::Directory(wxbuddy_core::DirectoryError::Unavailable)
        ));
    }
}
