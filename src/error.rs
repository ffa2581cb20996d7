use thiserror::Error;

/// Error kinds at the widget boundary. The remote contract only reports
/// `success: false`, so every failure is classified here instead.
#[derive(Error, Debug, Clone)]
pub enum BookingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookingError {
    /// Message shown on the error screen.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Network(_) => "Could not reach the booking service.".to_string(),
            BookingError::Api(msg) | BookingError::Validation(msg) | BookingError::Auth(msg) => msg.clone(),
            BookingError::Config(_) => "The booking widget is not configured correctly.".to_string(),
        }
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        BookingError::Network(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for BookingError {
    fn from(err: reqwest_middleware::Error) -> Self {
        BookingError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Validation(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
