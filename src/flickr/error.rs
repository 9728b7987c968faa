use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing or invalid API key")]
    InvalidApiKey,

    #[error("Failed to parse response")]
    InvalidResponse,

    #[error("Failed to send request")]
    Request,

    #[error("HTTP error {0}")]
    Status(StatusCode),

    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl Error {
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request => true,
            // 10: search unavailable, 105: service unavailable, 106: write failed
            Error::Api { code, .. } => matches!(code, 10 | 105 | 106),
            Error::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Error::InvalidApiKey | Error::InvalidResponse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(Error::Request.is_transient());
        assert!(Error::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(Error::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(
            Error::Api {
                code: 105,
                message: "Service currently unavailable".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!Error::InvalidApiKey.is_transient());
        assert!(!Error::InvalidResponse.is_transient());
        assert!(!Error::Status(StatusCode::FORBIDDEN).is_transient());
        assert!(
            !Error::Api {
                code: 100,
                message: "Invalid API Key".into()
            }
            .is_transient()
        );
    }
}
