/// Error type for client operations
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("{status} {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    /// No token is stored
    #[error("Not signed in")]
    SignedOut,
}

/// Error body returned by the board API and most identity providers
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,

    #[serde(default, alias = "error_description")]
    pub message: String,
}

impl ClientError {
    /// True for 401 answers, i.e. the token is missing, expired or rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. } | ClientError::SignedOut)
    }

    /// Builds an error from a non-success response, keeping its JSON error body if any
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();

        let body = response.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
            error: String::new(),
            message: String::new(),
        });

        ClientError::Api {
            status: status.as_u16(),
            error: if body.error.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                body.error
            },
            message: body.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let err = ClientError::Api {
            status: 401,
            error: "unauthorized".to_string(),
            message: "Token expired".to_string(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "401 unauthorized: Token expired");

        assert!(ClientError::SignedOut.is_unauthorized());
        assert!(!ClientError::Api {
            status: 500,
            error: "internal_error".to_string(),
            message: "Query execution failed".to_string(),
        }
        .is_unauthorized());
    }
}
