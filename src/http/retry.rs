//! Retry policy and error classification for release metadata requests.

use reqwest::StatusCode;
use std::time::Duration;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Responses that will not change if the request is repeated.
#[derive(Debug, PartialEq, Eq)]
pub enum NonRetryableError {
    /// HTTP 429, or 403 carrying a rate limit message
    RateLimitExceeded,
    /// HTTP 401
    AuthenticationFailed,
    /// HTTP 404, e.g. a repository without any published release
    NotFound,
    /// HTTP 403 without a rate limit message
    Forbidden,
    /// Any other 4xx status
    ClientError(u16),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded => write!(
                f,
                "Rate limit exceeded. Try again later or set the GITHUB_TOKEN environment variable."
            ),
            NonRetryableError::AuthenticationFailed => {
                write!(f, "Authentication failed. Check your GITHUB_TOKEN.")
            }
            NonRetryableError::NotFound => write!(f, "Not found: no published release"),
            NonRetryableError::Forbidden => write!(f, "Access forbidden"),
            NonRetryableError::ClientError(status) => write!(f, "Request error: HTTP {}", status),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Returns `Err` for statuses that are not worth retrying.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        // Connection errors, timeouts, etc.
        return Ok(());
    };

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed),
        StatusCode::FORBIDDEN if error.to_string().contains("rate limit") => {
            Err(NonRetryableError::RateLimitExceeded)
        }
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(s.as_u16())),
        _ => Ok(()),
    }
}

/// Wrap an `error_for_status()` failure, marking it non-retryable when it is.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_error(status: usize) -> reqwest::Error {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(status)
            .create_async()
            .await;

        let response = reqwest::Client::new()
            .get(server.url())
            .send()
            .await
            .unwrap();
        response.error_for_status().unwrap_err()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(RetryPolicy::once().max_attempts, 1);
    }

    #[test]
    fn test_non_retryable_error_display() {
        assert!(
            NonRetryableError::RateLimitExceeded
                .to_string()
                .contains("GITHUB_TOKEN")
        );
        assert!(NonRetryableError::NotFound.to_string().contains("Not found"));
        assert!(
            NonRetryableError::ClientError(422)
                .to_string()
                .contains("HTTP 422")
        );
    }

    #[tokio::test]
    async fn test_classify_client_errors() {
        let cases = [
            (401, NonRetryableError::AuthenticationFailed),
            (403, NonRetryableError::Forbidden),
            (404, NonRetryableError::NotFound),
            (429, NonRetryableError::RateLimitExceeded),
            (400, NonRetryableError::ClientError(400)),
        ];

        for (status, expected) in cases {
            let err = status_error(status).await;
            assert_eq!(classify_error(&err), Err(expected), "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable() {
        let err = status_error(503).await;
        assert!(classify_error(&err).is_ok());

        let wrapped = check_retryable(status_error(500).await);
        assert!(wrapped.downcast_ref::<NonRetryableError>().is_none());
    }

    #[tokio::test]
    async fn test_check_retryable_marks_not_found() {
        let wrapped = check_retryable(status_error(404).await);
        assert_eq!(
            wrapped.downcast_ref::<NonRetryableError>(),
            Some(&NonRetryableError::NotFound)
        );
    }
}
