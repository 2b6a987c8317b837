//! HTTP client with retry logic and error classification.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{NonRetryableError, RetryPolicy, check_retryable, classify_error};
