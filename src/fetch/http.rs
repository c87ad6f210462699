use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connect, read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status returned by the server.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// A required credential was not supplied.
    #[error("missing API credential: {0}")]
    MissingCredential(&'static str),
}

/// Build the shared blocking client used by both fetchers.
///
/// One client per fetcher is enough here; the pipelines are sequential and
/// connection reuse across calls to the same host is what matters.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("quarry/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::from)
}

/// Execute a GET request and parse the body as JSON.
///
/// Non-2xx statuses become [`FetchError::Status`] with the body attached,
/// which is usually where external APIs explain quota and auth failures.
pub fn get_json(request: RequestBuilder) -> Result<Value, FetchError> {
    let response = request.send()?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    Ok(response.json()?)
}
