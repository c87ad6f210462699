use crate::fetch::http::{build_client, get_json, FetchError};
use crate::flatten::{resolve, KeyPath};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Corporate numbers are 13 decimal digits.
static CORPORATE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{13}$").expect("corporate number pattern"));

static FIRST_ENTRY: Lazy<KeyPath> =
    Lazy::new(|| KeyPath::parse("hojin-infos.0").expect("registry entry path"));

/// Configuration for the corporate-registry fetcher.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Lookup endpoint; the corporate number is appended to this.
    pub base_url: String,

    /// Registry API token, sent as the `X-hojinInfo-api-token` header.
    pub api_token: String,

    /// Fixed sleep between lookups to stay polite to the API.
    pub request_interval: Duration,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            base_url: String::from("https://info.gbiz.go.jp/hojin/v1/hojin/"),
            api_token: String::new(),
            request_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Looks up company records by corporate number, one request per number.
#[derive(Debug)]
pub struct RegistryClient {
    config: RegistryConfig,
    client: Client,
}

impl RegistryClient {
    /// Create a client. Fails if no API token is configured.
    pub fn new(config: RegistryConfig) -> Result<Self, FetchError> {
        if config.api_token.is_empty() {
            return Err(FetchError::MissingCredential("registry API token"));
        }
        let client = build_client(config.timeout)?;
        Ok(RegistryClient { config, client })
    }

    /// Fetch one company record.
    ///
    /// The registry wraps the record in a `hojin-infos` array; the first
    /// entry is the record for the requested number.
    pub fn fetch_one(&self, number: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.config.base_url, number);
        let request = self
            .client
            .get(url)
            .header("X-hojinInfo-api-token", &self.config.api_token);

        let response = get_json(request)?;
        Ok(first_entry(&response))
    }

    /// Fetch records for a batch of corporate numbers, preserving order.
    ///
    /// Malformed numbers and per-number request failures are logged and
    /// skipped; one bad number never aborts the batch. Sleeps between
    /// requests per the configured interval.
    pub fn fetch_all(&self, numbers: &[String]) -> Vec<Value> {
        info!("fetching {} corporate records", numbers.len());
        let mut items = Vec::new();

        for number in numbers {
            if !CORPORATE_NUMBER.is_match(number) {
                warn!("skipping malformed corporate number: {number:?}");
                continue;
            }

            match self.fetch_one(number) {
                Ok(item) => {
                    info!("fetched {number}");
                    items.push(item);
                }
                Err(e) => {
                    warn!("lookup failed for {number}: {e}");
                }
            }

            std::thread::sleep(self.config.request_interval);
        }

        items
    }
}

/// Pull the first registry entry out of a lookup response, or an empty
/// object when the response carries none.
fn first_entry(response: &Value) -> Value {
    resolve(response, &FIRST_ENTRY)
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_token_rejected() {
        let err = RegistryClient::new(RegistryConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential(_)));
    }

    #[test]
    fn test_corporate_number_pattern() {
        assert!(CORPORATE_NUMBER.is_match("7010401001556"));
        assert!(!CORPORATE_NUMBER.is_match("701040100155"));
        assert!(!CORPORATE_NUMBER.is_match("70104010015567"));
        assert!(!CORPORATE_NUMBER.is_match("7010-40100155"));
        assert!(!CORPORATE_NUMBER.is_match(""));
    }

    #[test]
    fn test_first_entry_unwraps_the_envelope() {
        let response = json!({
            "hojin-infos": [
                {"name": "Example K.K.", "location": "Tokyo"},
                {"name": "ignored"}
            ]
        });
        assert_eq!(
            first_entry(&response),
            json!({"name": "Example K.K.", "location": "Tokyo"})
        );
    }

    // Nothing listens on port 1, so any request issued against this config
    // fails fast with connection refused instead of touching the network.
    fn unroutable_config() -> RegistryConfig {
        RegistryConfig {
            base_url: String::from("http://127.0.0.1:1/"),
            api_token: String::from("test-token"),
            request_interval: Duration::ZERO,
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_fetch_all_skips_malformed_numbers() {
        let client = RegistryClient::new(unroutable_config()).unwrap();
        let numbers = vec![String::from("not-a-number"), String::from("123")];
        // Malformed numbers are dropped before any request is issued.
        assert!(client.fetch_all(&numbers).is_empty());
    }

    #[test]
    fn test_fetch_all_survives_per_number_failures() {
        let client = RegistryClient::new(unroutable_config()).unwrap();
        let numbers = vec![
            String::from("7010401001556"),
            String::from("7011001029649"),
        ];
        // Both lookups fail at the transport level; the batch still runs to
        // completion and returns the (empty) set instead of erroring out.
        assert!(client.fetch_all(&numbers).is_empty());
    }

    #[test]
    fn test_first_entry_tolerates_empty_response() {
        assert_eq!(first_entry(&json!({})), json!({}));
        assert_eq!(first_entry(&json!({"hojin-infos": []})), json!({}));
    }
}
