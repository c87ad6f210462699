use crate::fetch::http::{build_client, get_json, FetchError};
use crate::flatten::{resolve, KeyPath};
use log::{info, warn};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

static NEXT_START: Lazy<KeyPath> =
    Lazy::new(|| KeyPath::parse("queries.nextPage.0.startIndex").expect("next page path"));

/// Configuration for the web search fetcher.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,

    /// API key, sent as the `key` query parameter.
    pub api_key: String,

    /// Custom search engine id, sent as the `cx` query parameter.
    pub engine_id: String,

    /// Result language restriction, e.g. `lang_ja`.
    pub language: String,

    /// Results per page; the API caps this at 10.
    pub per_page: u32,

    /// Maximum number of result pages to walk per keyword.
    pub page_limit: u32,

    /// Fixed sleep before each request.
    pub request_interval: Duration,

    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            base_url: String::from("https://www.googleapis.com/customsearch/v1"),
            api_key: String::new(),
            engine_id: String::new(),
            language: String::from("lang_ja"),
            per_page: 10,
            page_limit: 1,
            request_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches paginated search results for a keyword.
#[derive(Debug)]
pub struct SearchClient {
    config: SearchConfig,
    client: Client,
}

impl SearchClient {
    /// Create a client. Fails if the key or engine id is missing.
    pub fn new(config: SearchConfig) -> Result<Self, FetchError> {
        if config.api_key.is_empty() {
            return Err(FetchError::MissingCredential("search API key"));
        }
        if config.engine_id.is_empty() {
            return Err(FetchError::MissingCredential("search engine id"));
        }
        let client = build_client(config.timeout)?;
        Ok(SearchClient { config, client })
    }

    /// Fetch up to `page_limit` pages of results for one keyword.
    ///
    /// Pages are walked via the response's next-page cursor. A request
    /// failure mid-pagination logs a warning and returns the items
    /// gathered so far rather than discarding them.
    pub fn search(&self, keyword: &str) -> Vec<Value> {
        let mut results = Vec::new();
        let mut start_index: u64 = 1;

        for page in 0..self.config.page_limit {
            std::thread::sleep(self.config.request_interval);

            let response = match self.fetch_page(keyword, start_index) {
                Ok(r) => r,
                Err(e) => {
                    warn!("search request failed for {keyword:?} (page {page}): {e}");
                    break;
                }
            };

            let items = page_items(&response);
            if items.is_empty() {
                info!("no more results for {keyword:?}");
                break;
            }
            results.extend(items.iter().cloned());

            match next_start_index(&response) {
                Some(next) => start_index = next,
                None => {
                    info!("reached the last page for {keyword:?}");
                    break;
                }
            }
        }

        info!("collected {} results for {keyword:?}", results.len());
        results
    }

    fn fetch_page(&self, keyword: &str, start_index: u64) -> Result<Value, FetchError> {
        let num = self.config.per_page.to_string();
        let start = start_index.to_string();
        let request = self.client.get(&self.config.base_url).query(&[
            ("q", keyword),
            ("cx", self.config.engine_id.as_str()),
            ("key", self.config.api_key.as_str()),
            ("lr", self.config.language.as_str()),
            ("num", num.as_str()),
            ("start", start.as_str()),
        ]);
        get_json(request)
    }
}

/// The result entries of one response page, empty when the page has none.
fn page_items(response: &Value) -> &[Value] {
    response
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The start index of the next page, if the response advertises one.
fn next_start_index(response: &Value) -> Option<u64> {
    resolve(response, &NEXT_START).and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_credentials_rejected() {
        let err = SearchClient::new(SearchConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential("search API key")));

        let config = SearchConfig {
            api_key: String::from("k"),
            ..SearchConfig::default()
        };
        let err = SearchClient::new(config).unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingCredential("search engine id")
        ));
    }

    #[test]
    fn test_search_returns_gathered_results_on_request_failure() {
        // Nothing listens on port 1, so the first page request fails with
        // connection refused. `search` must hand back whatever it gathered
        // (here: nothing) rather than surface an error. A failure midway
        // through pagination follows the same break path; covering it with
        // real partial results would need a local mock server.
        let config = SearchConfig {
            base_url: String::from("http://127.0.0.1:1/"),
            api_key: String::from("k"),
            engine_id: String::from("cx"),
            page_limit: 3,
            request_interval: Duration::ZERO,
            timeout: Duration::from_millis(200),
            ..SearchConfig::default()
        };
        let client = SearchClient::new(config).unwrap();
        assert!(client.search("anything").is_empty());
    }

    #[test]
    fn test_page_items() {
        let response = json!({
            "items": [{"title": "a"}, {"title": "b"}]
        });
        assert_eq!(page_items(&response).len(), 2);
        assert!(page_items(&json!({})).is_empty());
        assert!(page_items(&json!({"items": "oops"})).is_empty());
    }

    #[test]
    fn test_next_start_index_follows_the_cursor() {
        let response = json!({
            "queries": {
                "nextPage": [{"startIndex": 11, "count": 10}]
            }
        });
        assert_eq!(next_start_index(&response), Some(11));
    }

    #[test]
    fn test_next_start_index_absent_on_last_page() {
        assert_eq!(next_start_index(&json!({})), None);
        assert_eq!(next_start_index(&json!({"queries": {}})), None);
        assert_eq!(
            next_start_index(&json!({"queries": {"nextPage": []}})),
            None
        );
    }
}
