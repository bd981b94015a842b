use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::transport::Transport;

/// Client for the remote fetch function: given a repository/file URL, the
/// function fetches the content server-side and stores it into the
/// document store under the fetch prefix.
pub struct FetchFunctionClient {
    transport: Transport,
    fetch_url: String,
}

/// The function reports its own status separately from the HTTP layer:
/// a 200 transport response can still carry a non-200 `statusCode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub body: Option<String>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn message(&self) -> &str {
        self.body.as_deref().unwrap_or("No message")
    }
}

impl FetchFunctionClient {
    pub fn new(transport: Transport, fetch_url: impl Into<String>) -> Self {
        Self {
            transport,
            fetch_url: fetch_url.into(),
        }
    }

    /// Ask the remote function to fetch `url` into the document store.
    pub fn fetch_to_store(&self, url: &str) -> Result<FetchResult> {
        let response = self
            .transport
            .post_absolute(&self.fetch_url)
            .json(&json!({ "url": url }))
            .send()?;
        let response = Transport::check_status(response)?;
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_result_success_and_message() {
        let ok: FetchResult =
            serde_json::from_str(r#"{"statusCode": 200, "body": "stored 3 files"}"#).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.message(), "stored 3 files");

        let failed: FetchResult = serde_json::from_str(r#"{"statusCode": 502}"#).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.message(), "No message");
    }
}
