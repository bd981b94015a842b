use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::error::{Error, Result};

/// Shared HTTP transport for all service clients.
///
/// One blocking client behind every collaborator; `reqwest::blocking::Client`
/// is internally pooled, so cloning a `Transport` shares connections. The
/// invocation stream has no overall timeout — a turn is open-ended while the
/// agent reasons — only the connect phase is bounded.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Transport {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a path onto the service base URL. `path` must start with '/'.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.url(path)))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.put(self.url(path)))
    }

    /// Request against an absolute URL outside the service base (the remote
    /// fetch function is deployed separately).
    pub fn post_absolute(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.post(url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Turn a non-success response into `Error::Status`, draining the body
    /// for the service's message. Success responses pass through untouched.
    pub fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(Error::Status {
            status: status.as_u16(),
            message,
        })
    }
}
