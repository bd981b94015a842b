use crate::error::Result;
use crate::transport::Transport;

/// Client for the service's document store: raw byte upload to a keyed
/// location. Uploaded documents become visible to the agent after the next
/// ingestion sync.
pub struct DocumentStoreClient {
    transport: Transport,
}

impl DocumentStoreClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Upload raw file bytes under `key`. Overwrites any existing object.
    pub fn put_object(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = format!("/objects/{}", key);
        let response = self
            .transport
            .put(&path)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()?;
        Transport::check_status(response)?;
        Ok(())
    }
}
