use anyhow::{Result, bail};

use agchat_client::{
    AgentClient, ControlPlaneClient, DocumentStoreClient, FetchFunctionClient, Transport,
};

use crate::config::Config;

/// Everything a handler needs: the effective config plus lazily built
/// service clients sharing one transport.
#[derive(Debug)]
pub struct ExecutionContext {
    config: Config,
    transport: Transport,
}

impl ExecutionContext {
    pub fn new(config: Config) -> Result<Self> {
        if config.endpoint.is_empty() {
            bail!(
                "No service endpoint configured. Set `endpoint` in the config file \
                 (agchat config init) or export AGCHAT_ENDPOINT."
            );
        }

        let transport = Transport::new(&config.endpoint, config.api_key.clone())?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn agent_client(&self) -> AgentClient {
        AgentClient::new(self.transport.clone())
    }

    pub fn control_client(&self) -> ControlPlaneClient {
        ControlPlaneClient::new(self.transport.clone())
    }

    pub fn store_client(&self) -> DocumentStoreClient {
        DocumentStoreClient::new(self.transport.clone())
    }

    pub fn fetch_client(&self) -> Result<FetchFunctionClient> {
        let Some(fetch_url) = &self.config.fetch_url else {
            bail!(
                "No fetch function configured. Set `fetch_url` in the config file \
                 or export AGCHAT_FETCH_URL."
            );
        };
        Ok(FetchFunctionClient::new(
            self.transport.clone(),
            fetch_url.clone(),
        ))
    }
}
