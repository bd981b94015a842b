use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default alias every agent carries for test traffic; used when no alias
/// is configured, matching the service's own console behavior.
pub const DEFAULT_AGENT_ALIAS_ID: &str = "TSTALIASID";

/// Resolve the config file path based on priority:
/// 1. Explicit --config path (with tilde expansion)
/// 2. AGCHAT_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory (recommended default)
/// 4. ~/.agchat (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit_path {
        return expand_tilde(&path.to_string_lossy());
    }

    if let Ok(env_path) = std::env::var("AGCHAT_CONFIG") {
        return expand_tilde(&env_path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("agchat").join("config.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".agchat").join("config.toml");
    }

    PathBuf::from("agchat.toml")
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the managed agent service
    pub endpoint: String,

    /// Bearer token for the service; masked by `config show`
    pub api_key: Option<String>,

    /// Direct agent id; takes precedence over name resolution
    pub agent_id: Option<String>,
    pub agent_alias_id: String,

    /// Agent name, resolved to an id (and its latest alias) when no direct
    /// id is configured
    pub agent_name: Option<String>,

    /// Knowledge-base name, resolved to an id at session start
    pub kb_name: Option<String>,

    /// Endpoint of the remote fetch function (`kb fetch`)
    pub fetch_url: Option<String>,

    /// Key prefixes in the document store
    pub upload_prefix: String,
    pub fetch_prefix: String,

    /// Delay between ingestion-job polls, in seconds
    pub poll_interval_secs: u64,

    /// Banner shown when a chat session starts
    pub ui_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            agent_id: None,
            agent_alias_id: DEFAULT_AGENT_ALIAS_ID.to_string(),
            agent_name: None,
            kb_name: None,
            fetch_url: None,
            upload_prefix: "manual-upload/".to_string(),
            fetch_prefix: "github/".to_string(),
            poll_interval_secs: 2,
            ui_title: "Agent Chat Console".to_string(),
        }
    }
}

impl Config {
    /// Load from a file, then layer environment overrides on top. A missing
    /// file is not an error — environment-only setups are common in CI.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("AGCHAT_ENDPOINT") {
            self.endpoint = v;
        }
        if let Ok(v) = std::env::var("AGCHAT_API_KEY") {
            self.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("AGCHAT_AGENT_ID") {
            self.agent_id = Some(v);
        }
        if let Ok(v) = std::env::var("AGCHAT_AGENT_ALIAS_ID") {
            self.agent_alias_id = v;
        }
        if let Ok(v) = std::env::var("AGCHAT_AGENT_NAME") {
            self.agent_name = Some(v);
        }
        if let Ok(v) = std::env::var("AGCHAT_KB_NAME") {
            self.kb_name = Some(v);
        }
        if let Ok(v) = std::env::var("AGCHAT_FETCH_URL") {
            self.fetch_url = Some(v);
        }
    }

    /// Copy with the API key replaced, for display.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if masked.api_key.is_some() {
            masked.api_key = Some("********".to_string());
        }
        masked
    }
}
