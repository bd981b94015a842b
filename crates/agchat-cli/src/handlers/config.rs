use anyhow::{Result, bail};
use std::path::Path;

use crate::config::Config;

pub fn show(config_path: &Path) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let rendered = toml::to_string_pretty(&config.masked())?;

    println!("# effective configuration ({})", config_path.display());
    print!("{}", rendered);
    Ok(())
}

pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default().save_to(config_path)?;
    println!("Wrote starter config to {}", config_path.display());
    println!("Set `endpoint` (and `agent_id` or `agent_name`) before chatting.");
    Ok(())
}
