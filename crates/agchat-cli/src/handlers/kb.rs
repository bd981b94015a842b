use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;
use std::time::Duration;

use agchat_client::{IngestionJobStatus, SyncOutcome};

use crate::context::ExecutionContext;

/// Resolve the configured knowledge-base name to its id. Both "nothing
/// configured" and "name not found" are distinct, retryable failures.
pub fn resolve_knowledge_base_id(ctx: &ExecutionContext) -> Result<String> {
    let Some(name) = &ctx.config().kb_name else {
        bail!("No knowledge base configured. Set `kb_name` in the config file.");
    };

    match ctx.control_client().find_knowledge_base(name)? {
        Some(kb) => Ok(kb.knowledge_base_id),
        None => bail!("No knowledge base named '{}' found on the service.", name),
    }
}

pub fn sync(ctx: &ExecutionContext) -> Result<()> {
    let kb_id = resolve_knowledge_base_id(ctx)?;
    run_sync(ctx, &kb_id)
}

/// Start an ingestion job and block until it terminates, reporting status
/// transitions as they happen. Runs until the job terminates; there is no
/// in-session cancellation of a running sync.
pub fn run_sync(ctx: &ExecutionContext, knowledge_base_id: &str) -> Result<()> {
    println!("Syncing knowledge base {}...", knowledge_base_id);

    let poll_interval = Duration::from_secs(ctx.config().poll_interval_secs);
    let mut last_status: Option<IngestionJobStatus> = None;

    let outcome = ctx.control_client().sync_knowledge_base(
        knowledge_base_id,
        poll_interval,
        |status| {
            if last_status != Some(status) {
                println!("  ingestion job: {}", status);
                last_status = Some(status);
            }
        },
    )?;

    match outcome {
        SyncOutcome::Completed => {
            println!("{}", outcome);
            Ok(())
        }
        _ => Err(anyhow!("{}", outcome)),
    }
}

pub fn upload(ctx: &ExecutionContext, files: Vec<PathBuf>, no_sync: bool) -> Result<()> {
    let store = ctx.store_client();
    let prefix = &ctx.config().upload_prefix;

    for file in &files {
        let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        let name = file
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", file.display()))?
            .to_string_lossy()
            .into_owned();
        let key = format!("{}{}", prefix, name);

        store.put_object(&key, bytes)?;
        println!("Uploaded {} -> {}", file.display(), key);
    }

    println!("{} file(s) uploaded under {}", files.len(), prefix);

    if no_sync {
        return Ok(());
    }
    sync(ctx)
}

pub fn fetch(ctx: &ExecutionContext, url: &str, no_sync: bool) -> Result<()> {
    let client = ctx.fetch_client()?;

    println!("Fetching {} via the remote fetch function...", url);
    let result = client.fetch_to_store(url)?;

    if !result.is_success() {
        bail!("Fetch function failed: {}", result.message());
    }
    println!(
        "Content stored under {} ({})",
        ctx.config().fetch_prefix,
        result.message()
    );

    if no_sync {
        return Ok(());
    }
    sync(ctx)
}
