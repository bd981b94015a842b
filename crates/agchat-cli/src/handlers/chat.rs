use anyhow::{Result, bail};
use std::io::{BufRead, Write};

use agchat_engine::{citation_views, group_trace, render_answer, unwrap_structured_output};

use crate::context::ExecutionContext;
use crate::handlers::kb;
use crate::presentation::{
    FormatOpts, format_answer, format_citation_panel, format_history, format_trace_panel,
};
use crate::session::SessionContext;

const HELP: &str = "\
Commands:
  /trace      show the last turn's reasoning trace
  /citations  show the last turn's citations
  /history    replay the conversation so far
  /sync       re-index the knowledge base, then start a fresh conversation
  /reset      clear the session (new session id, empty history)
  /help       show this help
  /quit       leave the chat";

/// Interactive chat loop. One blocking agent invocation per input line;
/// slash-commands act on local session state. A failed turn is reported
/// and leaves the session usable — only I/O on stdin ends the loop.
pub fn handle(ctx: &ExecutionContext, opts: &FormatOpts) -> Result<()> {
    let mut session = SessionContext::new();

    println!("{}", ctx.config().ui_title);
    println!("session {}", session.session_id);
    println!("Type a prompt, or /help for commands.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/help" => println!("{}", HELP),
            "/reset" => {
                session.reset();
                println!("Session cleared. New session {}", session.session_id);
            }
            "/trace" => {
                for line in format_trace_panel(&group_trace(&session.trace), opts) {
                    println!("{}", line);
                }
            }
            "/citations" => {
                for line in format_citation_panel(&citation_views(&session.citations), opts) {
                    println!("{}", line);
                }
            }
            "/history" => {
                for line in format_history(&session.messages, opts) {
                    println!("{}", line);
                }
            }
            "/sync" => {
                if let Err(e) = sync_and_refresh(ctx, &mut session) {
                    eprintln!("Error: {}", e);
                }
            }
            _ if input.starts_with('/') => {
                eprintln!("Unknown command {} (try /help)", input);
            }
            prompt => {
                // A failed invocation is not fatal to the session: report
                // and let the user retry or inspect state.
                if let Err(e) = run_turn(ctx, &mut session, prompt, opts) {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    Ok(())
}

/// One user turn: resolve resources if this session hasn't yet, invoke the
/// agent, derive the displayable answer, record everything on the session.
fn run_turn(
    ctx: &ExecutionContext,
    session: &mut SessionContext,
    prompt: &str,
    opts: &FormatOpts,
) -> Result<()> {
    ensure_resources(ctx, session)?;

    let (Some(agent_id), Some(agent_alias_id)) = (&session.agent_id, &session.agent_alias_id)
    else {
        bail!("No agent configured. Set `agent_id` or `agent_name` in the config file.");
    };

    let result = ctx.agent_client().invoke(
        agent_id,
        agent_alias_id,
        &session.session_id,
        prompt,
        session.knowledge_base_id.as_deref(),
    )?;

    let text = unwrap_structured_output(&result.output_text);
    let rendered = render_answer(&text, &result.citations);

    for line in format_answer(&rendered, opts) {
        println!("{}", line);
    }

    session.record_turn(prompt, &rendered, result);
    Ok(())
}

/// Fill in the session's resource ids on first use. Direct ids from the
/// config win; otherwise names are resolved through the control plane.
/// The resolution is cached on the session, so a /reset re-resolves.
fn ensure_resources(ctx: &ExecutionContext, session: &mut SessionContext) -> Result<()> {
    let config = ctx.config();

    if session.agent_id.is_none() {
        if let Some(agent_id) = &config.agent_id {
            session.agent_id = Some(agent_id.clone());
            session.agent_alias_id = Some(config.agent_alias_id.clone());
        } else if let Some(name) = &config.agent_name {
            match ctx.control_client().find_agent(name)? {
                Some((agent, alias)) => {
                    session.agent_id = Some(agent.agent_id);
                    session.agent_alias_id = Some(alias.agent_alias_id);
                }
                None => bail!("No agent named '{}' found on the service.", name),
            }
        } else {
            bail!("No agent configured. Set `agent_id` or `agent_name` in the config file.");
        }
    }

    if session.knowledge_base_id.is_none()
        && let Some(name) = &config.kb_name
    {
        match ctx.control_client().find_knowledge_base(name)? {
            Some(kb) => session.knowledge_base_id = Some(kb.knowledge_base_id),
            None => eprintln!(
                "Warning: knowledge base '{}' not found; continuing without it",
                name
            ),
        }
    }

    Ok(())
}

/// /sync: re-index, then rotate the remote conversation id so the next
/// turn retrieves against fresh content. Local history stays visible.
fn sync_and_refresh(ctx: &ExecutionContext, session: &mut SessionContext) -> Result<()> {
    let kb_id = match &session.knowledge_base_id {
        Some(id) => id.clone(),
        None => kb::resolve_knowledge_base_id(ctx)?,
    };

    kb::run_sync(ctx, &kb_id)?;

    session.refresh_session_id();
    println!("Continuing with fresh session {}", session.session_id);
    Ok(())
}
