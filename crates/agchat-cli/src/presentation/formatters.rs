use owo_colors::OwoColorize;
use serde_json::Value;

use agchat_engine::{CitationView, PhaseView};
use agchat_types::{ChatMessage, Role};

/// Options for terminal output
#[derive(Debug, Clone)]
pub struct FormatOpts {
    pub enable_color: bool,
}

impl FormatOpts {
    /// Color on only when stdout is a terminal and the user did not opt
    /// out.
    pub fn detect(no_color: bool) -> Self {
        use is_terminal::IsTerminal;
        Self {
            enable_color: !no_color && std::io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            enable_color: false,
        }
    }
}

/// Format a rendered answer for the terminal. Reference lines (the
/// footnote block `render_answer` appended) are dimmed so the answer text
/// stays in the foreground.
pub fn format_answer(rendered: &str, opts: &FormatOpts) -> Vec<String> {
    rendered
        .lines()
        .map(|line| {
            if opts.enable_color && is_reference_line(line) {
                format!("{}", line.bright_black())
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// A reference line looks like `[12] s3://bucket/key`.
fn is_reference_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('[') else {
        return false;
    };
    let Some((digits, tail)) = rest.split_once(']') else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && tail.starts_with(' ')
}

/// Format the grouped trace for the side panel: three phase headers, each
/// holding its globally numbered steps as pretty-printed JSON, "None" for
/// a header whose phases produced nothing.
pub fn format_trace_panel(views: &[PhaseView], opts: &FormatOpts) -> Vec<String> {
    let mut lines = Vec::new();

    for view in views {
        lines.push(paint_header(view.header.label(), opts));

        if view.steps.is_empty() {
            lines.push(paint_dim("  None", opts));
            continue;
        }

        for step in &view.steps {
            lines.push(paint_accent(&format!("  Trace Step {}", step.number), opts));
            for event in &step.events {
                push_json_block(&mut lines, event.as_value(), "    ");
            }
        }
    }

    lines
}

/// Format the flattened citation views: one numbered JSON entry per
/// retrieved reference, numbers matching the inline footnote markers.
pub fn format_citation_panel(views: &[CitationView], opts: &FormatOpts) -> Vec<String> {
    let mut lines = vec![paint_header("Citations", opts)];

    if views.is_empty() {
        lines.push(paint_dim("  None", opts));
        return lines;
    }

    for view in views {
        lines.push(paint_accent(&format!("  Citation [{}]", view.number), opts));
        match serde_json::to_value(view) {
            Ok(value) => push_json_block(&mut lines, &value, "    "),
            Err(_) => lines.push(paint_dim("    (unrenderable citation)", opts)),
        }
    }

    lines
}

/// Replay the conversation so far, one speaker-labelled block per message.
pub fn format_history(messages: &[ChatMessage], opts: &FormatOpts) -> Vec<String> {
    if messages.is_empty() {
        return vec![paint_dim("No messages yet", opts)];
    }

    let mut lines = Vec::new();
    for message in messages {
        let label = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        lines.push(paint_accent(&format!("[{}]", label), opts));
        for line in message.content.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

fn push_json_block(lines: &mut Vec<String>, value: &Value, indent: &str) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    for line in text.lines() {
        lines.push(format!("{}{}", indent, line));
    }
}

fn paint_header(text: &str, opts: &FormatOpts) -> String {
    if opts.enable_color {
        format!("{}", text.bold())
    } else {
        text.to_string()
    }
}

fn paint_accent(text: &str, opts: &FormatOpts) -> String {
    if opts.enable_color {
        format!("{}", text.cyan())
    } else {
        text.to_string()
    }
}

fn paint_dim(text: &str, opts: &FormatOpts) -> String {
    if opts.enable_color {
        format!("{}", text.bright_black())
    } else {
        text.to_string()
    }
}
