mod formatters;

pub use formatters::{
    FormatOpts, format_answer, format_citation_panel, format_history, format_trace_panel,
};
