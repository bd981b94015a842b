// Client layer - everything that talks to the managed service
//
// Four collaborators share one Transport (base URL + credentials + pooled
// blocking HTTP client):
// - AgentClient        one streaming invocation per user turn
// - ControlPlaneClient resource listings, ingestion jobs, sync poll loop
// - DocumentStoreClient keyed byte upload
// - FetchFunctionClient server-side URL fetch into the store
//
// The invocation feed is normalized here (agent::assemble) because the
// guardrail-key disambiguation is a property of one stream, not of the
// presentation layer: by the time a turn result leaves this crate, every
// trace payload sits in a terminal phase bucket.

pub mod agent;
pub mod control;
pub mod error;
pub mod fetch;
pub mod store;
pub mod transport;

pub use agent::{AgentClient, assemble_turn};
pub use control::{
    AgentAliasSummary, AgentSummary, ControlPlaneClient, DataSourceSummary, IngestionJobStatus,
    IngestionJobSummary, KnowledgeBaseSummary, SyncOutcome,
};
pub use error::{Error, Result};
pub use fetch::{FetchFunctionClient, FetchResult};
pub use store::DocumentStoreClient;
pub use transport::Transport;
