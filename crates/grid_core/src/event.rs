use serde::{Deserialize, Serialize};

use crate::EntityMeta;

/// Emitted before work starts on each job; `done_count` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "done")]
    pub done_count: usize,
    #[serde(rename = "total")]
    pub total_count: usize,
    #[serde(rename = "current")]
    pub current_label: String,
    #[serde(rename = "runId")]
    pub correlation_id: Option<String>,
}

/// Emitted exactly once per run, carrying the full report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub text: String,
    pub meta: EntityMeta,
    #[serde(rename = "runId")]
    pub correlation_id: Option<String>,
}

/// Everything published back to the collaborator layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    #[serde(rename = "SCRAPE_PROGRESS")]
    Progress(ProgressEvent),
    #[serde(rename = "SCRAPE_DONE")]
    Done(CompletionEvent),
    /// A command arrived while another run was in flight and was dropped.
    #[serde(rename = "SCRAPE_BUSY")]
    Busy {
        #[serde(rename = "runId")]
        run_id: Option<String>,
    },
}
