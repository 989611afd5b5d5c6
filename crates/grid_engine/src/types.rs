use std::sync::mpsc;

use grid_core::{CompletionEvent, EntityMeta, JobFailure, ProgressEvent};

/// Per-job progression inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigating,
    AdjustingFilters,
    WaitingForTable,
    Extracting,
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(ProgressEvent),
    Completed(CompletionEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The view rendered; `tables` may be zero when it held no tabular content.
    Extracted { tables: usize, chars: usize },
    Failed(JobFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: &'static str,
    pub label: &'static str,
    pub outcome: JobOutcome,
}

/// Everything a finished run produced, in job order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub text: String,
    pub meta: EntityMeta,
    pub jobs: Vec<JobRecord>,
    pub skipped: Vec<String>,
}

/// Fire-and-forget event consumer. Implementations must tolerate an absent
/// receiver.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
