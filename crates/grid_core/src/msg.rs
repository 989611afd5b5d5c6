use crate::{CompletionEvent, ProgressEvent, RunRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A scrape command arrived from the collaborator layer.
    CommandReceived(RunRequest),
    /// Engine progress for the active run.
    RunProgress(ProgressEvent),
    /// Engine finished the active run.
    RunCompleted(CompletionEvent),
    /// The inbound command stream ended.
    InputClosed,
    /// The engine can no longer run anything; no completion will follow.
    EngineStopped,
}
