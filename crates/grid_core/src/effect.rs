use crate::{OutboundEvent, RunRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun(RunRequest),
    Publish(OutboundEvent),
    Shutdown,
}
