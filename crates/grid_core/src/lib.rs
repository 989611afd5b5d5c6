//! Grid core: job catalog, run/report types and the command-session state machine.
mod catalog;
mod effect;
mod event;
mod meta;
mod msg;
mod report;
mod request;
mod state;
mod update;

pub use catalog::{lookup_job, JobSpec, Section, JOB_CATALOG};
pub use effect::Effect;
pub use event::{CompletionEvent, OutboundEvent, ProgressEvent};
pub use meta::{read_entity_meta, read_navigation_context, EntityMeta, NavigationContext, DEFAULT_REFERRAL_CODE};
pub use msg::Msg;
pub use report::{JobFailure, RunReport};
pub use request::{InboundCommand, Period, RunRequest};
pub use state::{AppState, SessionState};
pub use update::update;
