//! Grid engine: drives a live page through a scrape run and converts its
//! tables to Markdown.
mod channel;
mod codec;
mod config;
mod engine;
mod filters;
mod navigate;
mod page;
mod poll;
mod router;
mod runner;
mod types;
mod webdriver;

pub use channel::{
    in_process, ChannelError, FrameSink, FrameSource, LineReader, LineWriter, MessageReceiver,
    MessageSender,
};
pub use codec::{extract_all_tables, extract_tables, normalize_cell, table_to_markdown, TableExtraction, TableMatrix};
pub use config::{Clock, EngineConfig};
pub use engine::{install, installed, EngineHandle, EngineStopped};
pub use filters::{select_dataset, set_reporting_period, DatasetSelectors, FilterLabels};
pub use navigate::{is_same_view, navigate_to, route_path, route_query, target_address};
pub use page::{ElementTarget, Page, PageError, RouterAttachment, RouterProbe};
pub use poll::{poll_until, scan_tables, wait_for_table, PollSettings, TableScan};
pub use router::{detect_router, RouterHandle};
pub use runner::JobRunner;
pub use types::{
    ChannelProgressSink, EngineEvent, JobOutcome, JobRecord, ProgressSink, RunOutcome, Stage,
};
pub use webdriver::{WebDriverPage, WebDriverSettings};

pub use grid_core::JobFailure;
