use std::fmt;

use serde::{Deserialize, Serialize};

/// Reporting period requested for period-sensitive views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Annual,
    Quarterly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-initiated batch. Immutable for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub job_ids: Vec<String>,
    pub period: Period,
    pub correlation_id: Option<String>,
}

impl RunRequest {
    pub fn new(job_ids: Vec<String>, period: Period, correlation_id: Option<String>) -> Self {
        Self {
            job_ids,
            period,
            correlation_id,
        }
    }
}

/// Commands relayed in from the surrounding collaborator layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundCommand {
    #[serde(rename = "SCRAPE_CMD")]
    Scrape {
        jobs: Vec<String>,
        #[serde(default)]
        period: Period,
        #[serde(rename = "runId", default)]
        run_id: Option<String>,
    },
}

impl From<InboundCommand> for RunRequest {
    fn from(command: InboundCommand) -> Self {
        match command {
            InboundCommand::Scrape {
                jobs,
                period,
                run_id,
            } => RunRequest::new(jobs, period, run_id),
        }
    }
}
