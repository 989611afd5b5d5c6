use std::fmt;

use crate::{EntityMeta, Period};

/// Why a job ended up as a placeholder section instead of extracted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFailure {
    NavigationTimeout,
    TableTimeout,
}

impl JobFailure {
    pub fn placeholder(self) -> &'static str {
        match self {
            JobFailure::NavigationTimeout => "_Navigation failed (timeout)._",
            JobFailure::TableTimeout => "_No data available (no table found)._",
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::NavigationTimeout => write!(f, "navigation timeout"),
            JobFailure::TableTimeout => write!(f, "table timeout"),
        }
    }
}

/// Ordered report chunks for one run. Sections are appended in job order and
/// joined with single newlines by [`RunReport::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    chunks: Vec<String>,
    sections: usize,
}

impl RunReport {
    pub fn new(meta: &EntityMeta, period: Period, job_count: usize, extracted_at: &str) -> Self {
        let chunks = vec![
            format!("# {} \u{2013} {}", meta.ticker, meta.name),
            format!("Price: {}  |  Extracted: {}", meta.price, extracted_at),
            format!("Period: {period}  |  Sections: {job_count}"),
            "---\n".to_string(),
        ];
        Self {
            chunks,
            sections: 0,
        }
    }

    /// Appends a labelled section. An empty `body` is kept as-is: the view was
    /// ready but held no tabular content.
    pub fn push_section(&mut self, label: &str, body: &str) {
        self.chunks.push(format!("## {label}\n\n{body}\n"));
        self.sections += 1;
    }

    pub fn push_failure(&mut self, label: &str, failure: JobFailure) {
        self.push_section(label, failure.placeholder());
    }

    pub fn section_count(&self) -> usize {
        self.sections
    }

    pub fn finish(self) -> String {
        self.chunks.join("\n")
    }
}
