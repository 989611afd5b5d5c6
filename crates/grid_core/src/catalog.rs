use serde::Serialize;

/// Top-level area of the site a job's view lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Financials,
    Multiples,
    Estimates,
}

impl Section {
    /// Path segment appended to the route prefix, e.g. `/stock/financials`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Section::Financials => "financials",
            Section::Multiples => "multiples",
            Section::Estimates => "estimates",
        }
    }

    /// Views in these sections expose an annual/quarterly toggle.
    pub fn is_period_sensitive(self) -> bool {
        matches!(self, Section::Financials | Section::Estimates)
    }
}

/// One entry of the fixed job catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSpec {
    pub id: &'static str,
    pub section: Section,
    pub view_tab: &'static str,
    pub label: &'static str,
    /// Dataset source to select before extraction, for views with a source switch.
    pub dataset: Option<&'static str>,
}

const fn job(id: &'static str, section: Section, view_tab: &'static str, label: &'static str) -> JobSpec {
    JobSpec {
        id,
        section,
        view_tab,
        label,
        dataset: None,
    }
}

pub const JOB_CATALOG: [JobSpec; 13] = [
    job("incomeStatement", Section::Financials, "is", "Income Statement"),
    job("balanceSheet", Section::Financials, "bs", "Balance Sheet"),
    job("cashFlow", Section::Financials, "cf", "Cash Flow"),
    job("ratios", Section::Financials, "r", "Ratios"),
    JobSpec {
        dataset: Some("Morningstar"),
        ..job("segments", Section::Financials, "seg", "Segments")
    },
    job("multiples", Section::Multiples, "multi", "Valuation Multiples"),
    job("analystTargets", Section::Multiples, "street", "Analyst Price Targets"),
    job("competitors", Section::Multiples, "comp", "Competitors"),
    job("estimates", Section::Estimates, "est", "Consensus Estimates"),
    job("guidance", Section::Estimates, "mgmt", "Management Guidance"),
    job("earningsReview", Section::Estimates, "er", "Earnings Review"),
    job("beatsMisses", Section::Estimates, "bm", "Beats & Misses"),
    job("estBreakdown", Section::Estimates, "eb", "Estimates Breakdown"),
];

pub fn lookup_job(id: &str) -> Option<&'static JobSpec> {
    JOB_CATALOG.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = JOB_CATALOG.iter().map(|j| j.id).collect();
        assert_eq!(ids.len(), JOB_CATALOG.len());
    }

    #[test]
    fn section_and_tab_pairs_are_unique() {
        let pairs: HashSet<_> = JOB_CATALOG.iter().map(|j| (j.section, j.view_tab)).collect();
        assert_eq!(pairs.len(), JOB_CATALOG.len());
    }

    #[test]
    fn only_segments_switches_dataset() {
        let with_dataset: Vec<_> = JOB_CATALOG
            .iter()
            .filter(|j| j.dataset.is_some())
            .map(|j| j.id)
            .collect();
        assert_eq!(with_dataset, vec!["segments"]);
    }
}
