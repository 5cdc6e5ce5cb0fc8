use std::collections::{BTreeSet, HashMap};

use dojo_protocol::{ChallengeSummary, ReportRow, SubmissionReport};

/// Indexed wrapper around one generated report.
///
/// Rows are immutable once received; regeneration replaces the whole model.
/// The wrapper only adds lookup structure: an id index for drill-down
/// resolution and the status catalog for filter dropdowns.
#[derive(Debug, Clone)]
pub struct ReportModel {
    report: SubmissionReport,
    by_id: HashMap<String, usize>,
    statuses: Vec<String>,
}

impl ReportModel {
    #[must_use]
    pub fn new(report: SubmissionReport) -> Self {
        let mut by_id = HashMap::with_capacity(report.rows.len());
        for (idx, row) in report.rows.iter().enumerate() {
            if let Some(first) = by_id.insert(row.row_id.clone(), idx) {
                log::warn!(
                    "duplicate row_id {:?} in report payload, keeping the first occurrence",
                    row.row_id
                );
                by_id.insert(row.row_id.clone(), first);
            }
        }
        let statuses = collect_statuses(&report.rows);
        Self {
            report,
            by_id,
            statuses,
        }
    }

    #[must_use]
    pub fn challenge(&self) -> &ChallengeSummary {
        &self.report.challenge
    }

    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.report.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.report.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.report.rows.is_empty()
    }

    /// Row count the server claims for the full report; can exceed
    /// [`ReportModel::len`] when the server truncates.
    #[must_use]
    pub fn reported_count(&self) -> usize {
        self.report.count
    }

    #[must_use]
    pub fn get(&self, row_id: &str) -> Option<&ReportRow> {
        self.by_id.get(row_id).and_then(|&idx| self.report.rows.get(idx))
    }

    #[must_use]
    pub fn contains(&self, row_id: &str) -> bool {
        self.by_id.contains_key(row_id)
    }

    /// Distinct latest statuses across both tracks of every row, sorted and
    /// deduplicated. Computed once at construction; filter dropdowns read it
    /// for free.
    #[must_use]
    pub fn unique_statuses(&self) -> &[String] {
        &self.statuses
    }
}

fn collect_statuses(rows: &[ReportRow]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    for row in rows {
        for status in [
            row.summary.flag.latest_status.as_ref(),
            row.summary.procedure.latest_status.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            seen.insert(status.clone());
        }
    }
    seen.into_iter().collect()
}
