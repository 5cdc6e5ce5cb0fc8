use dojo_actions::Notice;
use dojo_api::NormalizedError;
use dojo_protocol::{ChallengeSummary, ReportRow};
use dojo_report::Aggregates;
use serde::Serialize;

use crate::report_screen::ScreenPhase;

/// Render-ready snapshot of the report screen.
///
/// Everything a UI needs in one value: the filtered rows, the summary strip
/// computed over exactly those rows, the status catalog for the filter
/// dropdown, the resolved drill-down row, and the error/notice banners.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub challenge: Option<ChallengeSummary>,
    /// Rows passing the active filter, in canonical order.
    pub rows: Vec<ReportRow>,
    /// Unfiltered row count, for "n of total" captions.
    pub total: usize,
    pub aggregates: Aggregates,
    pub unique_statuses: Vec<String>,
    /// Drill-down row, present only while its id resolves in the current
    /// report.
    pub selected: Option<ReportRow>,
    pub phase: ScreenPhase,
    pub is_loading: bool,
    pub error: Option<NormalizedError>,
    pub notice: Option<Notice>,
}
