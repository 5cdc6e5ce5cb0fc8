use dojo_actions::{Lifecycle, NoticeSlot};
use dojo_api::NormalizedError;
use dojo_protocol::{ReportRequest, ReportRow};
use dojo_report::{aggregate, filter_rows, Aggregates, DetailSelector, ReportModel, RowFilter};
use log::{info, warn};
use serde::Serialize;

use crate::endpoints::Endpoints;
use crate::validate;
use crate::view::ReportView;

/// Where the report screen is in its generate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenPhase {
    /// Nothing generated yet.
    Idle,
    /// A generate request is outstanding.
    Generating,
    /// A report is on screen.
    Ready,
}

/// How one generate call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Ready,
    /// The request failed; the previous report, if any, is still on screen.
    Failed,
    /// Rejected locally before any request was made.
    Invalid,
    /// Dropped because a generate is already outstanding.
    InFlight,
    /// The screen retired while the request was outstanding.
    Detached,
}

/// Submission-report screen: generate, filter, aggregate, drill down.
///
/// Filtering and aggregation are derived on every [`ReportScreen::view`]
/// call from the canonical rows, so the summary strip always describes
/// exactly the rows on screen.
pub struct ReportScreen {
    endpoints: Endpoints,
    lifecycle: Lifecycle,
    notices: NoticeSlot,
    model: Option<ReportModel>,
    filter: RowFilter,
    selector: DetailSelector,
    generating: bool,
    error: Option<NormalizedError>,
}

impl ReportScreen {
    #[must_use]
    pub fn new(endpoints: Endpoints, notices: NoticeSlot, lifecycle: Lifecycle) -> Self {
        Self {
            endpoints,
            lifecycle,
            notices,
            model: None,
            filter: RowFilter::default(),
            selector: DetailSelector::default(),
            generating: false,
            error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ScreenPhase {
        if self.generating {
            ScreenPhase::Generating
        } else if self.model.is_some() {
            ScreenPhase::Ready
        } else {
            ScreenPhase::Idle
        }
    }

    /// Generate (or regenerate) the report for one challenge.
    ///
    /// A failure keeps the previous report on screen with an error banner;
    /// only a first-ever failure lands back in [`ScreenPhase::Idle`].
    pub async fn generate(
        &mut self,
        challenge_id: i64,
        from: Option<String>,
        to: Option<String>,
    ) -> GenerateOutcome {
        if self.generating {
            return GenerateOutcome::InFlight;
        }
        if let Err(invalid) = validate::report_request(
            challenge_id,
            from.as_deref(),
            to.as_deref(),
        ) {
            self.error = Some(NormalizedError::local(invalid.to_string()));
            return GenerateOutcome::Invalid;
        }

        self.generating = true;
        self.error = None;
        let request = ReportRequest {
            challenge_id,
            from,
            to,
        };
        let result = self.endpoints.generate_report(&request).await;

        if !self.lifecycle.is_alive() {
            return GenerateOutcome::Detached;
        }
        self.generating = false;
        match result {
            Ok(report) => {
                info!(
                    "report ready: challenge {} with {} rows",
                    report.challenge.id,
                    report.rows.len()
                );
                self.model = Some(ReportModel::new(report));
                GenerateOutcome::Ready
            }
            Err(error) => {
                warn!("report generation failed: {}", error.message);
                self.error = Some(error);
                GenerateOutcome::Failed
            }
        }
    }

    /// Replace the filter criteria. Purely local; the canonical rows are
    /// untouched.
    pub fn set_filter(&mut self, filter: RowFilter) {
        self.filter = filter;
    }

    #[must_use]
    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    pub fn select(&mut self, row_id: impl Into<String>) {
        self.selector.select(row_id);
    }

    pub fn clear_selection(&mut self) {
        self.selector.clear();
    }

    /// Tear the screen down: pending completions may still settle, but they
    /// will not write here anymore.
    pub fn retire(&self) {
        self.lifecycle.retire();
    }

    /// Render-ready snapshot of the whole screen.
    #[must_use]
    pub fn view(&self) -> ReportView {
        match &self.model {
            Some(model) => {
                let filtered = filter_rows(model.rows(), &self.filter);
                let aggregates = aggregate(&filtered);
                let rows: Vec<ReportRow> = filtered.into_iter().cloned().collect();
                ReportView {
                    challenge: Some(model.challenge().clone()),
                    rows,
                    total: model.len(),
                    aggregates,
                    unique_statuses: model.unique_statuses().to_vec(),
                    selected: self.selector.resolve(model).cloned(),
                    phase: self.phase(),
                    is_loading: self.generating,
                    error: self.error.clone(),
                    notice: self.notices.current(),
                }
            }
            None => ReportView {
                challenge: None,
                rows: Vec::new(),
                total: 0,
                aggregates: Aggregates::default(),
                unique_statuses: Vec::new(),
                selected: None,
                phase: self.phase(),
                is_loading: self.generating,
                error: self.error.clone(),
                notice: self.notices.current(),
            },
        }
    }
}
