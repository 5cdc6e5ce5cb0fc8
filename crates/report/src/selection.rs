use dojo_protocol::ReportRow;

use crate::model::ReportModel;

/// Drill-down selection, tracked by row id rather than by row.
///
/// Resolution re-queries the live model on every call, so an id left over
/// from a replaced report resolves to no selection instead of a stale row.
#[derive(Debug, Clone, Default)]
pub struct DetailSelector {
    selected: Option<String>,
}

impl DetailSelector {
    pub fn select(&mut self, row_id: impl Into<String>) {
        self.selected = Some(row_id.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn resolve<'a>(&self, model: &'a ReportModel) -> Option<&'a ReportRow> {
        self.selected.as_deref().and_then(|id| model.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_protocol::{
        ChallengeSummary, ReportEntity, RowDetail, RowSummary, ScoreSummary, SolutionType,
        SubmissionReport,
    };
    use pretty_assertions::assert_eq;

    fn model(ids: &[&str]) -> ReportModel {
        let rows = ids
            .iter()
            .map(|id| ReportRow {
                row_id: (*id).to_string(),
                entity: ReportEntity::User {
                    username: format!("user-{id}"),
                },
                solution_type: SolutionType::Flag,
                summary: RowSummary {
                    flag: ScoreSummary::default(),
                    procedure: ScoreSummary::default(),
                    total_score: 0.0,
                    date: None,
                },
                see_more: RowDetail::default(),
            })
            .collect::<Vec<_>>();
        ReportModel::new(SubmissionReport {
            challenge: ChallengeSummary {
                id: 1,
                title: "Vault".to_string(),
                solution_type: SolutionType::Flag,
                group_only: false,
            },
            count: rows.len(),
            rows,
        })
    }

    #[test]
    fn selection_resolves_against_the_live_model() {
        let model = model(&["a", "b"]);
        let mut selector = DetailSelector::default();

        selector.select("b");
        assert_eq!(
            selector.resolve(&model).map(|r| r.row_id.as_str()),
            Some("b")
        );

        selector.clear();
        assert_eq!(selector.resolve(&model), None);
    }

    #[test]
    fn id_from_a_replaced_report_resolves_to_nothing() {
        let first = model(&["a", "b"]);
        let mut selector = DetailSelector::default();
        selector.select("b");
        assert!(selector.resolve(&first).is_some());

        // Regeneration produced a report without row b.
        let second = model(&["a", "c"]);
        assert_eq!(selector.resolve(&second), None);
        // The stale id is still recorded; only resolution is empty.
        assert_eq!(selector.selected_id(), Some("b"));
    }
}
