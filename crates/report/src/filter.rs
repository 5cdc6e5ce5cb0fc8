use dojo_protocol::{EntityKind, ReportRow, SolutionType};

/// Criteria for one report table view. Every dimension is optional; an
/// unset dimension passes all rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub entity: Option<EntityKind>,
    pub solution: Option<SolutionType>,
    /// Matches a row when either track's latest status equals this value.
    pub status: Option<String>,
    /// Case-insensitive substring over the entity display name.
    pub search: Option<String>,
}

impl RowFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity.is_none()
            && self.solution.is_none()
            && self.status.is_none()
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    /// True when `row` passes every populated dimension. Dimensions combine
    /// with AND; the status dimension is an OR across the two tracks.
    #[must_use]
    pub fn matches(&self, row: &ReportRow) -> bool {
        if let Some(kind) = self.entity {
            if row.entity.kind() != kind {
                return false;
            }
        }
        if let Some(solution) = self.solution {
            if row.solution_type != solution {
                return false;
            }
        }
        if let Some(status) = self.status.as_deref() {
            let flag_hit = row.summary.flag.latest_status.as_deref() == Some(status);
            let procedure_hit = row.summary.procedure.latest_status.as_deref() == Some(status);
            if !flag_hit && !procedure_hit {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.trim();
            if !needle.is_empty() {
                let name = row.entity.display_name().to_lowercase();
                if !name.contains(&needle.to_lowercase()) {
                    return false;
                }
            }
        }
        true
    }
}

/// Pure filter pass over the canonical rows. The input is never mutated;
/// clearing the filter always restores the full set.
#[must_use]
pub fn filter_rows<'a>(rows: &'a [ReportRow], filter: &RowFilter) -> Vec<&'a ReportRow> {
    rows.iter().filter(|row| filter.matches(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_protocol::{ReportEntity, RowDetail, RowSummary, ScoreSummary};
    use pretty_assertions::assert_eq;

    fn row(
        row_id: &str,
        entity: ReportEntity,
        solution: SolutionType,
        flag_status: Option<&str>,
        proc_status: Option<&str>,
    ) -> ReportRow {
        ReportRow {
            row_id: row_id.to_string(),
            entity,
            solution_type: solution,
            summary: RowSummary {
                flag: ScoreSummary {
                    best_score: 0.0,
                    latest_status: flag_status.map(str::to_string),
                    latest_submitted_at: None,
                },
                procedure: ScoreSummary {
                    best_score: 0.0,
                    latest_status: proc_status.map(str::to_string),
                    latest_submitted_at: None,
                },
                total_score: 0.0,
                date: None,
            },
            see_more: RowDetail::default(),
        }
    }

    fn user(username: &str) -> ReportEntity {
        ReportEntity::User {
            username: username.to_string(),
        }
    }

    fn fixture() -> Vec<ReportRow> {
        vec![
            row("a", user("Ada"), SolutionType::Flag, Some("correct"), None),
            row(
                "b",
                user("Brook"),
                SolutionType::FlagAndProcedure,
                Some("wrong"),
                Some("pending review"),
            ),
            row(
                "c",
                ReportEntity::Group {
                    name: "Crimson".to_string(),
                },
                SolutionType::Procedure,
                None,
                Some("correct"),
            ),
        ]
    }

    fn ids(rows: &[&ReportRow]) -> Vec<String> {
        rows.iter().map(|r| r.row_id.clone()).collect()
    }

    #[test]
    fn empty_filter_passes_everything_in_order() {
        let rows = fixture();
        let filter = RowFilter::default();

        assert!(filter.is_empty());
        assert_eq!(ids(&filter_rows(&rows, &filter)), ["a", "b", "c"]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let rows = fixture();
        let filter = RowFilter {
            entity: Some(EntityKind::User),
            status: Some("correct".to_string()),
            ..RowFilter::default()
        };

        assert_eq!(ids(&filter_rows(&rows, &filter)), ["a"]);
    }

    #[test]
    fn status_matches_either_track() {
        let rows = fixture();
        let filter = RowFilter {
            status: Some("correct".to_string()),
            ..RowFilter::default()
        };

        // "correct" on the flag track for a, on the procedure track for c.
        assert_eq!(ids(&filter_rows(&rows, &filter)), ["a", "c"]);
    }

    #[test]
    fn entity_dimensions_are_mutually_exclusive() {
        let rows = fixture();
        let users = RowFilter {
            entity: Some(EntityKind::User),
            ..RowFilter::default()
        };
        let groups = RowFilter {
            entity: Some(EntityKind::Group),
            ..RowFilter::default()
        };

        assert_eq!(ids(&filter_rows(&rows, &users)), ["a", "b"]);
        assert_eq!(ids(&filter_rows(&rows, &groups)), ["c"]);
    }

    #[test]
    fn mixed_track_row_answers_to_both_of_its_statuses_and_no_third() {
        let rows = vec![row(
            "m",
            user("Mara"),
            SolutionType::FlagAndProcedure,
            Some("correct"),
            Some("incorrect"),
        )];
        let by_status = |status: &str| RowFilter {
            status: Some(status.to_string()),
            ..RowFilter::default()
        };

        assert_eq!(filter_rows(&rows, &by_status("correct")).len(), 1);
        assert_eq!(filter_rows(&rows, &by_status("incorrect")).len(), 1);
        assert_eq!(filter_rows(&rows, &by_status("pending review")).len(), 0);
    }

    #[test]
    fn search_is_case_insensitive_over_display_names() {
        let rows = fixture();
        let filter = RowFilter {
            search: Some("cRimS".to_string()),
            ..RowFilter::default()
        };

        assert_eq!(ids(&filter_rows(&rows, &filter)), ["c"]);
    }

    #[test]
    fn blank_search_is_a_no_op() {
        let rows = fixture();
        let filter = RowFilter {
            search: Some("   ".to_string()),
            ..RowFilter::default()
        };

        assert!(filter.is_empty());
        assert_eq!(filter_rows(&rows, &filter).len(), 3);
    }

    #[test]
    fn clearing_the_filter_restores_the_full_set() {
        let rows = fixture();
        let narrow = RowFilter {
            solution: Some(SolutionType::Procedure),
            ..RowFilter::default()
        };

        assert_eq!(ids(&filter_rows(&rows, &narrow)), ["c"]);
        assert_eq!(
            ids(&filter_rows(&rows, &RowFilter::default())),
            ["a", "b", "c"]
        );
    }
}
