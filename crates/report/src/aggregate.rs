use dojo_protocol::ReportRow;
use serde::Serialize;

/// Summary strip over the currently filtered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub count: usize,
    /// Mean total score, rounded to the nearest point.
    pub avg_total: i64,
    pub avg_flag: i64,
    pub avg_procedure: i64,
}

/// Means over the filtered set. The empty set yields zeros, never NaN, so a
/// filter that matches nothing still renders a sane strip.
#[must_use]
pub fn aggregate(rows: &[&ReportRow]) -> Aggregates {
    if rows.is_empty() {
        return Aggregates::default();
    }
    let denom = rows.len() as f64;
    let total: f64 = rows.iter().map(|row| row.summary.total_score).sum();
    let flag: f64 = rows.iter().map(|row| row.summary.flag.best_score).sum();
    let procedure: f64 = rows
        .iter()
        .map(|row| row.summary.procedure.best_score)
        .sum();
    Aggregates {
        count: rows.len(),
        avg_total: round_mean(total, denom),
        avg_flag: round_mean(flag, denom),
        avg_procedure: round_mean(procedure, denom),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_mean(sum: f64, denom: f64) -> i64 {
    (sum / denom).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_protocol::{ReportEntity, RowDetail, RowSummary, ScoreSummary, SolutionType};
    use pretty_assertions::assert_eq;

    fn row(total: f64, flag: f64, procedure: f64) -> ReportRow {
        ReportRow {
            row_id: format!("r-{total}"),
            entity: ReportEntity::User {
                username: "u".to_string(),
            },
            solution_type: SolutionType::FlagAndProcedure,
            summary: RowSummary {
                flag: ScoreSummary {
                    best_score: flag,
                    latest_status: None,
                    latest_submitted_at: None,
                },
                procedure: ScoreSummary {
                    best_score: procedure,
                    latest_status: None,
                    latest_submitted_at: None,
                },
                total_score: total,
                date: None,
            },
            see_more: RowDetail::default(),
        }
    }

    #[test]
    fn empty_set_yields_zeros() {
        assert_eq!(aggregate(&[]), Aggregates::default());
    }

    #[test]
    fn means_are_rounded_to_the_nearest_point() {
        let rows = [row(100.0, 70.0, 30.0), row(51.0, 21.0, 30.0)];
        let refs: Vec<&ReportRow> = rows.iter().collect();

        let aggregates = aggregate(&refs);

        assert_eq!(aggregates.count, 2);
        // 151 / 2 = 75.5 rounds away from zero.
        assert_eq!(aggregates.avg_total, 76);
        assert_eq!(aggregates.avg_flag, 46);
        assert_eq!(aggregates.avg_procedure, 30);
    }

    #[test]
    fn totals_of_80_and_60_average_to_70() {
        let rows = [row(80.0, 80.0, 0.0), row(60.0, 60.0, 0.0)];
        let refs: Vec<&ReportRow> = rows.iter().collect();

        assert_eq!(aggregate(&refs).avg_total, 70);
    }

    #[test]
    fn single_row_mean_is_the_row_itself() {
        let rows = [row(88.0, 50.0, 38.0)];
        let refs: Vec<&ReportRow> = rows.iter().collect();

        let aggregates = aggregate(&refs);

        assert_eq!(aggregates.avg_total, 88);
        assert_eq!(aggregates.avg_flag, 50);
        assert_eq!(aggregates.avg_procedure, 38);
    }
}
