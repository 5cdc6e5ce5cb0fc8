use std::fmt;

use serde::{Deserialize, Serialize};

/// One generated submission report: challenge header plus per-entity rows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubmissionReport {
    pub challenge: ChallengeSummary,
    pub count: usize,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChallengeSummary {
    pub id: i64,
    pub title: String,
    pub solution_type: SolutionType,
    pub group_only: bool,
}

/// Reported entity, discriminated by the sibling `entity_type` field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "entity_type", content = "entity", rename_all = "snake_case")]
pub enum ReportEntity {
    User { username: String },
    Group { name: String },
}

impl ReportEntity {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            ReportEntity::User { username } => username,
            ReportEntity::Group { name } => name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            ReportEntity::User { .. } => EntityKind::User,
            ReportEntity::Group { .. } => EntityKind::Group,
        }
    }
}

/// Discriminant of [`ReportEntity`], used by filter criteria.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Group,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted solution form for a challenge. The compound value keeps the
/// server's spelling with embedded spaces.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SolutionType {
    #[serde(rename = "flag")]
    Flag,
    #[serde(rename = "procedure")]
    Procedure,
    #[serde(rename = "flag and procedure")]
    FlagAndProcedure,
}

impl SolutionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SolutionType::Flag => "flag",
            SolutionType::Procedure => "procedure",
            SolutionType::FlagAndProcedure => "flag and procedure",
        }
    }

    #[must_use]
    pub const fn accepts_flag(self) -> bool {
        matches!(self, SolutionType::Flag | SolutionType::FlagAndProcedure)
    }

    #[must_use]
    pub const fn accepts_procedure(self) -> bool {
        matches!(self, SolutionType::Procedure | SolutionType::FlagAndProcedure)
    }
}

impl fmt::Display for SolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportRow {
    pub row_id: String,
    #[serde(flatten)]
    pub entity: ReportEntity,
    pub solution_type: SolutionType,
    pub summary: RowSummary,
    pub see_more: RowDetail,
}

/// Per-track best/latest rollup shown in the report table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RowSummary {
    #[serde(default)]
    pub flag: ScoreSummary,
    #[serde(default)]
    pub procedure: ScoreSummary,
    pub total_score: f64,
    /// Latest submission timestamp across both tracks.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ScoreSummary {
    #[serde(default)]
    pub best_score: f64,
    #[serde(default)]
    pub latest_status: Option<String>,
    #[serde(default)]
    pub latest_submitted_at: Option<String>,
}

/// Drill-down payload behind a row's "see more".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RowDetail {
    /// Absent when the caller may not see the canonical solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_solution: Option<String>,
    #[serde(default)]
    pub attempts: AttemptLog,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AttemptLog {
    #[serde(default)]
    pub flag: Vec<Attempt>,
    #[serde(default)]
    pub procedure: Vec<Attempt>,
}

impl AttemptLog {
    #[must_use]
    pub fn total(&self) -> usize {
        self.flag.len() + self.procedure.len()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attempt {
    #[serde(rename = "type")]
    pub kind: AttemptKind,
    pub submitted_at: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<Submitter>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    Flag,
    Procedure,
}

/// Group-member attribution on an attempt; populated for group rows only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Submitter {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Parameters for the report-generation endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub challenge_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}
