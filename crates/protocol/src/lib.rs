use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub mod admin;
pub mod report;

pub use admin::{AdminUser, ChallengeItem, GroupInvite, GroupMember, MemberRank, Session};
pub use report::{
    Attempt, AttemptKind, AttemptLog, ChallengeSummary, EntityKind, ReportEntity, ReportRequest,
    ReportRow, RowDetail, RowSummary, ScoreSummary, SolutionType, SubmissionReport, Submitter,
};

/// Identity contract for entities that live in mutable admin lists.
pub trait Identified {
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync;

    fn id(&self) -> Self::Id;
}

/// Caller role as reported by the session endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Moderator,
    Member,
}

impl Role {
    /// Roles allowed to trigger administrative mutations.
    #[must_use]
    pub const fn can_administer(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
