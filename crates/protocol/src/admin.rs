use serde::{Deserialize, Serialize};

use crate::report::SolutionType;
use crate::{Identified, Role};

/// Authenticated caller, as reported by the session endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

/// Platform account as listed on the user directory screen.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl Identified for AdminUser {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Challenge catalog entry used by pickers and list screens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChallengeItem {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub points: i64,
    pub solution_type: SolutionType,
    pub group_only: bool,
}

impl Identified for ChallengeItem {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Standing of a member inside one group.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberRank {
    Leader,
    Member,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub id: i64,
    pub username: String,
    pub rank: MemberRank,
    #[serde(default)]
    pub joined_at: Option<String>,
}

impl Identified for GroupMember {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Outstanding invitation to join a group.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GroupInvite {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Identified for GroupInvite {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}
