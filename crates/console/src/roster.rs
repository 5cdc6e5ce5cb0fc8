use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dojo_actions::{
    Committed, Lifecycle, ListStore, Mutation, MutationOutcome, Notice, NoticeSlot,
    OptimisticMutator,
};
use dojo_api::NormalizedError;
use dojo_protocol::{GroupInvite, GroupMember, MemberRank, Role};
use log::warn;

use crate::endpoints::Endpoints;
use crate::validate::{self, ValidationError};

/// Roster screen for one group: members and outstanding invites, plus the
/// group size settings form.
pub struct GroupRoster {
    endpoints: Endpoints,
    group_id: i64,
    role: Role,
    members: ListStore<GroupMember>,
    invites: ListStore<GroupInvite>,
    member_update: OptimisticMutator<GroupMember>,
    member_removal: OptimisticMutator<GroupMember>,
    invite_create: OptimisticMutator<GroupInvite>,
    invite_revoke: OptimisticMutator<GroupInvite>,
    notices: NoticeSlot,
    lifecycle: Lifecycle,
    /// Provisional ids for optimistic invites, always negative so they can
    /// never collide with a server id.
    provisional: Arc<AtomicI64>,
}

impl GroupRoster {
    #[must_use]
    pub fn new(
        endpoints: Endpoints,
        group_id: i64,
        role: Role,
        notices: NoticeSlot,
        lifecycle: Lifecycle,
    ) -> Self {
        let members = ListStore::default();
        let invites = ListStore::default();
        let member_update = OptimisticMutator::new(
            members.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        let member_removal = OptimisticMutator::new(
            members.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        let invite_create = OptimisticMutator::new(
            invites.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        let invite_revoke = OptimisticMutator::new(
            invites.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        Self {
            endpoints,
            group_id,
            role,
            members,
            invites,
            member_update,
            member_removal,
            invite_create,
            invite_revoke,
            notices,
            lifecycle,
            provisional: Arc::new(AtomicI64::new(-1)),
        }
    }

    /// Load members and invites; replaces both lists wholesale.
    pub async fn load(&self) -> Result<(), NormalizedError> {
        let members = self.endpoints.list_members(self.group_id).await?;
        let invites = self.endpoints.list_invites(self.group_id).await?;
        if self.lifecycle.is_alive() {
            self.members.replace_all(members);
            self.invites.replace_all(invites);
        }
        Ok(())
    }

    #[must_use]
    pub fn members(&self) -> Vec<GroupMember> {
        self.members.items()
    }

    #[must_use]
    pub fn invites(&self) -> Vec<GroupInvite> {
        self.invites.items()
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    /// Promote or demote a member, optimistically.
    pub async fn set_rank(&self, member_id: i64, rank: MemberRank) -> MutationOutcome {
        let Some(mut member) = self.members.get(&member_id) else {
            return MutationOutcome::Failed(NormalizedError::local("That member is gone."));
        };
        member.rank = rank;
        let optimistic = member.clone();
        let endpoints = self.endpoints.clone();
        let group_id = self.group_id;
        let commit = async move {
            endpoints
                .update_member_rank(group_id, member_id, rank)
                .await
        };
        self.member_update
            .run(
                Mutation::new(move |items| items.upsert(optimistic), commit)
                    .on_success("Member updated.")
                    .on_failure("The member could not be updated."),
            )
            .await
    }

    /// Remove a member after confirmation.
    pub async fn remove_member(
        &self,
        member_id: i64,
        confirm: impl FnOnce() -> bool + Send + 'static,
    ) -> MutationOutcome {
        let endpoints = self.endpoints.clone();
        let group_id = self.group_id;
        let commit = async move {
            endpoints.remove_member(group_id, member_id).await?;
            Ok(Committed::Ack)
        };
        self.member_removal
            .run(
                Mutation::new(
                    move |items| {
                        items.remove(&member_id);
                    },
                    commit,
                )
                .confirm(confirm)
                .on_success("Member removed.")
                .on_failure("The member could not be removed."),
            )
            .await
    }

    /// Send an invitation. The optimistic entry carries a provisional id;
    /// the canonical invite from the server replaces it on commit.
    pub async fn create_invite(
        &self,
        email: &str,
    ) -> Result<MutationOutcome, ValidationError> {
        validate::invite_email(email)?;
        let email = email.trim().to_string();
        let provisional_id = self.provisional.fetch_sub(1, Ordering::SeqCst);
        let optimistic = GroupInvite {
            id: provisional_id,
            email: email.clone(),
            created_at: None,
        };
        let endpoints = self.endpoints.clone();
        let group_id = self.group_id;
        let commit = async move { endpoints.create_invite(group_id, &email).await };
        let outcome = self
            .invite_create
            .run(
                Mutation::new(move |items| items.upsert(optimistic), commit)
                    .reconcile(move |items, canonical| {
                        items.remove(&provisional_id);
                        items.upsert(canonical);
                    })
                    .on_success("Invitation sent.")
                    .on_failure("The invitation could not be sent."),
            )
            .await;
        Ok(outcome)
    }

    /// Revoke an outstanding invitation.
    pub async fn revoke_invite(&self, invite_id: i64) -> MutationOutcome {
        let endpoints = self.endpoints.clone();
        let group_id = self.group_id;
        let commit = async move {
            endpoints.revoke_invite(group_id, invite_id).await?;
            Ok(Committed::Ack)
        };
        self.invite_revoke
            .run(
                Mutation::new(
                    move |items| {
                        items.remove(&invite_id);
                    },
                    commit,
                )
                .on_success("Invitation revoked.")
                .on_failure("The invitation could not be revoked."),
            )
            .await
    }

    /// Save the group's size bounds. Not a list mutation, but it follows the
    /// same gates: role, then validation, then the commit.
    pub async fn set_member_limits(
        &self,
        min: u32,
        max: u32,
    ) -> Result<MutationOutcome, ValidationError> {
        if !self.role.can_administer() {
            return Ok(MutationOutcome::Forbidden);
        }
        validate::member_bounds(min, max)?;
        let result = self
            .endpoints
            .update_group_limits(self.group_id, min, max)
            .await;
        if !self.lifecycle.is_alive() {
            return Ok(MutationOutcome::Detached);
        }
        match result {
            Ok(()) => {
                self.notices.success("Group settings saved.");
                Ok(MutationOutcome::Applied)
            }
            Err(error) => {
                warn!("group limits update failed: {}", error.message);
                self.notices.failure(error.message.clone());
                Ok(MutationOutcome::Failed(error))
            }
        }
    }
}
