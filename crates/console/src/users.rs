use dojo_actions::{
    Committed, Lifecycle, ListStore, Mutation, MutationOutcome, Notice, NoticeSlot,
    OptimisticMutator,
};
use dojo_api::NormalizedError;
use dojo_protocol::{AdminUser, Role};

use crate::endpoints::Endpoints;

/// User directory screen: the account list plus its admin actions, each
/// action driven by its own optimistic mutator over the shared store.
pub struct UserDirectory {
    endpoints: Endpoints,
    store: ListStore<AdminUser>,
    update: OptimisticMutator<AdminUser>,
    removal: OptimisticMutator<AdminUser>,
    notices: NoticeSlot,
    lifecycle: Lifecycle,
}

impl UserDirectory {
    #[must_use]
    pub fn new(
        endpoints: Endpoints,
        role: Role,
        notices: NoticeSlot,
        lifecycle: Lifecycle,
    ) -> Self {
        let store = ListStore::default();
        let update = OptimisticMutator::new(
            store.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        let removal = OptimisticMutator::new(
            store.clone(),
            notices.clone(),
            lifecycle.clone(),
            role,
        );
        Self {
            endpoints,
            store,
            update,
            removal,
            notices,
            lifecycle,
        }
    }

    /// Initial load; replaces the list wholesale.
    pub async fn load(&self) -> Result<(), NormalizedError> {
        let users = self.endpoints.list_users().await?;
        if self.lifecycle.is_alive() {
            self.store.replace_all(users);
        }
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> Vec<AdminUser> {
        self.store.items()
    }

    /// Case-insensitive substring match over username and email.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<AdminUser> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.users();
        }
        self.store
            .items()
            .into_iter()
            .filter(|user| {
                user.username.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    /// Change a user's platform role, optimistically.
    pub async fn set_role(&self, id: i64, role: Role) -> MutationOutcome {
        let Some(mut user) = self.store.get(&id) else {
            return MutationOutcome::Failed(NormalizedError::local("That user is gone."));
        };
        user.role = role;
        self.commit_update(user, "Role updated.").await
    }

    /// Deactivate or reactivate an account, optimistically.
    pub async fn set_active(&self, id: i64, active: bool) -> MutationOutcome {
        let Some(mut user) = self.store.get(&id) else {
            return MutationOutcome::Failed(NormalizedError::local("That user is gone."));
        };
        user.active = active;
        let text = if active {
            "Account reactivated."
        } else {
            "Account deactivated."
        };
        self.commit_update(user, text).await
    }

    async fn commit_update(&self, user: AdminUser, success: &str) -> MutationOutcome {
        let optimistic = user.clone();
        let endpoints = self.endpoints.clone();
        let commit = async move { endpoints.update_user(&user).await };
        self.update
            .run(
                Mutation::new(move |items| items.upsert(optimistic), commit)
                    .on_success(success)
                    .on_failure("The user could not be updated."),
            )
            .await
    }

    /// Delete an account after confirmation. The row disappears immediately
    /// and comes back in place if the server refuses.
    pub async fn remove(
        &self,
        id: i64,
        confirm: impl FnOnce() -> bool + Send + 'static,
    ) -> MutationOutcome {
        let endpoints = self.endpoints.clone();
        let commit = async move {
            endpoints.delete_user(id).await?;
            Ok(Committed::Ack)
        };
        self.removal
            .run(
                Mutation::new(
                    move |items| {
                        items.remove(&id);
                    },
                    commit,
                )
                .confirm(confirm)
                .on_success("User deleted.")
                .on_failure("The user could not be deleted."),
            )
            .await
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.update.is_busy() || self.removal.is_busy()
    }
}
