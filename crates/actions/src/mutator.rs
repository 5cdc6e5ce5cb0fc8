use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dojo_api::NormalizedError;
use dojo_protocol::{Identified, Role};
use log::{debug, warn};

use crate::collection::{Collection, ListStore};
use crate::lifecycle::Lifecycle;
use crate::notice::NoticeSlot;

/// Server acknowledgment for a committed mutation.
#[derive(Debug)]
pub enum Committed<T> {
    /// The endpoint returned the canonical entity; it replaces the
    /// optimistic entry.
    Canonical(T),
    /// Empty acknowledgment; the optimistic state is already final.
    Ack,
}

/// How one mutation run ended.
#[derive(Debug, PartialEq)]
pub enum MutationOutcome {
    /// Committed and reconciled into the collection.
    Applied,
    /// Dropped by the single-flight gate; an earlier run is still settling.
    InFlight,
    /// The confirmation gate declined; no state was touched.
    Cancelled,
    /// The caller's role may not administer this list.
    Forbidden,
    /// The screen retired before the commit settled; the pending state
    /// write was suppressed.
    Detached,
    /// The commit failed; the collection was restored to the exact
    /// pre-mutation snapshot.
    Failed(NormalizedError),
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// One optimistic action: a local transform applied now, an async commit
/// settling later.
pub struct Mutation<T: Identified, C> {
    confirm: Option<Box<dyn FnOnce() -> bool + Send>>,
    apply: Box<dyn FnOnce(&mut Collection<T>) + Send>,
    commit: C,
    reconcile: Option<Box<dyn FnOnce(&mut Collection<T>, T) + Send>>,
    success: String,
    failure: String,
}

impl<T, C> Mutation<T, C>
where
    T: Identified,
    C: Future<Output = Result<Committed<T>, NormalizedError>>,
{
    #[must_use]
    pub fn new(apply: impl FnOnce(&mut Collection<T>) + Send + 'static, commit: C) -> Self {
        Self {
            confirm: None,
            apply: Box::new(apply),
            commit,
            reconcile: None,
            success: String::from("Saved."),
            failure: String::from("The action could not be completed."),
        }
    }

    /// Gate the run on a yes/no prompt. Declining cancels before any state
    /// is touched.
    #[must_use]
    pub fn confirm(mut self, gate: impl FnOnce() -> bool + Send + 'static) -> Self {
        self.confirm = Some(Box::new(gate));
        self
    }

    /// Override how a canonical entity folds back into the collection. The
    /// default replaces the optimistic entry matched by id; creates need
    /// more, because the server assigns the real id.
    #[must_use]
    pub fn reconcile(
        mut self,
        step: impl FnOnce(&mut Collection<T>, T) + Send + 'static,
    ) -> Self {
        self.reconcile = Some(Box::new(step));
        self
    }

    #[must_use]
    pub fn on_success(mut self, text: impl Into<String>) -> Self {
        self.success = text.into();
        self
    }

    /// Fallback notice text, used only when the commit error carries no
    /// message of its own.
    #[must_use]
    pub fn on_failure(mut self, text: impl Into<String>) -> Self {
        self.failure = text.into();
        self
    }
}

/// Optimistic apply/commit/rollback engine for one action kind over one
/// list.
///
/// The single-flight gate is per instance: screens create one mutator per
/// action, so two different actions may overlap but a duplicate trigger of
/// the same action is dropped while the first is outstanding.
pub struct OptimisticMutator<T: Identified> {
    store: ListStore<T>,
    notices: NoticeSlot,
    lifecycle: Lifecycle,
    role: Role,
    busy: Arc<AtomicBool>,
}

impl<T: Identified> Clone for OptimisticMutator<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            notices: self.notices.clone(),
            lifecycle: self.lifecycle.clone(),
            role: self.role,
            busy: Arc::clone(&self.busy),
        }
    }
}

impl<T> OptimisticMutator<T>
where
    T: Identified + Clone + Send,
{
    #[must_use]
    pub fn new(store: ListStore<T>, notices: NoticeSlot, lifecycle: Lifecycle, role: Role) -> Self {
        Self {
            store,
            notices,
            lifecycle,
            role,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a commit is outstanding; screens disable the trigger on
    /// this.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run one mutation end to end. See [`MutationOutcome`] for the exits.
    pub async fn run<C>(&self, mutation: Mutation<T, C>) -> MutationOutcome
    where
        C: Future<Output = Result<Committed<T>, NormalizedError>> + Send,
    {
        if !self.role.can_administer() {
            warn!("mutation rejected: role {} may not administer", self.role);
            return MutationOutcome::Forbidden;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("duplicate trigger dropped: a commit is already in flight");
            return MutationOutcome::InFlight;
        }
        let _busy = BusyGuard(&self.busy);

        if let Some(gate) = mutation.confirm {
            if !gate() {
                return MutationOutcome::Cancelled;
            }
        }
        if !self.lifecycle.is_alive() {
            return MutationOutcome::Detached;
        }

        // Snapshot and optimistic transform under one lock, so no reader
        // ever sees a half-applied list.
        let snapshot = {
            let mut items = self.store.lock();
            let snapshot = items.clone();
            (mutation.apply)(&mut items);
            snapshot
        };

        let settled = mutation.commit.await;

        // From here on, every write is gated on the screen still existing.
        match settled {
            Ok(acknowledged) => {
                if !self.lifecycle.is_alive() {
                    return MutationOutcome::Detached;
                }
                if let Committed::Canonical(entity) = acknowledged {
                    let mut items = self.store.lock();
                    match mutation.reconcile {
                        Some(step) => step(&mut items, entity),
                        None => items.upsert(entity),
                    }
                }
                self.notices.success(mutation.success);
                MutationOutcome::Applied
            }
            Err(error) => {
                if !self.lifecycle.is_alive() {
                    debug!("commit failed after teardown; rollback suppressed");
                    return MutationOutcome::Detached;
                }
                warn!("commit failed, rolling back: {}", error.message);
                self.store.restore(snapshot);
                let text = if error.message.trim().is_empty() {
                    mutation.failure.clone()
                } else {
                    error.message.clone()
                };
                self.notices.failure(text);
                MutationOutcome::Failed(error)
            }
        }
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_protocol::AdminUser;
    use pretty_assertions::assert_eq;

    fn user(id: i64, username: &str) -> AdminUser {
        AdminUser {
            id,
            username: username.to_string(),
            email: format!("{username}@dojo.test"),
            role: Role::Member,
            active: true,
        }
    }

    fn mutator(role: Role) -> OptimisticMutator<AdminUser> {
        OptimisticMutator::new(
            ListStore::new(vec![user(1, "ada")]),
            NoticeSlot::default(),
            Lifecycle::mounted(),
            role,
        )
    }

    #[tokio::test]
    async fn member_role_is_rejected_before_any_state_change() {
        let engine = mutator(Role::Member);

        let outcome = engine
            .run(Mutation::new(
                |items| {
                    items.remove(&1);
                },
                async { Ok(Committed::Ack) },
            ))
            .await;

        assert_eq!(outcome, MutationOutcome::Forbidden);
        assert_eq!(engine.store.len(), 1);
        assert_eq!(engine.notices.current(), None);
    }

    #[tokio::test]
    async fn declined_confirmation_leaves_the_list_untouched() {
        let engine = mutator(Role::Admin);

        let outcome = engine
            .run(
                Mutation::new(
                    |items| {
                        items.remove(&1);
                    },
                    async { Ok(Committed::Ack) },
                )
                .confirm(|| false),
            )
            .await;

        assert_eq!(outcome, MutationOutcome::Cancelled);
        assert_eq!(engine.store.len(), 1);
        assert!(!engine.is_busy());
    }

    #[tokio::test]
    async fn empty_error_message_falls_back_to_the_failure_text() {
        let engine = mutator(Role::Admin);
        let mut blank = NormalizedError::local("x");
        blank.message = String::new();
        blank.messages.clear();

        let outcome = engine
            .run(
                Mutation::new(
                    |items| {
                        items.remove(&1);
                    },
                    async move { Err(blank) },
                )
                .on_failure("The user could not be deleted."),
            )
            .await;

        assert!(matches!(outcome, MutationOutcome::Failed(_)));
        assert_eq!(
            engine.notices.current().map(|n| n.text),
            Some("The user could not be deleted.".to_string())
        );
    }
}
