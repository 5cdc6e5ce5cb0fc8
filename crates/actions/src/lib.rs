//! # Dojo Actions
//!
//! Optimistic mutation machinery for admin list screens.
//!
//! A screen owns a [`ListStore`] per entity list and one [`OptimisticMutator`]
//! per action kind over that list. Running a [`Mutation`] walks a fixed
//! pipeline:
//!
//! ```text
//! trigger
//!   ├─ role gate            Forbidden
//!   ├─ single-flight gate   InFlight (duplicate trigger dropped)
//!   ├─ confirmation gate    Cancelled
//!   ├─ snapshot + optimistic apply
//!   ├─ async commit
//!   │    ├─ ok    reconcile canonical entity   Applied
//!   │    └─ err   restore exact snapshot       Failed
//!   └─ lifecycle gate on every post-commit write   Detached
//! ```
//!
//! The snapshot is the whole collection, order included, so a rollback puts
//! the list back byte for byte. The [`Lifecycle`] handle is shared by every
//! mutator of one screen; retiring it suppresses state writes from commits
//! that settle after the screen is gone, without cancelling the requests
//! themselves.

mod collection;
mod lifecycle;
mod mutator;
mod notice;

pub use collection::{Collection, ListStore};
pub use lifecycle::Lifecycle;
pub use mutator::{Committed, Mutation, MutationOutcome, OptimisticMutator};
pub use notice::{Notice, NoticeKind, NoticeSlot};
