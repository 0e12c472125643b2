use std::collections::HashMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Keyed;
use crate::errors::{MutationError, RemoteFailure};
use crate::store::{EntityStore, StoreSnapshot};

use super::{Mutation, MutationState};

/// What to do when a mutation targets a key that already has one pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// Let both run; whichever settles last decides what is visible.
    #[default]
    Allow,
    /// Refuse the second mutation before it touches the store.
    Reject,
}

/// A mutation that has been applied locally and is waiting for the remote.
#[derive(Debug)]
pub struct PendingMutation<T> {
    id: Uuid,
    kind: &'static str,
    keys: Vec<String>,
    snapshot: StoreSnapshot<T>,
    state: MutationState,
}

impl<T> PendingMutation<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    /// The store contents this mutation rolls back to.
    pub fn snapshot(&self) -> &StoreSnapshot<T> {
        &self.snapshot
    }
}

/// Successful terminal state of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub id: Uuid,
    /// The store was replaced by an authoritative listing after the commit.
    pub refreshed: bool,
}

/// Runs optimistic mutations against one [`EntityStore`].
///
/// One coordinator should be paired with one store so the in-flight key
/// bookkeeping matches the collection it guards.
#[derive(Debug)]
pub struct MutationCoordinator<T> {
    policy: InFlightPolicy,
    in_flight: HashMap<String, usize>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for MutationCoordinator<T> {
    fn default() -> Self {
        Self::new(InFlightPolicy::default())
    }
}

impl<T> MutationCoordinator<T> {
    pub fn new(policy: InFlightPolicy) -> Self {
        Self {
            policy,
            in_flight: HashMap::new(),
            _entity: PhantomData,
        }
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Number of mutations applied locally whose remote call has not settled.
    pub fn pending_count(&self) -> usize {
        self.in_flight.values().sum()
    }

    fn register(&mut self, keys: &[String]) {
        for key in keys {
            *self.in_flight.entry(key.clone()).or_insert(0) += 1;
        }
    }

    fn release(&mut self, keys: &[String]) {
        for key in keys {
            if let Some(count) = self.in_flight.get_mut(key) {
                *count -= 1;
                if *count == 0 {
                    self.in_flight.remove(key);
                }
            }
        }
    }
}

impl<T: Keyed + Clone> MutationCoordinator<T> {
    /// Snapshots the store, applies `mutation` to it and hands back the
    /// pending mutation. The caller issues the remote call and passes its
    /// result to [`settle`](Self::settle).
    pub fn begin(
        &mut self,
        store: &mut EntityStore<T>,
        mutation: Mutation<T>,
    ) -> Result<PendingMutation<T>, MutationError> {
        let keys = mutation.touched_keys();
        if self.policy == InFlightPolicy::Reject {
            if let Some(busy) = keys.iter().find(|key| self.is_in_flight(key)) {
                tracing::debug!(key = %busy, "rejected mutation on key with pending change");
                return Err(MutationError::InFlight(busy.clone()));
            }
        }

        if let Some(taken) = mutation.conflicting_key(store) {
            tracing::debug!(key = %taken, "rejected rename onto an existing entry");
            return Err(MutationError::KeyTaken(taken.to_string()));
        }

        let mut pending = PendingMutation {
            id: Uuid::new_v4(),
            kind: mutation.kind(),
            keys,
            snapshot: store.snapshot(),
            state: MutationState::Applying,
        };
        mutation.apply(store);
        self.register(&pending.keys);
        pending.state = MutationState::AwaitingRemote;
        tracing::debug!(
            mutation = %pending.id,
            kind = pending.kind,
            keys = ?pending.keys,
            "applied optimistic mutation"
        );
        Ok(pending)
    }

    /// Moves `pending` to its terminal state.
    ///
    /// `response` is the remote outcome; on success it may carry a fresh
    /// listing that replaces the optimistic guess. On failure the store is
    /// restored to the snapshot taken in [`begin`](Self::begin).
    pub fn settle(
        &mut self,
        store: &mut EntityStore<T>,
        mut pending: PendingMutation<T>,
        response: Result<Option<Vec<T>>, RemoteFailure>,
    ) -> Result<Committed, MutationError> {
        self.release(&pending.keys);
        match response {
            Ok(refresh) => {
                let refreshed = refresh.is_some();
                if let Some(listing) = refresh {
                    tracing::debug!(mutation = %pending.id, entries = listing.len(), "refreshed after commit");
                    store.replace_all(listing);
                }
                pending.state = MutationState::Committed;
                tracing::info!(mutation = %pending.id, kind = pending.kind, refreshed, "mutation committed");
                Ok(Committed {
                    id: pending.id,
                    refreshed,
                })
            }
            Err(failure) => {
                pending.state = MutationState::RolledBack;
                tracing::warn!(
                    mutation = %pending.id,
                    kind = pending.kind,
                    error = %failure,
                    "mutation rolled back"
                );
                store.restore(pending.snapshot);
                Err(MutationError::from(failure))
            }
        }
    }

    /// [`begin`](Self::begin) and [`settle`](Self::settle) around a single
    /// remote call. `call` returns the refreshed listing when one was fetched.
    pub fn run<F>(
        &mut self,
        store: &mut EntityStore<T>,
        mutation: Mutation<T>,
        call: F,
    ) -> Result<Committed, MutationError>
    where
        F: FnOnce() -> Result<Option<Vec<T>>, RemoteFailure>,
    {
        let pending = self.begin(store, mutation)?;
        let response = call();
        self.settle(store, pending, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn categories() -> EntityStore<Category> {
        let mut food = Category::new("Food", 500.0);
        food.spent = 120.0;
        EntityStore::from_listing(vec![food, Category::new("Rent", 9000.0)])
    }

    #[test]
    fn begin_applies_before_remote_call() {
        let mut store = categories();
        let mut coordinator = MutationCoordinator::default();

        let pending = coordinator
            .begin(&mut store, Mutation::Delete("Food".into()))
            .unwrap();

        assert_eq!(pending.state(), MutationState::AwaitingRemote);
        assert!(!store.contains("Food"));
        assert!(coordinator.is_in_flight("Food"));
    }

    #[test]
    fn failed_remote_restores_snapshot() {
        let mut store = categories();
        let before = store.clone();
        let mut coordinator = MutationCoordinator::default();

        let result = coordinator.run(&mut store, Mutation::Delete("Food".into()), || {
            Err(RemoteFailure::Transport("timed out".into()))
        });

        assert_eq!(result, Err(MutationError::TransportFailure));
        assert_eq!(store, before);
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[test]
    fn refresh_supersedes_optimistic_guess() {
        let mut store = categories();
        let mut coordinator = MutationCoordinator::default();
        let mut authoritative = Category::new("Food", 300.0);
        authoritative.spent = 140.0;
        let listing = vec![authoritative.clone(), Category::new("Rent", 9000.0)];

        let committed = coordinator
            .run(
                &mut store,
                Mutation::Update {
                    old_key: "Food".into(),
                    value: Category::new("Food", 300.0),
                },
                || Ok(Some(listing)),
            )
            .unwrap();

        assert!(committed.refreshed);
        assert_eq!(store.get("Food"), Some(&authoritative));
    }

    #[test]
    fn rename_onto_existing_key_is_refused_before_applying() {
        let mut store = categories();
        let before = store.clone();
        let mut coordinator = MutationCoordinator::default();

        let result = coordinator.run(
            &mut store,
            Mutation::Update {
                old_key: "Food".into(),
                value: Category::new("Rent", 9.0),
            },
            || Ok(None),
        );

        assert_eq!(result, Err(MutationError::KeyTaken("Rent".into())));
        assert_eq!(store, before);
        assert_eq!(store.get("Rent").unwrap().limit, 9000.0);
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[test]
    fn reject_policy_blocks_overlapping_mutations() {
        let mut store = categories();
        let mut coordinator = MutationCoordinator::new(InFlightPolicy::Reject);

        let first = coordinator
            .begin(
                &mut store,
                Mutation::Update {
                    old_key: "Food".into(),
                    value: Category::new("Food", 450.0),
                },
            )
            .unwrap();
        let after_first = store.clone();

        let second = coordinator.begin(&mut store, Mutation::Delete("Food".into()));
        assert_eq!(second.unwrap_err(), MutationError::InFlight("Food".into()));
        assert_eq!(store, after_first);

        coordinator.settle(&mut store, first, Ok(None)).unwrap();
        assert!(coordinator
            .begin(&mut store, Mutation::Delete("Food".into()))
            .is_ok());
    }

    #[test]
    fn allow_policy_lets_last_settler_win() {
        let mut store = categories();
        let original = store.clone();
        let mut coordinator = MutationCoordinator::default();

        let edit = coordinator
            .begin(
                &mut store,
                Mutation::Update {
                    old_key: "Food".into(),
                    value: Category::new("Food", 450.0),
                },
            )
            .unwrap();
        let delete = coordinator
            .begin(&mut store, Mutation::Delete("Food".into()))
            .unwrap();

        coordinator.settle(&mut store, delete, Ok(None)).unwrap();
        assert!(!store.contains("Food"));

        // The edit fails last and restores what it saw before it applied.
        let result = coordinator.settle(&mut store, edit, Err(RemoteFailure::rejected("nope")));
        assert!(result.is_err());
        assert_eq!(store, original);
    }
}
