//! Optimistic mutation protocol shared by every keyed collection.
//!
//! A mutation is applied to the local mirror first, then confirmed or
//! reversed once the remote answers:
//!
//! ```text
//! Idle -> Applying -> AwaitingRemote -> Committed
//!                                    -> RolledBack
//! ```

pub mod coordinator;
pub mod plan;

pub use coordinator::{Committed, InFlightPolicy, MutationCoordinator, PendingMutation};
pub use plan::Mutation;

use serde::{Deserialize, Serialize};

/// Lifecycle of one optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationState {
    Idle,
    Applying,
    AwaitingRemote,
    Committed,
    RolledBack,
}

impl MutationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MutationState::Committed | MutationState::RolledBack)
    }
}
