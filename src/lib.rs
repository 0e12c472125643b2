#![doc(test(attr(deny(warnings))))]

//! Budget Client keeps a local mirror of a budget API's accounts,
//! categories and settings, and applies every change optimistically:
//! the mirror updates at once, then the change is confirmed or rolled back
//! when the server answers.
//!
//! ```
//! use budget_client::{config::ClientConfig, remote::InMemoryRemote, session::BudgetSession};
//!
//! let remote = InMemoryRemote::new().with_account("Checking", 1000.0);
//! let mut session = BudgetSession::new(remote, ClientConfig::default());
//! session.load().unwrap();
//! session.create_category("Food", 500.0).unwrap();
//!
//! let food = session.overview().category("Food").unwrap();
//! assert!(!food.over_budget);
//! ```

pub mod aggregation;
pub mod config;
pub mod domain;
pub mod errors;
pub mod mutation;
pub mod remote;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Client tracing initialized.");
    });
}
