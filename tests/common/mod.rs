#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use budget_client::{
    config::ClientConfig,
    domain::TransactionDraft,
    remote::{InMemoryRemote, RecordTransaction, RemoteClient},
    session::BudgetSession,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated directory for config files.
pub fn temp_base_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Server with two accounts, two categories and R120 spent on Food.
pub fn seeded_remote() -> InMemoryRemote {
    let mut remote = InMemoryRemote::new()
        .with_account("Checking", 1000.0)
        .with_account("Savings", 5000.0)
        .with_category("Food", 500.0)
        .with_category("Rent", 9000.0);
    let draft = TransactionDraft::new("Checking", "Food", 120.0).with_description("groceries");
    remote
        .record_transaction(&RecordTransaction::from(&draft))
        .expect("seed transaction");
    remote
}

pub fn loaded_session(config: ClientConfig) -> BudgetSession<InMemoryRemote> {
    let mut session = BudgetSession::new(seeded_remote(), config);
    session.load().expect("initial load");
    session
}
