//! Per-feature operations over the mirrored budget state.
//!
//! Every keyed mutation follows the same path: local validation, then the
//! collection's [`MutationCoordinator`] applies it optimistically, the
//! request is sent and the change is either kept (optionally replaced by a
//! fresh listing) or rolled back to its snapshot.
//!
//! The `begin_*` methods stop after the local apply and hand back a
//! [`PendingChange`], so several changes can await the server at once.

use chrono::NaiveDate;

use crate::aggregation::AggregationView;
use crate::config::{ClientConfig, RefreshPolicy};
use crate::domain::common::names_match;
use crate::domain::{Account, Category, StartDay, TransactionDraft};
use crate::errors::{ClientError, ClientResult, LocalValidationError, MutationError, RemoteFailure};
use crate::mutation::{Committed, Mutation, MutationCoordinator, PendingMutation};
use crate::remote::{
    CreateAccount, CreateCategory, DeleteAccount, DeleteCategory, RecordTransaction, RemoteClient,
    StartDaySetting, UpdateAccount, UpdateCategory,
};
use crate::settings::{FinancialMonth, SettingsCell};
use crate::store::EntityStore;

/// A change already applied to the local mirror whose request has not
/// been sent. The session's `complete_*_change` methods send it and settle.
#[derive(Debug)]
pub struct PendingChange<T, Q> {
    mutation: PendingMutation<T>,
    request: Q,
}

impl<T, Q> PendingChange<T, Q> {
    pub fn mutation(&self) -> &PendingMutation<T> {
        &self.mutation
    }

    pub fn request(&self) -> &Q {
        &self.request
    }
}

pub type PendingAccountChange = PendingChange<Account, AccountRequest>;
pub type PendingCategoryChange = PendingChange<Category, CategoryRequest>;

#[derive(Debug, Clone, PartialEq)]
pub enum AccountRequest {
    Create(CreateAccount),
    Update(UpdateAccount),
    Delete(DeleteAccount),
}

impl AccountRequest {
    fn send<R: RemoteClient>(&self, remote: &mut R) -> Result<(), RemoteFailure> {
        match self {
            AccountRequest::Create(payload) => remote.create_account(payload),
            AccountRequest::Update(payload) => remote.update_account(payload),
            AccountRequest::Delete(payload) => remote.delete_account(payload),
        }
    }

    fn refresh_enabled(&self, policy: &RefreshPolicy) -> bool {
        match self {
            AccountRequest::Create(_) => policy.create_account,
            AccountRequest::Update(_) => policy.update_account,
            AccountRequest::Delete(_) => policy.delete_account,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryRequest {
    Create(CreateCategory),
    Update(UpdateCategory),
    Delete(DeleteCategory),
}

impl CategoryRequest {
    fn send<R: RemoteClient>(&self, remote: &mut R) -> Result<(), RemoteFailure> {
        match self {
            CategoryRequest::Create(payload) => remote.create_category(payload),
            CategoryRequest::Update(payload) => remote.update_category(payload),
            CategoryRequest::Delete(payload) => remote.delete_category(payload),
        }
    }

    fn refresh_enabled(&self, policy: &RefreshPolicy) -> bool {
        match self {
            CategoryRequest::Create(_) => policy.create_category,
            CategoryRequest::Update(_) => policy.update_category,
            CategoryRequest::Delete(_) => policy.delete_category,
        }
    }
}

/// Mirrored accounts, categories and settings for one API.
pub struct BudgetSession<R> {
    remote: R,
    config: ClientConfig,
    accounts: EntityStore<Account>,
    categories: EntityStore<Category>,
    account_mutations: MutationCoordinator<Account>,
    category_mutations: MutationCoordinator<Category>,
    settings: SettingsCell,
}

impl<R: RemoteClient> BudgetSession<R> {
    pub fn new(remote: R, config: ClientConfig) -> Self {
        Self {
            account_mutations: MutationCoordinator::new(config.in_flight_policy),
            category_mutations: MutationCoordinator::new(config.in_flight_policy),
            settings: SettingsCell::new(config.default_start_day),
            accounts: EntityStore::new(),
            categories: EntityStore::new(),
            remote,
            config,
        }
    }

    pub fn accounts(&self) -> &EntityStore<Account> {
        &self.accounts
    }

    pub fn categories(&self) -> &EntityStore<Category> {
        &self.categories
    }

    pub fn settings(&self) -> &SettingsCell {
        &self.settings
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// Loads every collection and the start day from the server.
    pub fn load(&mut self) -> ClientResult<()> {
        self.refresh_accounts()?;
        self.refresh_categories()?;
        self.load_settings()?;
        Ok(())
    }

    pub fn refresh_accounts(&mut self) -> ClientResult<()> {
        let listing = self.remote.list_accounts()?;
        tracing::debug!(entries = listing.len(), "loaded accounts");
        self.accounts.replace_all(listing);
        Ok(())
    }

    pub fn refresh_categories(&mut self) -> ClientResult<()> {
        let listing = self.remote.list_categories()?;
        tracing::debug!(entries = listing.len(), "loaded categories");
        self.categories.replace_all(listing);
        Ok(())
    }

    pub fn load_settings(&mut self) -> ClientResult<StartDay> {
        let setting = self.remote.get_setting()?;
        self.settings.load(setting.start_day);
        Ok(setting.start_day)
    }

    pub fn create_account(&mut self, name: &str, amount: f64) -> ClientResult<Committed> {
        let change = self.begin_create_account(name, amount)?;
        self.complete_account_change(change)
    }

    /// Updates an account's balance and optionally renames it.
    pub fn update_account(
        &mut self,
        old_name: &str,
        new_name: &str,
        amount: f64,
    ) -> ClientResult<Committed> {
        let change = self.begin_update_account(old_name, new_name, amount)?;
        self.complete_account_change(change)
    }

    pub fn delete_account(&mut self, name: &str) -> ClientResult<Committed> {
        let change = self.begin_delete_account(name)?;
        self.complete_account_change(change)
    }

    /// Adds a category with nothing spent yet.
    ///
    /// The duplicate check runs against the local mirror only; the server
    /// remains the arbiter and its rejection still rolls the creation back.
    pub fn create_category(&mut self, name: &str, limit: f64) -> ClientResult<Committed> {
        let change = self.begin_create_category(name, limit)?;
        self.complete_category_change(change)
    }

    /// Changes a category's limit. The locally known spend is carried into
    /// the optimistic guess unchanged.
    pub fn update_category(&mut self, name: &str, limit: f64) -> ClientResult<Committed> {
        let change = self.begin_update_category(name, limit)?;
        self.complete_category_change(change)
    }

    pub fn delete_category(&mut self, name: &str) -> ClientResult<Committed> {
        let change = self.begin_delete_category(name)?;
        self.complete_category_change(change)
    }

    pub fn begin_create_account(
        &mut self,
        name: &str,
        amount: f64,
    ) -> ClientResult<PendingAccountChange> {
        let name = required_name(name)?;
        finite_amount(amount)?;
        let request = AccountRequest::Create(CreateAccount {
            account_name: name.clone(),
            account_balance: amount,
        });
        self.begin_account_change(Mutation::Create(Account::new(name, amount)), request)
    }

    pub fn begin_update_account(
        &mut self,
        old_name: &str,
        new_name: &str,
        amount: f64,
    ) -> ClientResult<PendingAccountChange> {
        let old_name = old_name.trim();
        let new_name = required_name(new_name)?;
        finite_amount(amount)?;
        if new_name != old_name && self.accounts.contains(&new_name) {
            return Err(reject_locally(LocalValidationError::DuplicateName(
                new_name,
            )));
        }
        let request = AccountRequest::Update(UpdateAccount {
            old_name: old_name.to_string(),
            new_name: new_name.clone(),
            amount,
        });
        self.begin_account_change(
            Mutation::Update {
                old_key: old_name.to_string(),
                value: Account::new(new_name, amount),
            },
            request,
        )
    }

    pub fn begin_delete_account(&mut self, name: &str) -> ClientResult<PendingAccountChange> {
        let request = AccountRequest::Delete(DeleteAccount {
            account_name: name.to_string(),
        });
        self.begin_account_change(Mutation::Delete(name.to_string()), request)
    }

    /// Sends the request of a change started with one of the
    /// `begin_*_account` methods and settles it.
    pub fn complete_account_change(
        &mut self,
        change: PendingAccountChange,
    ) -> ClientResult<Committed> {
        let PendingChange { mutation, request } = change;
        let refresh = request.refresh_enabled(&self.config.refresh);
        let response = match request.send(&mut self.remote) {
            Ok(()) => Ok(refresh_after_commit(refresh, || self.remote.list_accounts())),
            Err(failure) => Err(failure),
        };
        Ok(self
            .account_mutations
            .settle(&mut self.accounts, mutation, response)?)
    }

    pub fn begin_create_category(
        &mut self,
        name: &str,
        limit: f64,
    ) -> ClientResult<PendingCategoryChange> {
        let name = required_name(name)?;
        positive_limit(limit)?;
        if self
            .categories
            .list()
            .iter()
            .any(|category| names_match(&category.name, &name))
        {
            return Err(reject_locally(LocalValidationError::DuplicateName(name)));
        }
        let request = CategoryRequest::Create(CreateCategory {
            category_name: name.clone(),
            category_limit: limit,
        });
        self.begin_category_change(Mutation::Create(Category::new(name, limit)), request)
    }

    pub fn begin_update_category(
        &mut self,
        name: &str,
        limit: f64,
    ) -> ClientResult<PendingCategoryChange> {
        positive_limit(limit)?;
        let value = match self.categories.get(name) {
            Some(existing) => existing.with_limit(limit),
            None => Category::new(name, limit),
        };
        let request = CategoryRequest::Update(UpdateCategory {
            cat_name: name.to_string(),
            limit,
        });
        self.begin_category_change(
            Mutation::Update {
                old_key: name.to_string(),
                value,
            },
            request,
        )
    }

    pub fn begin_delete_category(&mut self, name: &str) -> ClientResult<PendingCategoryChange> {
        let request = CategoryRequest::Delete(DeleteCategory {
            category_name: name.to_string(),
        });
        self.begin_category_change(Mutation::Delete(name.to_string()), request)
    }

    /// Sends the request of a change started with one of the
    /// `begin_*_category` methods and settles it.
    pub fn complete_category_change(
        &mut self,
        change: PendingCategoryChange,
    ) -> ClientResult<Committed> {
        let PendingChange { mutation, request } = change;
        let refresh = request.refresh_enabled(&self.config.refresh);
        let response = match request.send(&mut self.remote) {
            Ok(()) => Ok(refresh_after_commit(refresh, || self.remote.list_categories())),
            Err(failure) => Err(failure),
        };
        Ok(self
            .category_mutations
            .settle(&mut self.categories, mutation, response)?)
    }

    fn begin_account_change(
        &mut self,
        mutation: Mutation<Account>,
        request: AccountRequest,
    ) -> ClientResult<PendingAccountChange> {
        let mutation = self.account_mutations.begin(&mut self.accounts, mutation)?;
        Ok(PendingChange { mutation, request })
    }

    fn begin_category_change(
        &mut self,
        mutation: Mutation<Category>,
        request: CategoryRequest,
    ) -> ClientResult<PendingCategoryChange> {
        let mutation = self
            .category_mutations
            .begin(&mut self.categories, mutation)?;
        Ok(PendingChange { mutation, request })
    }

    /// Sends a transaction to the server. Nothing is applied locally: the
    /// balance and spend it changes are only picked up by the refresh.
    pub fn record_transaction(&mut self, draft: &TransactionDraft) -> ClientResult<()> {
        if draft.account_name.trim().is_empty() {
            return Err(reject_locally(LocalValidationError::MissingAccount));
        }
        if draft.category_name.trim().is_empty() {
            return Err(reject_locally(LocalValidationError::EmptyName));
        }
        if !draft.amount.is_finite() || draft.amount == 0.0 {
            return Err(reject_locally(LocalValidationError::InvalidAmount(
                draft.amount,
            )));
        }

        let payload = RecordTransaction::from(draft);
        if let Err(failure) = self.remote.record_transaction(&payload) {
            tracing::warn!(error = %failure, "transaction was not recorded");
            return Err(MutationError::from(failure).into());
        }
        tracing::info!(
            account = %payload.account_name,
            category = %payload.category,
            amount = payload.amount,
            "transaction recorded"
        );

        if self.config.refresh.record_transaction {
            let remote = &mut self.remote;
            if let Some(listing) = refresh_after_commit(true, || remote.list_categories()) {
                self.categories.replace_all(listing);
            }
            if let Some(listing) = refresh_after_commit(true, || remote.list_accounts()) {
                self.accounts.replace_all(listing);
            }
        }
        Ok(())
    }

    /// Saves the financial month start day. Days outside 1..=28 are refused
    /// before the server is contacted.
    pub fn save_start_day(&mut self, day: u32) -> ClientResult<StartDay> {
        let pending = self.settings.begin_save(day).map_err(reject_locally)?;
        let payload = StartDaySetting {
            start_day: pending.proposed(),
        };
        let response = self.remote.set_setting(&payload);
        Ok(self.settings.settle(pending, response)?)
    }

    pub fn overview(&self) -> AggregationView<'_> {
        AggregationView::new(&self.categories)
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts
            .list()
            .iter()
            .map(|account| account.amount)
            .sum()
    }

    pub fn financial_month(&self, today: NaiveDate) -> Option<FinancialMonth> {
        FinancialMonth::containing(today, self.settings.get())
    }
}

/// Fetches a fresh listing after a commit when `enabled`. A failed fetch
/// keeps the optimistic guess: the server already accepted the change.
fn refresh_after_commit<T, F>(enabled: bool, fetch: F) -> Option<Vec<T>>
where
    F: FnOnce() -> Result<Vec<T>, RemoteFailure>,
{
    if !enabled {
        return None;
    }
    match fetch() {
        Ok(listing) => Some(listing),
        Err(failure) => {
            tracing::warn!(error = %failure, "refresh after commit failed, keeping local state");
            None
        }
    }
}

fn reject_locally(err: LocalValidationError) -> ClientError {
    tracing::debug!(error = %err, "rejected before contacting the server");
    ClientError::Local(err)
}

fn required_name(name: &str) -> Result<String, ClientError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(reject_locally(LocalValidationError::EmptyName))
    } else {
        Ok(trimmed.to_string())
    }
}

fn positive_limit(limit: f64) -> Result<(), ClientError> {
    if limit.is_finite() && limit > 0.0 {
        Ok(())
    } else {
        Err(reject_locally(LocalValidationError::NonPositiveLimit(limit)))
    }
}

fn finite_amount(amount: f64) -> Result<(), ClientError> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(reject_locally(LocalValidationError::InvalidAmount(amount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{InMemoryRemote, Operation};

    fn session() -> BudgetSession<InMemoryRemote> {
        let remote = InMemoryRemote::new()
            .with_account("Checking", 1000.0)
            .with_category("Food", 500.0);
        let mut session = BudgetSession::new(remote, ClientConfig::default());
        session.load().unwrap();
        session
    }

    #[test]
    fn empty_category_name_never_reaches_remote() {
        let mut session = session();
        let calls = session.remote().calls().len();
        let err = session.create_category("   ", 100.0).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Local(LocalValidationError::EmptyName)
        ));
        assert_eq!(session.remote().calls().len(), calls);
    }

    #[test]
    fn nan_limit_is_rejected() {
        let mut session = session();
        assert!(matches!(
            session.create_category("Fuel", f64::NAN),
            Err(ClientError::Local(LocalValidationError::NonPositiveLimit(_)))
        ));
    }

    #[test]
    fn failed_refresh_keeps_optimistic_guess() {
        let mut session = session();
        session
            .remote_mut()
            .fail_next_on(Operation::ListAccounts, RemoteFailure::Transport("reset".into()));

        let committed = session.update_account("Checking", "Main", 900.0).unwrap();

        assert!(!committed.refreshed);
        assert_eq!(session.accounts().keys(), vec!["Main"]);
        assert_eq!(session.accounts().get("Main").unwrap().amount, 900.0);
    }

    #[test]
    fn total_balance_sums_accounts() {
        let mut session = session();
        session.create_account("Savings", 250.5).unwrap();
        assert_eq!(session.total_balance(), 1250.5);
    }
}
