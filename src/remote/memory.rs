//! In-process stand-in for the budget API.
//!
//! Applies the same rules as the server so sessions can be exercised without
//! a network, and lets callers queue failures to drive rollback paths.

use std::collections::VecDeque;

use chrono::{Local, NaiveDate};

use crate::domain::common::names_match;
use crate::domain::{Account, Category, StartDay};
use crate::errors::RemoteFailure;
use crate::settings::FinancialMonth;

use super::{
    CreateAccount, CreateCategory, DeleteAccount, DeleteCategory, Operation, RecordTransaction,
    RemoteClient, StartDaySetting, UpdateAccount, UpdateCategory,
};

#[derive(Debug, Clone)]
struct CategoryRow {
    name: String,
    limit: f64,
}

/// Server-side state held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryRemote {
    accounts: Vec<Account>,
    categories: Vec<CategoryRow>,
    transactions: Vec<(NaiveDate, RecordTransaction)>,
    start_day: StartDay,
    today: NaiveDate,
    failures: VecDeque<(Option<Operation>, RemoteFailure)>,
    calls: Vec<Operation>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            start_day: StartDay::DEFAULT,
            today: Local::now().date_naive(),
            failures: VecDeque::new(),
            calls: Vec::new(),
        }
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, name: &str, amount: f64) -> Self {
        self.accounts.push(Account::new(name, amount));
        self
    }

    pub fn with_category(mut self, name: &str, limit: f64) -> Self {
        self.categories.push(CategoryRow {
            name: name.to_string(),
            limit,
        });
        self
    }

    pub fn with_start_day(mut self, start_day: StartDay) -> Self {
        self.start_day = start_day;
        self
    }

    /// Date the server treats as today when recording and summing spend.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    /// Makes the next call of any kind fail with `failure` without
    /// changing server state. Queued failures are consumed in order.
    pub fn fail_next(&mut self, failure: RemoteFailure) {
        self.failures.push_back((None, failure));
    }

    /// Makes the next call of `operation` fail with `failure`.
    pub fn fail_next_on(&mut self, operation: Operation, failure: RemoteFailure) {
        self.failures.push_back((Some(operation), failure));
    }

    /// Every operation received so far, including failed ones.
    pub fn calls(&self) -> &[Operation] {
        &self.calls
    }

    pub fn count_calls(&self, operation: Operation) -> usize {
        self.calls.iter().filter(|call| **call == operation).count()
    }

    pub fn transactions(&self) -> impl Iterator<Item = &RecordTransaction> {
        self.transactions.iter().map(|(_, txn)| txn)
    }

    pub fn start_day(&self) -> StartDay {
        self.start_day
    }

    fn receive(&mut self, operation: Operation) -> Result<(), RemoteFailure> {
        self.calls.push(operation);
        let queued = self
            .failures
            .iter()
            .position(|(target, _)| target.map_or(true, |op| op == operation));
        match queued.and_then(|idx| self.failures.remove(idx)) {
            Some((_, failure)) => Err(failure),
            None => Ok(()),
        }
    }

    // Spend covers the financial month containing today only.
    fn spent(&self, category: &str) -> f64 {
        let month = FinancialMonth::containing(self.today, self.start_day);
        self.transactions
            .iter()
            .filter(|(date, txn)| {
                txn.category == category && month.map_or(true, |month| month.contains(*date))
            })
            .map(|(_, txn)| txn.amount)
            .sum()
    }

    fn account_index(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|account| account.name == name)
    }

    fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|row| row.name == name)
    }
}

impl RemoteClient for InMemoryRemote {
    fn list_accounts(&mut self) -> Result<Vec<Account>, RemoteFailure> {
        self.receive(Operation::ListAccounts)?;
        Ok(self.accounts.clone())
    }

    // Creating an existing account replaces it and moves it to the end.
    fn create_account(&mut self, payload: &CreateAccount) -> Result<(), RemoteFailure> {
        self.receive(Operation::CreateAccount)?;
        if let Some(idx) = self.account_index(&payload.account_name) {
            self.accounts.remove(idx);
        }
        self.accounts
            .push(Account::new(&payload.account_name, payload.account_balance));
        Ok(())
    }

    fn update_account(&mut self, payload: &UpdateAccount) -> Result<(), RemoteFailure> {
        self.receive(Operation::UpdateAccount)?;
        if payload.new_name != payload.old_name && self.account_index(&payload.new_name).is_some()
        {
            return Err(RemoteFailure::rejected("Account name already exists"));
        }
        let idx = self
            .account_index(&payload.old_name)
            .ok_or_else(|| RemoteFailure::rejected("Account not found"))?;
        self.accounts[idx] = Account::new(&payload.new_name, payload.amount);
        Ok(())
    }

    fn delete_account(&mut self, payload: &DeleteAccount) -> Result<(), RemoteFailure> {
        self.receive(Operation::DeleteAccount)?;
        if self
            .transactions()
            .any(|txn| txn.account_name == payload.account_name)
        {
            return Err(RemoteFailure::rejected("Account has transactions"));
        }
        self.accounts
            .retain(|account| account.name != payload.account_name);
        Ok(())
    }

    fn list_categories(&mut self) -> Result<Vec<Category>, RemoteFailure> {
        self.receive(Operation::ListCategories)?;
        Ok(self
            .categories
            .iter()
            .map(|row| Category {
                name: row.name.clone(),
                limit: row.limit,
                spent: self.spent(&row.name),
            })
            .collect())
    }

    fn create_category(&mut self, payload: &CreateCategory) -> Result<(), RemoteFailure> {
        self.receive(Operation::CreateCategory)?;
        let name = payload.category_name.trim();
        if name.is_empty() {
            return Err(RemoteFailure::rejected("Category name cannot be empty"));
        }
        if payload.category_limit <= 0.0 {
            return Err(RemoteFailure::rejected("Limit must be greater than 0"));
        }
        if self.categories.iter().any(|row| names_match(&row.name, name)) {
            return Err(RemoteFailure::rejected("Category already exists"));
        }
        self.categories.push(CategoryRow {
            name: name.to_string(),
            limit: payload.category_limit,
        });
        Ok(())
    }

    fn update_category(&mut self, payload: &UpdateCategory) -> Result<(), RemoteFailure> {
        self.receive(Operation::UpdateCategory)?;
        if payload.limit <= 0.0 {
            return Err(RemoteFailure::rejected("Limit must be greater than 0"));
        }
        let idx = self
            .category_index(&payload.cat_name)
            .ok_or_else(|| RemoteFailure::rejected("Category not found"))?;
        self.categories[idx].limit = payload.limit;
        Ok(())
    }

    fn delete_category(&mut self, payload: &DeleteCategory) -> Result<(), RemoteFailure> {
        self.receive(Operation::DeleteCategory)?;
        if self
            .transactions()
            .any(|txn| txn.category == payload.category_name)
        {
            return Err(RemoteFailure::rejected("Category has transactions"));
        }
        self.categories
            .retain(|row| row.name != payload.category_name);
        Ok(())
    }

    fn record_transaction(&mut self, payload: &RecordTransaction) -> Result<(), RemoteFailure> {
        self.receive(Operation::RecordTransaction)?;
        let account = self.account_index(&payload.account_name).ok_or_else(|| {
            RemoteFailure::rejected(format!("Account '{}' not found", payload.account_name))
        })?;
        if self.category_index(&payload.category).is_none() {
            return Err(RemoteFailure::rejected(format!(
                "Category '{}' not found",
                payload.category
            )));
        }
        self.accounts[account].amount -= payload.amount;
        self.transactions.push((self.today, payload.clone()));
        Ok(())
    }

    fn get_setting(&mut self) -> Result<StartDaySetting, RemoteFailure> {
        self.receive(Operation::GetSetting)?;
        Ok(StartDaySetting {
            start_day: self.start_day,
        })
    }

    fn set_setting(&mut self, payload: &StartDaySetting) -> Result<(), RemoteFailure> {
        self.receive(Operation::SetSetting)?;
        self.start_day = payload.start_day;
        Ok(())
    }
}
