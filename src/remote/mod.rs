//! Contract with the authoritative budget API.
//!
//! Transport is left to implementors of [`RemoteClient`]; [`wire`] helps
//! them turn status codes and bodies into [`RemoteFailure`]s.

pub mod memory;
pub mod payload;
pub mod wire;

pub use memory::InMemoryRemote;
pub use payload::*;
pub use wire::{classify, decode, expect_success, RawResponse};

use crate::domain::{Account, Category};
use crate::errors::RemoteFailure;

/// Named operations of the budget API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAccounts,
    CreateAccount,
    UpdateAccount,
    DeleteAccount,
    ListCategories,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    RecordTransaction,
    GetSetting,
    SetSetting,
}

impl Operation {
    /// HTTP method and path of the operation relative to the API base URL.
    pub fn route(self) -> (&'static str, &'static str) {
        match self {
            Operation::ListAccounts => ("GET", "/accounts/"),
            Operation::CreateAccount => ("PUT", "/accounts/addAccount"),
            Operation::UpdateAccount => ("PUT", "/accounts/update"),
            Operation::DeleteAccount => ("PUT", "/accounts/deleteAccount"),
            Operation::ListCategories => ("GET", "/categories/"),
            Operation::CreateCategory => ("PUT", "/categories/addCategory"),
            Operation::UpdateCategory => ("PUT", "/categories/updateCategory"),
            Operation::DeleteCategory => ("PUT", "/categories/deleteCategory"),
            Operation::RecordTransaction => ("PUT", "/categories/recordTransaction"),
            Operation::GetSetting => ("GET", "/settings/financial-month-start"),
            Operation::SetSetting => ("PUT", "/settings/financial-month-start"),
        }
    }

    /// Message shown when the operation fails without a server reason.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ListAccounts => "Failed to fetch accounts!",
            Operation::CreateAccount => "Failed to add account!",
            Operation::UpdateAccount | Operation::UpdateCategory => "Failed to save changes!",
            Operation::DeleteAccount => "Failed to delete account!",
            Operation::ListCategories => "Failed to fetch categories!",
            Operation::CreateCategory => "Failed to add category!",
            Operation::DeleteCategory => "Failed to delete category!",
            Operation::RecordTransaction => "Failed to record transaction.",
            Operation::GetSetting => "Failed to load settings.",
            Operation::SetSetting => "Failed to update setting",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(
            self,
            Operation::ListAccounts | Operation::ListCategories | Operation::GetSetting
        )
    }
}

/// Request/response client for the budget API.
///
/// Every call runs to completion; there is no cancellation.
pub trait RemoteClient {
    fn list_accounts(&mut self) -> Result<Vec<Account>, RemoteFailure>;
    fn create_account(&mut self, payload: &CreateAccount) -> Result<(), RemoteFailure>;
    fn update_account(&mut self, payload: &UpdateAccount) -> Result<(), RemoteFailure>;
    fn delete_account(&mut self, payload: &DeleteAccount) -> Result<(), RemoteFailure>;

    fn list_categories(&mut self) -> Result<Vec<Category>, RemoteFailure>;
    fn create_category(&mut self, payload: &CreateCategory) -> Result<(), RemoteFailure>;
    fn update_category(&mut self, payload: &UpdateCategory) -> Result<(), RemoteFailure>;
    fn delete_category(&mut self, payload: &DeleteCategory) -> Result<(), RemoteFailure>;

    fn record_transaction(&mut self, payload: &RecordTransaction) -> Result<(), RemoteFailure>;

    fn get_setting(&mut self) -> Result<StartDaySetting, RemoteFailure>;
    fn set_setting(&mut self, payload: &StartDaySetting) -> Result<(), RemoteFailure>;
}
