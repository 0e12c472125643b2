//! Request and response bodies exchanged with the budget API.

use serde::{Deserialize, Serialize};

use crate::domain::{StartDay, TransactionDraft};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateAccount {
    pub account_name: String,
    pub account_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateAccount {
    pub old_name: String,
    pub new_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAccount {
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateCategory {
    pub category_name: String,
    pub category_limit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateCategory {
    pub cat_name: String,
    pub limit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteCategory {
    pub category_name: String,
}

/// The API names the category field `category` and always expects a
/// description, so an absent one is sent as an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordTransaction {
    pub account_name: String,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

impl From<&TransactionDraft> for RecordTransaction {
    fn from(draft: &TransactionDraft) -> Self {
        Self {
            account_name: draft.account_name.clone(),
            category: draft.category_name.clone(),
            amount: draft.amount,
            description: draft.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartDaySetting {
    pub start_day: StartDay,
}

/// Acknowledgement body returned by successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
}
