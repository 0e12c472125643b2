use serde::{Deserialize, Serialize};

/// A spend to record against a category.
///
/// Transactions are write-only from the client: once accepted the server
/// adjusts the account balance and the category spend, and the client
/// learns about it through a refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDraft {
    pub account_name: String,
    pub category_name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionDraft {
    pub fn new(
        account_name: impl Into<String>,
        category_name: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            category_name: category_name.into(),
            amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
