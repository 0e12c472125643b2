//! Spending categories and their server-computed spend.

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A spending category with a monthly limit.
///
/// `spent` belongs to the server: the client only ever copies it from a
/// listing and never adds transaction amounts to it locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub limit: f64,
    #[serde(default)]
    pub spent: f64,
}

impl Category {
    /// Creates a category as it looks right after creation, before any
    /// transaction has been recorded against it.
    pub fn new(name: impl Into<String>, limit: f64) -> Self {
        Self {
            name: name.into(),
            limit,
            spent: 0.0,
        }
    }

    /// Returns a copy with a new limit and the same server-reported spend.
    pub fn with_limit(&self, limit: f64) -> Self {
        Self {
            name: self.name.clone(),
            limit,
            spent: self.spent,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.limit
    }
}

impl Keyed for Category {
    fn key(&self) -> &str {
        &self.name
    }
}
