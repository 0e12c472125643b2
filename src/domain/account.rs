use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A bank account as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub name: String,
    pub amount: f64,
}

impl Account {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

impl Keyed for Account {
    fn key(&self) -> &str {
        &self.name
    }
}
