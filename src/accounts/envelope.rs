//! Per-account result envelope.
//!
//! Serializes as
//! `{"Results": [{"Id": ..., "Result": ...}], "Exceptions": [{"Id": ..., "Code": ..., "ExceptionDetails": ...}]}`.

use crate::core::{AccountId, Error};
use serde::{Deserialize, Serialize};

/// Successful outcome for one account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountResult<T> {
    /// Account the result belongs to
    pub id: AccountId,
    /// Value produced for the account
    pub result: T,
}

/// Failed outcome for one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountException {
    /// Account that failed
    pub id: AccountId,
    /// Error classification
    pub code: String,
    /// Error description
    pub exception_details: String,
}

impl AccountException {
    /// Build from a crate error.
    pub fn from_error(id: AccountId, error: &Error) -> Self {
        Self {
            id,
            code: error.code().to_string(),
            exception_details: error.to_string(),
        }
    }
}

/// Outcomes of a per-account run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountResults<T> {
    /// Accounts that succeeded
    pub results: Vec<AccountResult<T>>,
    /// Accounts that failed
    pub exceptions: Vec<AccountException>,
}

impl<T> AccountResults<T> {
    /// Create an empty envelope.
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    /// Record an account outcome.
    pub fn record(&mut self, id: AccountId, outcome: Result<T, Error>) {
        match outcome {
            Ok(result) => self.results.push(AccountResult { id, result }),
            Err(e) => self.exceptions.push(AccountException::from_error(id, &e)),
        }
    }

    /// Result for a given account.
    pub fn result(&self, id: &str) -> Option<&T> {
        self.results
            .iter()
            .find(|r| r.id.as_str() == id)
            .map(|r| &r.result)
    }

    /// Check if every account succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.exceptions.is_empty()
    }
}

impl<T> Default for AccountResults<T> {
    fn default() -> Self {
        Self::new()
    }
}
