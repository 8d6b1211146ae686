//! Multi-account Module
//!
//! Runs a session-scoped operation once per account and wraps the outcomes
//! in a per-account envelope:
//! - Account vendor trait
//! - Per-account result envelope
//! - Multi-region fan-out across accounts

pub mod envelope;
pub mod vendor;

pub use envelope::{AccountException, AccountResult, AccountResults};
pub use vendor::{for_each_account, invoke_all_accounts, AccountVendor, StaticAccountVendor};
