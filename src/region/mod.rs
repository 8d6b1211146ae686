//! Multi-region Module
//!
//! Fans cloud API calls out across regional endpoints:
//! - Capability traits for sessions and regional clients
//! - Region availability prober
//! - Multi-region dispatch proxy
//! - Request-region tagged dispatcher (best-effort)

pub mod client;
pub mod config;
pub mod credentials;
pub mod memory;
pub mod operations;
pub mod prober;
pub mod tagged;

pub use client::{AggregateResult, Dispatcher, MultiRegionClient, PartialResult};
pub use config::{DispatchConfig, ExecutionMode, MultiRegionConfig, ProbeConfig};
pub use credentials::{CredentialContext, RegionClient, RemoteError};
pub use memory::{InMemoryCredentials, InMemoryRegionClient};
pub use operations::{describe_operations, OperationModel, OperationSet, OperationSummary};
pub use prober::{probe, ProbeOutcome, ProbeReport, RegionProber};
pub use tagged::{merge_response_metadata, RequestRegionDispatcher};
