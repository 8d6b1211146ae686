//! Capabilities supplied by the cloud SDK layer.
//!
//! A [`CredentialContext`] is an authenticated session able to mint one
//! [`RegionClient`] per (service, region) pair. Neither trait knows anything
//! about fan-out; that lives in the prober and the dispatch proxy.

use crate::core::{Error, RegionId};
use crate::region::operations::OperationSet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Classified failure reported by the SDK layer.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct RemoteError {
    /// Error code token (e.g. `InvalidClientTokenId`, `Throttling`)
    pub code: String,
    /// Human readable message
    pub message: String,
}

impl RemoteError {
    /// Create a new remote error.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// A client bound to exactly one (service, region) pair.
#[async_trait]
pub trait RegionClient: Send + Sync {
    /// Region this client talks to.
    fn region(&self) -> &RegionId;

    /// Operations this client can execute.
    fn operations(&self) -> &OperationSet;

    /// Execute a named operation with the given parameters.
    async fn call(&self, method: &str, params: &Value) -> Result<Value, RemoteError>;
}

/// Authenticated session able to mint regional clients.
#[async_trait]
pub trait CredentialContext: Send + Sync {
    /// Regions the backend advertises for a service.
    async fn available_regions(&self, service: &str) -> Result<Vec<RegionId>, RemoteError>;

    /// Build a client for `service` in `region`.
    async fn client(
        &self,
        service: &str,
        region: &RegionId,
    ) -> Result<Arc<dyn RegionClient>, RemoteError>;
}

/// Call `method` on `client`, attributing any failure to the client's region.
pub(crate) async fn call_region(
    client: &dyn RegionClient,
    method: &str,
    params: &Value,
    timeout: Option<Duration>,
) -> crate::core::Result<Value> {
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, client.call(method, params))
            .await
            .map_err(|_| Error::Timeout {
                region: client.region().clone(),
                operation: method.to_string(),
                after_ms: limit.as_millis() as u64,
            })?,
        None => client.call(method, params).await,
    };

    outcome.map_err(|e| Error::Remote {
        region: client.region().clone(),
        code: e.code,
        message: e.message,
    })
}
