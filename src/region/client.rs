//! Multi-region dispatch proxy.
//!
//! A [`MultiRegionClient`] holds one regional client per requested region
//! and exposes the operation set of those clients. Invoking an operation
//! runs it against every region with identical parameters and returns the
//! raw payloads keyed by region.
//!
//! The operation set is read from one representative client (the first
//! region in sorted order) when the proxy is built. By default every other
//! client must advertise exactly the same method names; with validation
//! disabled, operations missing from a non-representative region surface as
//! remote errors from that region.

use crate::core::{Error, RegionId, Result};
use crate::region::config::{DispatchConfig, ExecutionMode};
use crate::region::credentials::{call_region, CredentialContext, RegionClient};
use crate::region::operations::OperationSet;
use futures::future::{join_all, try_join_all};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw per-region payloads of one successful invocation.
pub type AggregateResult = BTreeMap<RegionId, Value>;

/// Per-region outcomes of one invocation in partial-results mode.
pub type PartialResult = BTreeMap<RegionId, Result<Value>>;

/// Client fanning every operation out across a fixed set of regions.
pub struct MultiRegionClient {
    /// Target service name
    service: String,
    /// One client per requested region
    clients: BTreeMap<RegionId, Arc<dyn RegionClient>>,
    /// Operations read from the representative client
    operations: OperationSet,
    /// Dispatch settings
    config: DispatchConfig,
}

impl MultiRegionClient {
    /// Build a client for `service` in every region of `regions`.
    pub async fn new<I>(ctx: &dyn CredentialContext, service: &str, regions: I) -> Result<Self>
    where
        I: IntoIterator<Item = RegionId>,
    {
        Self::with_config(ctx, service, regions, DispatchConfig::default()).await
    }

    /// Build a client with explicit dispatch settings.
    ///
    /// Fails if `regions` is empty, if any regional client cannot be built,
    /// or (when validation is on) if the regional operation sets differ.
    #[tracing::instrument(skip(ctx, regions, config))]
    pub async fn with_config<I>(
        ctx: &dyn CredentialContext,
        service: &str,
        regions: I,
        config: DispatchConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = RegionId>,
    {
        let regions: BTreeSet<RegionId> = regions.into_iter().collect();
        if regions.is_empty() {
            return Err(Error::EmptyRegionSet);
        }

        let mut clients = BTreeMap::new();
        for region in regions {
            let client = ctx
                .client(service, &region)
                .await
                .map_err(|e| Error::ClientConstruction {
                    region: region.clone(),
                    reason: e.to_string(),
                })?;
            clients.insert(region, client);
        }

        let operations = match clients.values().next() {
            Some(representative) => representative.operations().clone(),
            None => return Err(Error::EmptyRegionSet),
        };

        if config.validate_operation_sets {
            for (region, client) in clients.iter().skip(1) {
                let (missing, extra) = operations.difference(client.operations());
                if !missing.is_empty() || !extra.is_empty() {
                    warn!(region = %region, "Regional operation set differs from representative");
                    return Err(Error::OperationSetMismatch {
                        region: region.clone(),
                        missing,
                        extra,
                    });
                }
            }
        }

        info!(
            regions = clients.len(),
            operations = operations.len(),
            "Multi-region client ready"
        );

        Ok(Self {
            service: service.to_string(),
            clients,
            operations,
            config,
        })
    }

    /// Target service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Regions this client dispatches to, sorted.
    pub fn regions(&self) -> impl Iterator<Item = &RegionId> {
        self.clients.keys()
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.clients.len()
    }

    /// Operations available for dispatch.
    pub fn operations(&self) -> &OperationSet {
        &self.operations
    }

    /// Dispatch settings.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Check if an operation can be dispatched.
    pub fn supports(&self, name: &str) -> bool {
        self.operations.contains(name)
    }

    /// Get a dispatcher bound to an operation.
    pub fn dispatcher(&self, name: &str) -> Result<Dispatcher<'_>> {
        if !self.supports(name) {
            return Err(Error::UnknownOperation {
                name: name.to_string(),
            });
        }
        Ok(Dispatcher {
            client: self,
            operation: name.to_string(),
        })
    }

    /// Run an operation in every region. All-or-nothing.
    pub async fn invoke(&self, name: &str, params: &Value) -> Result<AggregateResult> {
        self.dispatcher(name)?.call(params).await
    }

    /// Run an operation in every region and decode each payload.
    pub async fn invoke_as<T>(&self, name: &str, params: &Value) -> Result<BTreeMap<RegionId, T>>
    where
        T: DeserializeOwned,
    {
        self.invoke(name, params)
            .await?
            .into_iter()
            .map(|(region, payload)| -> Result<(RegionId, T)> {
                Ok((region, serde_json::from_value(payload)?))
            })
            .collect()
    }

    /// Run an operation in every region, keeping each region's outcome.
    ///
    /// Only an unknown operation fails the whole call.
    pub async fn invoke_partial(&self, name: &str, params: &Value) -> Result<PartialResult> {
        Ok(self.dispatcher(name)?.call_partial(params).await)
    }

    /// Access a single regional client.
    pub fn regional_client(&self, region: &str) -> Option<&Arc<dyn RegionClient>> {
        self.clients.get(region)
    }
}

impl std::fmt::Debug for MultiRegionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiRegionClient")
            .field("service", &self.service)
            .field("regions", &self.clients.keys().collect::<Vec<_>>())
            .field("operations", &self.operations.len())
            .field("config", &self.config)
            .finish()
    }
}

/// An operation bound to a [`MultiRegionClient`].
#[derive(Debug, Clone)]
pub struct Dispatcher<'a> {
    client: &'a MultiRegionClient,
    operation: String,
}

impl<'a> Dispatcher<'a> {
    /// Operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Execute the operation in every region.
    ///
    /// The first regional failure is returned and no partial mapping is
    /// produced. In concurrent mode outstanding calls are dropped.
    #[tracing::instrument(
        skip(self, params),
        fields(
            service = %self.client.service,
            operation = %self.operation,
            invocation = %uuid::Uuid::new_v4()
        )
    )]
    pub async fn call(&self, params: &Value) -> Result<AggregateResult> {
        let timeout = self.client.config.call_timeout();
        let operation = self.operation.as_str();

        match self.client.config.execution {
            ExecutionMode::Sequential => {
                let mut results = AggregateResult::new();
                for (region, client) in &self.client.clients {
                    let payload = call_region(client.as_ref(), operation, params, timeout).await?;
                    debug!(region = %region, "Regional call completed");
                    results.insert(region.clone(), payload);
                }
                Ok(results)
            }
            ExecutionMode::Concurrent => {
                let calls = self.client.clients.iter().map(|(region, client)| async move {
                    let payload = call_region(client.as_ref(), operation, params, timeout).await?;
                    debug!(region = %region, "Regional call completed");
                    Ok::<_, Error>((region.clone(), payload))
                });
                Ok(try_join_all(calls).await?.into_iter().collect())
            }
        }
    }

    /// Execute the operation in every region, keeping failures per region.
    #[tracing::instrument(
        skip(self, params),
        fields(
            service = %self.client.service,
            operation = %self.operation,
            invocation = %uuid::Uuid::new_v4()
        )
    )]
    pub async fn call_partial(&self, params: &Value) -> PartialResult {
        let timeout = self.client.config.call_timeout();
        let operation = self.operation.as_str();

        let outcomes: Vec<(RegionId, Result<Value>)> = match self.client.config.execution {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(self.client.clients.len());
                for (region, client) in &self.client.clients {
                    let outcome = call_region(client.as_ref(), operation, params, timeout).await;
                    outcomes.push((region.clone(), outcome));
                }
                outcomes
            }
            ExecutionMode::Concurrent => {
                join_all(self.client.clients.iter().map(|(region, client)| async move {
                    let outcome = call_region(client.as_ref(), operation, params, timeout).await;
                    (region.clone(), outcome)
                }))
                .await
            }
        };

        for (region, outcome) in &outcomes {
            if let Err(e) = outcome {
                warn!(region = %region, code = e.code(), "Regional call failed");
            }
        }

        outcomes.into_iter().collect()
    }
}
