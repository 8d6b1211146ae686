//! In-memory credential context and regional clients.
//!
//! Scripted stand-ins for the SDK layer. Every client answers from a table
//! of canned responses, so probing and dispatch can run without a network.

use crate::core::RegionId;
use crate::region::credentials::{CredentialContext, RegionClient, RemoteError};
use crate::region::operations::OperationSet;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A regional client answering from canned responses.
///
/// Operations without a scripted response echo their parameters back inside
/// a `ResponseMetadata` envelope.
pub struct InMemoryRegionClient {
    /// Region served
    region: RegionId,
    /// Advertised operations
    operations: OperationSet,
    /// Scripted outcomes per method
    responses: HashMap<String, Result<Value, RemoteError>>,
    /// Artificial latency per call
    delay: Option<Duration>,
    /// Number of calls received
    calls: AtomicUsize,
    /// Received (method, params) pairs
    log: Mutex<Vec<(String, Value)>>,
}

impl InMemoryRegionClient {
    /// Create a client for a region.
    pub fn new(region: &str, operations: OperationSet) -> Self {
        Self {
            region: RegionId::from(region),
            operations,
            responses: HashMap::new(),
            delay: None,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Script a successful response.
    pub fn with_response(mut self, method: &str, response: Value) -> Self {
        self.responses.insert(method.to_string(), Ok(response));
        self
    }

    /// Script a failure.
    pub fn with_error(mut self, method: &str, error: RemoteError) -> Self {
        self.responses.insert(method.to_string(), Err(error));
        self
    }

    /// Delay every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls received so far, in arrival order.
    pub fn received(&self) -> Vec<(String, Value)> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RegionClient for InMemoryRegionClient {
    fn region(&self) -> &RegionId {
        &self.region
    }

    fn operations(&self) -> &OperationSet {
        &self.operations
    }

    async fn call(&self, method: &str, params: &Value) -> Result<Value, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method.to_string(), params.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let Some(model) = self.operations.get(method) else {
            return Err(RemoteError::new(
                "InvalidAction",
                &format!("{} is not a valid operation", method),
            ));
        };

        match self.responses.get(method) {
            Some(outcome) => outcome.clone(),
            None => Ok(json!({
                "Operation": model.api_name,
                "Params": params,
                "ResponseMetadata": {
                    "HTTPStatusCode": 200,
                    "Region": self.region.as_str(),
                },
            })),
        }
    }
}

/// Credential context backed by pre-built in-memory clients.
#[derive(Default)]
pub struct InMemoryCredentials {
    /// Clients by (service, region)
    clients: HashMap<(String, RegionId), Arc<InMemoryRegionClient>>,
    /// Client construction failures by (service, region)
    failures: HashMap<(String, RegionId), RemoteError>,
    /// Advertised regions by service
    advertised: BTreeMap<String, Vec<RegionId>>,
}

impl InMemoryCredentials {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client for a service.
    pub fn with_client(mut self, service: &str, client: Arc<InMemoryRegionClient>) -> Self {
        let region = client.region().clone();
        self.clients.insert((service.to_string(), region), client);
        self
    }

    /// Make client construction fail for a (service, region) pair.
    pub fn with_client_failure(mut self, service: &str, region: &str, error: RemoteError) -> Self {
        self.failures
            .insert((service.to_string(), RegionId::from(region)), error);
        self
    }

    /// Advertise regions for a service, overriding the registered clients' regions.
    pub fn with_advertised(mut self, service: &str, regions: &[&str]) -> Self {
        self.advertised.insert(
            service.to_string(),
            regions.iter().map(|r| RegionId::from(*r)).collect(),
        );
        self
    }
}

#[async_trait]
impl CredentialContext for InMemoryCredentials {
    async fn available_regions(&self, service: &str) -> Result<Vec<RegionId>, RemoteError> {
        if let Some(regions) = self.advertised.get(service) {
            return Ok(regions.clone());
        }

        let mut regions: Vec<RegionId> = self
            .clients
            .keys()
            .filter(|(s, _)| s == service)
            .map(|(_, r)| r.clone())
            .collect();
        regions.sort();
        Ok(regions)
    }

    async fn client(
        &self,
        service: &str,
        region: &RegionId,
    ) -> Result<Arc<dyn RegionClient>, RemoteError> {
        let key = (service.to_string(), region.clone());

        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }

        self.clients
            .get(&key)
            .map(|c| Arc::clone(c) as Arc<dyn RegionClient>)
            .ok_or_else(|| {
                RemoteError::new(
                    "UnknownEndpoint",
                    &format!("no endpoint for {} in {}", service, region),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::operations::OperationModel;

    fn ops() -> OperationSet {
        OperationSet::new().with_operation("describe_vpcs", OperationModel::new("DescribeVpcs"))
    }

    #[tokio::test]
    async fn test_echo_response() {
        let client = InMemoryRegionClient::new("us-east-1", ops());
        let result = client
            .call("describe_vpcs", &json!({"MaxResults": 5}))
            .await
            .unwrap();

        assert_eq!(result["Operation"], "DescribeVpcs");
        assert_eq!(result["Params"]["MaxResults"], 5);
        assert_eq!(result["ResponseMetadata"]["Region"], "us-east-1");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let client = InMemoryRegionClient::new("us-east-1", ops())
            .with_error("describe_vpcs", RemoteError::new("Throttling", "slow down"));

        let err = client.call("describe_vpcs", &Value::Null).await.unwrap_err();
        assert_eq!(err.code, "Throttling");
    }

    #[tokio::test]
    async fn test_unadvertised_method_rejected() {
        let client = InMemoryRegionClient::new("us-east-1", ops());
        let err = client.call("run_instances", &Value::Null).await.unwrap_err();
        assert_eq!(err.code, "InvalidAction");
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let creds = InMemoryCredentials::new()
            .with_client("ec2", Arc::new(InMemoryRegionClient::new("us-west-2", ops())))
            .with_client("ec2", Arc::new(InMemoryRegionClient::new("eu-west-1", ops())))
            .with_client_failure("ec2", "ap-east-1", RemoteError::new("OptInRequired", "nope"));

        let regions = creds.available_regions("ec2").await.unwrap();
        assert_eq!(regions, vec![RegionId::from("eu-west-1"), RegionId::from("us-west-2")]);

        assert!(creds.client("ec2", &RegionId::from("us-west-2")).await.is_ok());
        let err = creds.client("ec2", &RegionId::from("ap-east-1")).await.err().unwrap();
        assert_eq!(err.code, "OptInRequired");
        let err = creds.client("s3", &RegionId::from("us-west-2")).await.err().unwrap();
        assert_eq!(err.code, "UnknownEndpoint");
    }

    #[tokio::test]
    async fn test_advertised_overrides_clients() {
        let creds = InMemoryCredentials::new().with_advertised("sts", &["a", "b", "c"]);
        let regions = creds.available_regions("sts").await.unwrap();
        assert_eq!(regions.len(), 3);
    }
}
