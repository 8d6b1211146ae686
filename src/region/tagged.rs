//! Request-region tagged dispatcher.
//!
//! Best-effort variant of [`Dispatcher`] that folds each region's response
//! metadata into one list, tagging every entry with the region that
//! produced it:
//!
//! ```text
//! {"ResponseMetadata": [{"RequestId": "...", "RequestRegion": "us-east-1"}, ...]}
//! ```
//!
//! This is schema-unaware. It only works for operations whose responses are
//! JSON objects carrying an object-valued `ResponseMetadata`; anything else
//! is rejected with [`Error::EnvelopeShape`]. Resource payloads are not
//! merged. Use [`describe_operations`](crate::region::describe_operations)
//! to inspect output members before relying on it.

use crate::core::{Error, RegionId, Result};
use crate::region::client::{AggregateResult, Dispatcher, MultiRegionClient};
use serde_json::{Map, Value};

/// Key holding per-response metadata.
pub const RESPONSE_METADATA: &str = "ResponseMetadata";

/// Key added to each metadata entry.
pub const REQUEST_REGION: &str = "RequestRegion";

/// Dispatcher producing a merged, region-tagged metadata envelope.
#[derive(Debug, Clone)]
pub struct RequestRegionDispatcher<'a> {
    inner: Dispatcher<'a>,
}

impl<'a> RequestRegionDispatcher<'a> {
    /// Bind an operation of `client`.
    pub fn new(client: &'a MultiRegionClient, operation: &str) -> Result<Self> {
        Ok(Self {
            inner: client.dispatcher(operation)?,
        })
    }

    /// Operation name.
    pub fn operation(&self) -> &str {
        self.inner.operation()
    }

    /// Execute in every region and merge the metadata envelopes.
    pub async fn call(&self, params: &Value) -> Result<Value> {
        let results = self.inner.call(params).await?;
        merge_response_metadata(results)
    }
}

/// Merge per-region metadata into one envelope, in region order.
pub fn merge_response_metadata(results: AggregateResult) -> Result<Value> {
    let entries = results
        .into_iter()
        .map(|(region, payload)| tag_metadata(&region, payload))
        .collect::<Result<Vec<Value>>>()?;

    let mut envelope = Map::new();
    envelope.insert(RESPONSE_METADATA.to_string(), Value::Array(entries));
    Ok(Value::Object(envelope))
}

fn tag_metadata(region: &RegionId, payload: Value) -> Result<Value> {
    let Value::Object(mut body) = payload else {
        return Err(Error::EnvelopeShape {
            region: region.clone(),
            reason: "response is not an object".to_string(),
        });
    };

    match body.remove(RESPONSE_METADATA) {
        Some(Value::Object(mut metadata)) => {
            metadata.insert(
                REQUEST_REGION.to_string(),
                Value::String(region.as_str().to_string()),
            );
            Ok(Value::Object(metadata))
        }
        Some(_) => Err(Error::EnvelopeShape {
            region: region.clone(),
            reason: format!("{} is not an object", RESPONSE_METADATA),
        }),
        None => Err(Error::EnvelopeShape {
            region: region.clone(),
            reason: format!("missing {}", RESPONSE_METADATA),
        }),
    }
}
