//! Operation models advertised by regional clients.
//!
//! Each client exposes a method-name to remote-operation mapping. The
//! dispatch proxy reads this once at construction time.

use crate::region::credentials::RegionClient;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Description of a single remote operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationModel {
    /// Wire name of the remote operation (e.g. `DescribeVpcs`)
    pub api_name: String,
    /// Top-level members of the output shape, if the operation has one
    pub output_members: Option<Vec<String>>,
}

impl OperationModel {
    /// Create a model with no output shape.
    pub fn new(api_name: &str) -> Self {
        Self {
            api_name: api_name.to_string(),
            output_members: None,
        }
    }

    /// Set output shape members.
    pub fn with_output(mut self, members: &[&str]) -> Self {
        self.output_members = Some(members.iter().map(|m| m.to_string()).collect());
        self
    }
}

/// Method name to operation model mapping of one client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationSet {
    operations: BTreeMap<String, OperationModel>,
}

impl OperationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation.
    pub fn with_operation(mut self, method: &str, model: OperationModel) -> Self {
        self.insert(method, model);
        self
    }

    /// Insert an operation, replacing any previous model for the method.
    pub fn insert(&mut self, method: &str, model: OperationModel) {
        self.operations.insert(method.to_string(), model);
    }

    /// Check if a method is part of the set.
    pub fn contains(&self, method: &str) -> bool {
        self.operations.contains_key(method)
    }

    /// Get the model for a method.
    pub fn get(&self, method: &str) -> Option<&OperationModel> {
        self.operations.get(method)
    }

    /// Method names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Method names present here but absent from `other`, and vice versa.
    pub fn difference(&self, other: &OperationSet) -> (Vec<String>, Vec<String>) {
        let ours: BTreeSet<&str> = self.names().collect();
        let theirs: BTreeSet<&str> = other.names().collect();

        let missing = ours.difference(&theirs).map(|s| s.to_string()).collect();
        let extra = theirs.difference(&ours).map(|s| s.to_string()).collect();
        (missing, extra)
    }

    /// Iterate over (method, model) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationModel)> {
        self.operations.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One line of an operation catalog dump.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSummary {
    /// Client method name
    pub method: String,
    /// Remote operation name
    pub api_name: String,
    /// Output shape members, `None` when the operation returns nothing
    pub output_members: Option<Vec<String>>,
}

/// List every operation a client advertises together with its output members.
///
/// Useful to see which operations share a response envelope before relying
/// on schema-unaware merging.
pub fn describe_operations(client: &dyn RegionClient) -> Vec<OperationSummary> {
    client
        .operations()
        .iter()
        .map(|(method, model)| OperationSummary {
            method: method.to_string(),
            api_name: model.api_name.clone(),
            output_members: model.output_members.clone(),
        })
        .collect()
}
