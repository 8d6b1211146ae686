//! Account vendors and per-account execution.

use crate::accounts::envelope::AccountResults;
use crate::core::{AccountId, Error, Result};
use crate::region::client::{AggregateResult, MultiRegionClient};
use crate::region::config::DispatchConfig;
use crate::region::credentials::CredentialContext;
use crate::region::prober::RegionProber;
use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Supplies one credential context per account.
#[async_trait]
pub trait AccountVendor: Send + Sync {
    /// Accounts to run against.
    async fn accounts(&self) -> Result<Vec<AccountId>>;

    /// Session for an account.
    async fn session(&self, account: &AccountId) -> Result<Arc<dyn CredentialContext>>;
}

/// Vendor over a fixed table of sessions.
#[derive(Default)]
pub struct StaticAccountVendor {
    sessions: BTreeMap<AccountId, Arc<dyn CredentialContext>>,
    denied: BTreeMap<AccountId, String>,
}

impl StaticAccountVendor {
    /// Create an empty vendor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account session.
    pub fn with_account(mut self, account: &str, session: Arc<dyn CredentialContext>) -> Self {
        self.sessions.insert(AccountId::from(account), session);
        self
    }

    /// Add an account whose session cannot be obtained.
    pub fn with_denied_account(mut self, account: &str, reason: &str) -> Self {
        self.denied.insert(AccountId::from(account), reason.to_string());
        self
    }
}

#[async_trait]
impl AccountVendor for StaticAccountVendor {
    async fn accounts(&self) -> Result<Vec<AccountId>> {
        let mut accounts: Vec<AccountId> = self
            .sessions
            .keys()
            .chain(self.denied.keys())
            .cloned()
            .collect();
        accounts.sort();
        Ok(accounts)
    }

    async fn session(&self, account: &AccountId) -> Result<Arc<dyn CredentialContext>> {
        if let Some(reason) = self.denied.get(account) {
            return Err(Error::Account {
                account: account.clone(),
                reason: reason.clone(),
            });
        }
        self.sessions.get(account).cloned().ok_or_else(|| Error::Account {
            account: account.clone(),
            reason: "unknown account".to_string(),
        })
    }
}

/// Run `f` once per account, concurrently.
///
/// A failing account (including one whose session cannot be obtained) is
/// recorded under `Exceptions` and does not affect the others. Only a
/// failure to list accounts fails the whole run.
pub async fn for_each_account<'f, T, F>(
    vendor: &dyn AccountVendor,
    f: F,
) -> Result<AccountResults<T>>
where
    T: Send,
    F: Fn(Arc<dyn CredentialContext>) -> BoxFuture<'f, Result<T>> + Sync,
{
    let accounts = vendor.accounts().await?;
    let f = &f;

    let outcomes = join_all(accounts.into_iter().map(|account| async move {
        let outcome = match vendor.session(&account).await {
            Ok(session) => f(session).await,
            Err(e) => Err(e),
        };
        (account, outcome)
    }))
    .await;

    let mut results = AccountResults::new();
    for (account, outcome) in outcomes {
        if let Err(e) = &outcome {
            warn!(account = %account, code = e.code(), "Account run failed");
        }
        results.record(account, outcome);
    }

    info!(
        succeeded = results.results.len(),
        failed = results.exceptions.len(),
        "Per-account run complete"
    );
    Ok(results)
}

/// Invoke `operation` on `service` in every enabled region of every account.
pub async fn invoke_all_accounts(
    vendor: &dyn AccountVendor,
    prober: &RegionProber,
    service: &str,
    operation: &str,
    params: &Value,
    config: &DispatchConfig,
) -> Result<AccountResults<AggregateResult>> {
    for_each_account(vendor, |session| {
        Box::pin(async move {
            let session = session.as_ref();
            let regions = prober.enabled_regions(session).await?;
            let client =
                MultiRegionClient::with_config(session, service, regions, config.clone()).await?;
            client.invoke(operation, params).await
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RegionId;
    use crate::region::credentials::RemoteError;
    use crate::region::memory::{InMemoryCredentials, InMemoryRegionClient};
    use crate::region::operations::{OperationModel, OperationSet};
    use serde_json::json;

    fn sts_ops() -> OperationSet {
        OperationSet::new()
            .with_operation("get_caller_identity", OperationModel::new("GetCallerIdentity"))
    }

    fn ec2_ops() -> OperationSet {
        OperationSet::new().with_operation(
            "describe_vpcs",
            OperationModel::new("DescribeVpcs").with_output(&["Vpcs"]),
        )
    }

    fn account_session(
        account: &str,
        enabled: &[&str],
        disabled: &[&str],
    ) -> Arc<dyn CredentialContext> {
        let mut creds = InMemoryCredentials::new();
        for region in enabled {
            creds = creds
                .with_client("sts", Arc::new(InMemoryRegionClient::new(region, sts_ops())))
                .with_client(
                    "ec2",
                    Arc::new(InMemoryRegionClient::new(region, ec2_ops()).with_response(
                        "describe_vpcs",
                        json!({"Vpcs": [{"VpcId": format!("vpc-{}-{}", account, region)}]}),
                    )),
                );
        }
        for region in disabled {
            creds = creds.with_client(
                "sts",
                Arc::new(
                    InMemoryRegionClient::new(region, sts_ops()).with_error(
                        "get_caller_identity",
                        RemoteError::new("InvalidClientTokenId", "not opted in"),
                    ),
                ),
            );
        }
        Arc::new(creds)
    }

    #[tokio::test]
    async fn test_for_each_account_collects_results() {
        let vendor = StaticAccountVendor::new()
            .with_account("111", account_session("111", &["us-east-1"], &[]))
            .with_account("222", account_session("222", &["eu-west-1"], &[]));

        let results = for_each_account(&vendor, |session| {
            Box::pin(async move {
                let regions = session
                    .available_regions("ec2")
                    .await
                    .map_err(|e| Error::Internal(e.to_string()))?;
                Ok::<_, Error>(regions.len())
            })
        })
        .await
        .unwrap();

        assert_eq!(results.results.len(), 2);
        assert_eq!(results.result("111"), Some(&1));
        assert!(results.all_succeeded());
    }

    #[tokio::test]
    async fn test_for_each_account_borrows_caller_state() {
        let vendor = StaticAccountVendor::new()
            .with_account("111", account_session("111", &["us-east-1", "eu-west-1"], &[]));
        let service = String::from("ec2");
        let prefix = String::from("eu-");

        let results = for_each_account(&vendor, |session| {
            let service = service.as_str();
            let prefix = prefix.as_str();
            Box::pin(async move {
                let regions = session
                    .available_regions(service)
                    .await
                    .map_err(|e| Error::Internal(e.to_string()))?;
                Ok::<_, Error>(regions.iter().filter(|r| r.as_str().starts_with(prefix)).count())
            })
        })
        .await
        .unwrap();

        assert_eq!(results.result("111"), Some(&1));
    }

    #[tokio::test]
    async fn test_denied_account_recorded_as_exception() {
        let vendor = StaticAccountVendor::new()
            .with_account("111", account_session("111", &["us-east-1"], &[]))
            .with_denied_account("999", "AssumeRole denied");

        let results = for_each_account(&vendor, |_session| Box::pin(async { Ok::<_, Error>(()) }))
            .await
            .unwrap();

        assert_eq!(results.results.len(), 1);
        assert_eq!(results.exceptions.len(), 1);
        assert_eq!(results.exceptions[0].id, AccountId::from("999"));
        assert_eq!(results.exceptions[0].code, "Account");
    }

    #[tokio::test]
    async fn test_invoke_all_accounts_end_to_end() {
        let vendor = StaticAccountVendor::new()
            .with_account(
                "111",
                account_session("111", &["us-east-1", "eu-west-1"], &["ap-east-1"]),
            )
            .with_account("222", account_session("222", &["us-west-2"], &["me-south-1"]));

        let results = invoke_all_accounts(
            &vendor,
            &RegionProber::default(),
            "ec2",
            "describe_vpcs",
            &json!({}),
            &DispatchConfig::concurrent(),
        )
        .await
        .unwrap();

        assert!(results.all_succeeded());
        let first = results.result("111").unwrap();
        let regions: Vec<&RegionId> = first.keys().collect();
        assert_eq!(regions, vec![&RegionId::from("eu-west-1"), &RegionId::from("us-east-1")]);
        assert_eq!(first["us-east-1"]["Vpcs"][0]["VpcId"], "vpc-111-us-east-1");

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["Results"][1]["Id"], "222");
        assert_eq!(
            value["Results"][1]["Result"]["us-west-2"]["Vpcs"][0]["VpcId"],
            "vpc-222-us-west-2"
        );
    }

    #[tokio::test]
    async fn test_account_without_enabled_regions_fails() {
        let vendor = StaticAccountVendor::new()
            .with_account("111", account_session("111", &[], &["ap-east-1"]));

        let results = invoke_all_accounts(
            &vendor,
            &RegionProber::default(),
            "ec2",
            "describe_vpcs",
            &json!({}),
            &DispatchConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(results.exceptions[0].code, "EmptyRegionSet");
    }
}
