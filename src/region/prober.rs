//! Region availability prober.
//!
//! Finds the regions a credential context is actually authorized to use by
//! issuing one identity check per candidate region. A region whose check is
//! rejected with an "invalid token" code is simply not enabled for the
//! account; any other failure aborts the whole probe.

use crate::core::{now, Error, RegionId, Result, Timestamp};
use crate::region::config::{ExecutionMode, ProbeConfig};
use crate::region::credentials::{call_region, CredentialContext};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of a single region's identity check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// Identity check succeeded
    Available,
    /// Credential is not recognized in this region
    Unavailable,
}

/// Full result of a probe run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Regions where the identity check succeeded
    pub available: BTreeSet<RegionId>,
    /// Regions that rejected the credential
    pub unavailable: BTreeSet<RegionId>,
    /// When the probe completed
    pub checked_at: Timestamp,
}

/// Region availability prober.
#[derive(Clone, Debug, Default)]
pub struct RegionProber {
    config: ProbeConfig,
}

impl RegionProber {
    /// Create a prober.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Get configuration.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Check a single region.
    pub async fn check(
        &self,
        ctx: &dyn CredentialContext,
        region: &RegionId,
    ) -> Result<ProbeOutcome> {
        let client = ctx
            .client(&self.config.identity_service, region)
            .await
            .map_err(|e| Error::ClientConstruction {
                region: region.clone(),
                reason: e.to_string(),
            })?;

        match call_region(
            client.as_ref(),
            &self.config.identity_operation,
            &json!({}),
            self.config.call_timeout(),
        )
        .await
        {
            Ok(_) => {
                debug!(region = %region, "Identity check succeeded");
                Ok(ProbeOutcome::Available)
            }
            Err(Error::Remote { code, .. }) if self.config.is_unavailable_code(&code) => {
                debug!(region = %region, code = %code, "Region not enabled for credential");
                Ok(ProbeOutcome::Unavailable)
            }
            Err(e) => Err(e),
        }
    }

    /// Probe candidates and report both available and unavailable regions.
    ///
    /// Fails fast: the first unclassified error is returned and no partial
    /// report is produced. In concurrent mode the outstanding checks are
    /// dropped when one fails.
    #[tracing::instrument(
        skip(self, candidates, ctx),
        fields(service = %self.config.identity_service)
    )]
    pub async fn probe_report<I>(
        &self,
        candidates: I,
        ctx: &dyn CredentialContext,
    ) -> Result<ProbeReport>
    where
        I: IntoIterator<Item = RegionId>,
    {
        let candidates: BTreeSet<RegionId> = candidates.into_iter().collect();

        let outcomes: Vec<(RegionId, ProbeOutcome)> = match self.config.execution {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(candidates.len());
                for region in candidates {
                    let outcome = self.check(ctx, &region).await?;
                    outcomes.push((region, outcome));
                }
                outcomes
            }
            ExecutionMode::Concurrent => {
                try_join_all(candidates.into_iter().map(|region| async move {
                    let outcome = self.check(ctx, &region).await?;
                    Ok::<_, Error>((region, outcome))
                }))
                .await?
            }
        };

        let mut report = ProbeReport {
            available: BTreeSet::new(),
            unavailable: BTreeSet::new(),
            checked_at: now(),
        };
        for (region, outcome) in outcomes {
            match outcome {
                ProbeOutcome::Available => report.available.insert(region),
                ProbeOutcome::Unavailable => report.unavailable.insert(region),
            };
        }

        info!(
            available = report.available.len(),
            unavailable = report.unavailable.len(),
            "Region probe complete"
        );
        Ok(report)
    }

    /// Probe candidates and return the regions that are usable.
    pub async fn probe<I>(
        &self,
        candidates: I,
        ctx: &dyn CredentialContext,
    ) -> Result<BTreeSet<RegionId>>
    where
        I: IntoIterator<Item = RegionId>,
    {
        Ok(self.probe_report(candidates, ctx).await?.available)
    }

    /// Probe every region the backend advertises for the identity service.
    pub async fn enabled_regions(&self, ctx: &dyn CredentialContext) -> Result<BTreeSet<RegionId>> {
        let service = &self.config.identity_service;
        let candidates = ctx
            .available_regions(service)
            .await
            .map_err(|e| Error::RegionDiscovery {
                service: service.clone(),
                code: e.code,
                message: e.message,
            })?;

        self.probe(candidates, ctx).await
    }
}

/// Probe candidates with the default identity check.
pub async fn probe<I>(candidates: I, ctx: &dyn CredentialContext) -> Result<BTreeSet<RegionId>>
where
    I: IntoIterator<Item = RegionId>,
{
    RegionProber::default().probe(candidates, ctx).await
}
