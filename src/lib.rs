//! # multiregion - Multi-Region Dispatch Client
//!
//! Fans a single cloud API call out across independently authenticated
//! regional endpoints:
//! - **Prober**: finds the regions a credential is actually enabled in
//! - **Dispatch proxy**: runs one operation in every region, keyed by region
//! - **Accounts**: repeats the fan-out per account in a result envelope
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multiregion::region::{InMemoryCredentials, MultiRegionClient, RegionProber};
//!
//! #[tokio::main]
//! async fn main() -> multiregion::Result<()> {
//!     let session = InMemoryCredentials::new();
//!     let regions = RegionProber::default().enabled_regions(&session).await?;
//!     let ec2 = MultiRegionClient::new(&session, "ec2", regions).await?;
//!     let vpcs = ec2.invoke("describe_vpcs", &serde_json::json!({})).await?;
//!     for (region, payload) in vpcs {
//!         println!("{}: {}", region, payload);
//!     }
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod core;
pub mod monitoring;
pub mod region;

pub use core::error::{Error, Result};
pub use core::types::{AccountId, RegionId};
