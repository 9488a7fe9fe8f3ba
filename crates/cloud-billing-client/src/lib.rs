//! Cloud billing client SDK.
//!
//! Typed clients for two REST APIs:
//!
//! - [`UsageReportsClient`]: account summaries, aggregated usage, and
//!   resource instance usage, with cursor [`Pager`]s over the paged
//!   listings.
//! - [`ActivityTrackerClient`]: route and target management.
//!
//! # Example
//!
//! ```no_run
//! use cloud_billing_client::{ResourceUsageQuery, UsageReportsClient};
//!
//! # async fn example() -> Result<(), cloud_billing_client::ClientError> {
//! let config = UsageReportsClient::default_config()
//!     .with_header("Authorization", "Bearer <token>");
//! let client = UsageReportsClient::new(&config)?;
//!
//! let query = ResourceUsageQuery::new("account-id", "2024-01".parse()?)
//!     .with_region("us-south");
//! let instances = client.resource_usage_account_pager(query)?.get_all().await?;
//!
//! println!("{} instances billed", instances.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod activity_tracker;
mod config;
mod decode;
mod error;
mod executor;
pub mod pagination;
mod request;
mod usage_reports;

pub use activity_tracker::ActivityTrackerClient;
pub use config::{ServiceConfig, DEFAULT_TIMEOUT_SECONDS};
pub use decode::{decode, decode_page, DecodeFn};
pub use error::{ClientError, Result};
pub use executor::{HttpExecutor, RequestExecutor};
pub use pagination::{extract_cursor, Page, PageSource, PagedList, Pager, PagerState};
pub use request::{ApiRequest, QueryParams, RawResponse};
pub use usage_reports::{
    InstanceUsagePager, ResourceUsageQuery, UsageOptions, UsageReportsClient, UsageScope,
    START_PARAM,
};

pub use cloud_billing_core as models;
