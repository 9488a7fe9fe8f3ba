//! Core types for the cloud billing clients.
//!
//! This crate holds the plain data shared by the client crate:
//!
//! - **Identifiers**: `RouteId`, `TargetId`
//! - **Billing month**: `BillingMonth` (`yyyy-mm`)
//! - **Usage reports**: `AccountSummary`, `AccountUsage`, `InstanceUsage`, ...
//! - **Activity tracker**: `Route`, `Target`, `Rule`, `CosEndpoint`, ...
//!
//! Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod month;
pub mod tracker;
pub mod usage;

pub use error::{ModelError, Result};
pub use ids::{IdError, RouteId, TargetId};
pub use month::BillingMonth;
pub use tracker::{
    CosEndpoint, Route, RouteInput, RouteList, Rule, Target, TargetCosEndpoint, TargetInput,
    TargetList, TargetType,
};
pub use usage::{
    AccountSummary, AccountUsage, Discount, InstanceUsage, InstancesUsage, InstancesUsageFirst,
    InstancesUsageNext, Metric, Offer, OfferCredits, OrgUsage, Plan, Resource,
    ResourceGroupUsage, ResourcesSummary, Subscription, SubscriptionSummary, SubscriptionTerm,
    SubscriptionTermCredits, SupportSummary,
};
