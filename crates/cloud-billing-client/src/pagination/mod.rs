//! Cursor-based pagination.
//!
//! A [`PagedList`] performs exactly one request for one page. A [`Pager`]
//! drives a [`PageSource`] across pages, threading the opaque cursor that
//! [`extract_cursor`] pulls out of each page's next link.
//!
//! ```no_run
//! use cloud_billing_client::{ResourceUsageQuery, UsageReportsClient};
//!
//! # async fn example(client: UsageReportsClient) -> cloud_billing_client::Result<()> {
//! let query = ResourceUsageQuery::new("account-id", "2024-01".parse()?).with_limit(50);
//! let mut pager = client.resource_usage_account_pager(query)?;
//!
//! while pager.has_next() {
//!     for instance in pager.get_next().await? {
//!         println!("{} {}", instance.resource_instance_id, instance.plan_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;
mod list;
mod pager;

use async_trait::async_trait;
use cloud_billing_core::{InstanceUsage, InstancesUsage};

use crate::error::Result;
use crate::request::QueryParams;

pub use cursor::extract_cursor;
pub use list::PagedList;
pub use pager::{Pager, PagerState};

/// One batch of items returned by a single list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Maximum number of items the server returns per call.
    pub limit: Option<u64>,
    /// Number of items actually returned.
    pub count: Option<u64>,
    /// Reference to the next page. `None` on the last page.
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// A page holding `items` and no pagination metadata.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            limit: None,
            count: None,
            next_link: None,
        }
    }

    /// Set the next link.
    #[must_use]
    pub fn with_next_link(mut self, link: impl Into<String>) -> Self {
        self.next_link = Some(link.into());
        self
    }

    /// Whether the server pointed at another page.
    #[must_use]
    pub fn has_next_link(&self) -> bool {
        self.next_link.is_some()
    }
}

impl From<InstancesUsage> for Page<InstanceUsage> {
    fn from(usage: InstancesUsage) -> Self {
        let next_link = usage
            .next_href()
            .filter(|href| !href.trim().is_empty())
            .map(str::to_string);

        Self {
            items: usage.resources,
            limit: usage.limit,
            count: usage.count,
            next_link,
        }
    }
}

/// Something a [`Pager`] can pull pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type of the pages.
    type Item: Send;

    /// Query parameter that carries the cursor.
    fn cursor_param(&self) -> &str;

    /// Filter parameters that stay fixed across all pages.
    fn filter(&self) -> &QueryParams;

    /// Fetch one page starting at `cursor` (`None` for the first page).
    async fn fetch(&self, cursor: Option<&str>) -> Result<Page<Self::Item>>;
}
