//! Usage reports API client.

use std::sync::Arc;

use cloud_billing_core::{
    AccountSummary, AccountUsage, BillingMonth, InstanceUsage, InstancesUsage, OrgUsage,
    ResourceGroupUsage,
};
use serde::de::DeserializeOwned;

use crate::config::ServiceConfig;
use crate::decode::{decode, decode_page};
use crate::error::{ClientError, Result};
use crate::executor::{HttpExecutor, RequestExecutor};
use crate::pagination::{PagedList, Pager};
use crate::request::{ApiRequest, QueryParams};

/// Query parameter carrying the resource usage cursor.
pub const START_PARAM: &str = "_start";

/// Pager over resource instance usage records.
pub type InstanceUsagePager = Pager<PagedList<InstanceUsage>>;

/// Options shared by the aggregated usage reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageOptions {
    /// Account the report is requested for.
    pub account_id: String,
    /// Billing month of the report.
    pub billing_month: BillingMonth,
    /// Include names of resources, plans, and groups.
    pub names: Option<bool>,
    /// Preferred languages for names (`Accept-Language`).
    pub accept_language: Option<String>,
}

impl UsageOptions {
    /// Options for the given account and month.
    #[must_use]
    pub fn new(account_id: impl Into<String>, billing_month: BillingMonth) -> Self {
        Self {
            account_id: account_id.into(),
            billing_month,
            names: None,
            accept_language: None,
        }
    }

    /// Include names in the report.
    #[must_use]
    pub fn with_names(mut self, names: bool) -> Self {
        self.names = Some(names);
        self
    }

    /// Set the preferred languages for names.
    #[must_use]
    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = Some(language.into());
        self
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("_names", self.names);
        query
    }

    fn headers(&self) -> Vec<(String, String)> {
        language_header(self.accept_language.as_deref())
    }
}

/// Which slice of the account a resource usage listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageScope {
    /// The whole account.
    Account,
    /// One resource group.
    ResourceGroup(String),
    /// One Cloud Foundry organization.
    Organization(String),
}

/// Filters for resource instance usage listings.
///
/// The filter is fixed for a whole pagination session; only the cursor moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUsageQuery {
    /// Account the usage is requested for.
    pub account_id: String,
    /// Billing month.
    pub billing_month: BillingMonth,
    /// Include names of resources, plans, and groups.
    pub names: Option<bool>,
    /// Preferred languages for names (`Accept-Language`).
    pub accept_language: Option<String>,
    /// Records per page. The service defaults to 10.
    pub limit: Option<u32>,
    /// Cursor to start from. Only for single-page calls; pagers reject it.
    pub start: Option<String>,
    /// Filter by resource group (account scope only).
    pub resource_group_id: Option<String>,
    /// Filter by organization (account scope only).
    pub organization_id: Option<String>,
    /// Filter by resource instance.
    pub resource_instance_id: Option<String>,
    /// Filter by resource.
    pub resource_id: Option<String>,
    /// Filter by plan.
    pub plan_id: Option<String>,
    /// Filter by region where the instance was provisioned.
    pub region: Option<String>,
}

impl ResourceUsageQuery {
    /// Query for the given account and month with no extra filters.
    #[must_use]
    pub fn new(account_id: impl Into<String>, billing_month: BillingMonth) -> Self {
        Self {
            account_id: account_id.into(),
            billing_month,
            names: None,
            accept_language: None,
            limit: None,
            start: None,
            resource_group_id: None,
            organization_id: None,
            resource_instance_id: None,
            resource_id: None,
            plan_id: None,
            region: None,
        }
    }

    /// Include names in the records.
    #[must_use]
    pub fn with_names(mut self, names: bool) -> Self {
        self.names = Some(names);
        self
    }

    /// Set the preferred languages for names.
    #[must_use]
    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = Some(language.into());
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Start from a cursor returned by an earlier page.
    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Filter by resource group.
    #[must_use]
    pub fn with_resource_group_id(mut self, id: impl Into<String>) -> Self {
        self.resource_group_id = Some(id.into());
        self
    }

    /// Filter by organization.
    #[must_use]
    pub fn with_organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    /// Filter by resource instance.
    #[must_use]
    pub fn with_resource_instance_id(mut self, id: impl Into<String>) -> Self {
        self.resource_instance_id = Some(id.into());
        self
    }

    /// Filter by resource.
    #[must_use]
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    /// Filter by plan.
    #[must_use]
    pub fn with_plan_id(mut self, id: impl Into<String>) -> Self {
        self.plan_id = Some(id.into());
        self
    }

    /// Filter by region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Query parameters for `scope`, in the order the service documents them.
    fn query(&self, scope: &UsageScope) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("_names", self.names);
        query.push_opt("_limit", self.limit);
        query.push_opt(START_PARAM, self.start.as_deref());
        if matches!(scope, UsageScope::Account) {
            query.push_opt("resource_group_id", self.resource_group_id.as_deref());
            query.push_opt("organization_id", self.organization_id.as_deref());
        }
        query.push_opt("resource_instance_id", self.resource_instance_id.as_deref());
        query.push_opt("resource_id", self.resource_id.as_deref());
        query.push_opt("plan_id", self.plan_id.as_deref());
        query.push_opt("region", self.region.as_deref());
        query
    }

    fn segments(&self, scope: &UsageScope) -> Result<Vec<String>> {
        let account = required("account_id", &self.account_id)?;
        let month = self.billing_month.to_string();

        let mut segments = vec!["v4".to_string(), "accounts".to_string(), account.to_string()];
        match scope {
            UsageScope::Account => {}
            UsageScope::ResourceGroup(id) => {
                segments.push("resource_groups".to_string());
                segments.push(required("resource_group_id", id)?.to_string());
            }
            UsageScope::Organization(id) => {
                segments.push("organizations".to_string());
                segments.push(required("organization_id", id)?.to_string());
            }
        }
        segments.extend([
            "resource_instances".to_string(),
            "usage".to_string(),
            month,
        ]);
        Ok(segments)
    }
}

/// Usage reports API client.
#[derive(Clone)]
pub struct UsageReportsClient {
    executor: Arc<dyn RequestExecutor>,
}

impl std::fmt::Debug for UsageReportsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageReportsClient").finish_non_exhaustive()
    }
}

impl UsageReportsClient {
    /// Production endpoint of the usage reports API.
    pub const DEFAULT_SERVICE_URL: &'static str = "https://billing.cloud.ibm.com";

    /// Default configuration pointing at [`Self::DEFAULT_SERVICE_URL`].
    #[must_use]
    pub fn default_config() -> ServiceConfig {
        ServiceConfig::new(Self::DEFAULT_SERVICE_URL)
    }

    /// Create a client that sends requests with `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the configuration is invalid.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(HttpExecutor::new(config)?)))
    }

    /// Create a client on top of a custom executor.
    #[must_use]
    pub fn with_executor(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Get the account summary for a month.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_account_summary(
        &self,
        account_id: &str,
        billing_month: BillingMonth,
    ) -> Result<AccountSummary> {
        let month = billing_month.to_string();
        let request = ApiRequest::get([
            "v4",
            "accounts",
            required("account_id", account_id)?,
            "summary",
            month.as_str(),
        ]);
        self.send(request).await
    }

    /// Get usage aggregated over the whole account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_account_usage(&self, options: &UsageOptions) -> Result<AccountUsage> {
        let month = options.billing_month.to_string();
        let request = ApiRequest::get([
            "v4",
            "accounts",
            required("account_id", &options.account_id)?,
            "usage",
            month.as_str(),
        ]);
        self.send(with_usage_options(request, options)).await
    }

    /// Get usage aggregated over a resource group.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_resource_group_usage(
        &self,
        resource_group_id: &str,
        options: &UsageOptions,
    ) -> Result<ResourceGroupUsage> {
        let month = options.billing_month.to_string();
        let request = ApiRequest::get([
            "v4",
            "accounts",
            required("account_id", &options.account_id)?,
            "resource_groups",
            required("resource_group_id", resource_group_id)?,
            "usage",
            month.as_str(),
        ]);
        self.send(with_usage_options(request, options)).await
    }

    /// Get usage aggregated over a Cloud Foundry organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_org_usage(
        &self,
        organization_id: &str,
        options: &UsageOptions,
    ) -> Result<OrgUsage> {
        let month = options.billing_month.to_string();
        let request = ApiRequest::get([
            "v4",
            "accounts",
            required("account_id", &options.account_id)?,
            "organizations",
            required("organization_id", organization_id)?,
            "usage",
            month.as_str(),
        ]);
        self.send(with_usage_options(request, options)).await
    }

    /// Get one page of resource instance usage.
    ///
    /// Honors [`ResourceUsageQuery::start`] to resume from a known cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_resource_usage(
        &self,
        scope: &UsageScope,
        query: &ResourceUsageQuery,
    ) -> Result<InstancesUsage> {
        let request = ApiRequest::get(query.segments(scope)?)
            .with_headers(&language_header(query.accept_language.as_deref()))
            .with_query(query.query(scope));
        self.send(request).await
    }

    /// Get one page of resource instance usage in the account.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::get_resource_usage`].
    pub async fn get_resource_usage_account(
        &self,
        query: &ResourceUsageQuery,
    ) -> Result<InstancesUsage> {
        self.get_resource_usage(&UsageScope::Account, query).await
    }

    /// Get one page of resource instance usage in a resource group.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::get_resource_usage`].
    pub async fn get_resource_usage_resource_group(
        &self,
        resource_group_id: impl Into<String>,
        query: &ResourceUsageQuery,
    ) -> Result<InstancesUsage> {
        let scope = UsageScope::ResourceGroup(resource_group_id.into());
        self.get_resource_usage(&scope, query).await
    }

    /// Get one page of resource instance usage in an organization.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::get_resource_usage`].
    pub async fn get_resource_usage_org(
        &self,
        organization_id: impl Into<String>,
        query: &ResourceUsageQuery,
    ) -> Result<InstancesUsage> {
        let scope = UsageScope::Organization(organization_id.into());
        self.get_resource_usage(&scope, query).await
    }

    /// Pager over all resource instance usage in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if `query.start` is set, and
    /// [`ClientError::InvalidArgument`] if a path parameter is empty.
    pub fn resource_usage_pager(
        &self,
        scope: UsageScope,
        query: ResourceUsageQuery,
    ) -> Result<InstanceUsagePager> {
        let list = PagedList::new(
            Arc::clone(&self.executor),
            query.segments(&scope)?,
            query.query(&scope),
            START_PARAM,
            decode_page::<InstancesUsage, InstanceUsage>,
        )
        .with_headers(language_header(query.accept_language.as_deref()));

        Pager::new(list)
    }

    /// Pager over all resource instance usage in the account.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::resource_usage_pager`].
    pub fn resource_usage_account_pager(
        &self,
        query: ResourceUsageQuery,
    ) -> Result<InstanceUsagePager> {
        self.resource_usage_pager(UsageScope::Account, query)
    }

    /// Pager over all resource instance usage in a resource group.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::resource_usage_pager`].
    pub fn resource_usage_resource_group_pager(
        &self,
        resource_group_id: impl Into<String>,
        query: ResourceUsageQuery,
    ) -> Result<InstanceUsagePager> {
        self.resource_usage_pager(UsageScope::ResourceGroup(resource_group_id.into()), query)
    }

    /// Pager over all resource instance usage in an organization.
    ///
    /// # Errors
    ///
    /// See [`UsageReportsClient::resource_usage_pager`].
    pub fn resource_usage_org_pager(
        &self,
        organization_id: impl Into<String>,
        query: ResourceUsageQuery,
    ) -> Result<InstanceUsagePager> {
        self.resource_usage_pager(UsageScope::Organization(organization_id.into()), query)
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self.executor.execute(request).await?.into_success()?;
        decode(&body)
    }
}

fn with_usage_options(request: ApiRequest, options: &UsageOptions) -> ApiRequest {
    request
        .with_headers(&options.headers())
        .with_query(options.query())
}

fn language_header(language: Option<&str>) -> Vec<(String, String)> {
    language
        .map(|l| vec![("Accept-Language".to_string(), l.to_string())])
        .unwrap_or_default()
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(value)
}
