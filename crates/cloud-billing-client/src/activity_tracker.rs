//! Activity tracker API client: route and target management.

use std::sync::Arc;

use cloud_billing_core::{
    Route, RouteId, RouteInput, RouteList, Target, TargetId, TargetInput, TargetList,
};
use serde::de::DeserializeOwned;

use crate::config::ServiceConfig;
use crate::decode::decode;
use crate::error::{ClientError, Result};
use crate::executor::{HttpExecutor, RequestExecutor};
use crate::request::ApiRequest;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Activity tracker API client.
#[derive(Clone)]
pub struct ActivityTrackerClient {
    executor: Arc<dyn RequestExecutor>,
}

impl std::fmt::Debug for ActivityTrackerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTrackerClient").finish_non_exhaustive()
    }
}

impl ActivityTrackerClient {
    /// Default regional endpoint.
    pub const DEFAULT_SERVICE_URL: &'static str = "https://us-south.atracker.cloud.ibm.com";

    /// Default configuration pointing at [`Self::DEFAULT_SERVICE_URL`].
    #[must_use]
    pub fn default_config() -> ServiceConfig {
        ServiceConfig::new(Self::DEFAULT_SERVICE_URL)
    }

    /// Endpoint for a region, e.g. `eu-de`.
    #[must_use]
    pub fn service_url_for_region(region: &str) -> String {
        format!("https://{region}.atracker.cloud.ibm.com")
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

    /// Create a target.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn create_target(&self, input: &TargetInput) -> Result<Target> {
        let request = ApiRequest::post(path(&["targets"])).with_json(input)?;
        self.send(request).await
    }

    /// List all targets in the region.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_targets(&self) -> Result<Vec<Target>> {
        let list: TargetList = self.send(ApiRequest::get(path(&["targets"]))).await?;
        Ok(list.targets)
    }

    /// Get a target.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_target(&self, id: TargetId) -> Result<Target> {
        let id = id.to_string();
        self.send(ApiRequest::get(path(&["targets", id.as_str()]))).await
    }

    /// Replace a target.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn replace_target(&self, id: TargetId, input: &TargetInput) -> Result<Target> {
        let id = id.to_string();
        let request = ApiRequest::put(path(&["targets", id.as_str()])).with_json(input)?;
        self.send(request).await
    }

    /// Delete a target.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not confirm
    /// the deletion.
    pub async fn delete_target(&self, id: TargetId) -> Result<()> {
        let id = id.to_string();
        self.send_empty(ApiRequest::delete(path(&["targets", id.as_str()]))).await
    }

    /// Create a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn create_route(&self, input: &RouteInput) -> Result<Route> {
        let request = ApiRequest::post(path(&["routes"])).with_json(input)?;
        self.send(request).await
    }

    /// List all routes in the region.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_routes(&self) -> Result<Vec<Route>> {
        let list: RouteList = self.send(ApiRequest::get(path(&["routes"]))).await?;
        Ok(list.routes)
    }

    /// Get a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_route(&self, id: RouteId) -> Result<Route> {
        let id = id.to_string();
        self.send(ApiRequest::get(path(&["routes", id.as_str()]))).await
    }

    /// Replace a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn replace_route(&self, id: RouteId, input: &RouteInput) -> Result<Route> {
        let id = id.to_string();
        let request = ApiRequest::put(path(&["routes", id.as_str()])).with_json(input)?;
        self.send(request).await
    }

    /// Delete a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not confirm
    /// the deletion.
    pub async fn delete_route(&self, id: RouteId) -> Result<()> {
        let id = id.to_string();
        self.send_empty(ApiRequest::delete(path(&["routes", id.as_str()]))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let body = self.executor.execute(request).await?.into_success()?;
        decode(&body)
    }

    async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        let response = self.executor.execute(request).await?;
        let status = response.status;
        response.into_success()?;
        if status != 204 {
            return Err(ClientError::Api {
                status,
                code: "unexpected_status".to_string(),
                message: format!("expected 204 No Content, got {status}"),
            });
        }
        Ok(())
    }
}

fn path(rest: &[&str]) -> Vec<String> {
    API_PREFIX
        .iter()
        .chain(rest)
        .map(|s| (*s).to_string())
        .collect()
}
