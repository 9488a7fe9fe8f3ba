//! Activity tracker models: routes and targets.
//!
//! A target describes where audit events are delivered (a Cloud Object
//! Storage bucket). A route selects which targets receive the events of a
//! region.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{RouteId, TargetId};

/// Kind of target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Cloud Object Storage bucket.
    Cos,
    /// A type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// COS endpoint settings supplied when creating or replacing a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosEndpoint {
    /// Host name of the COS endpoint.
    pub endpoint: String,
    /// CRN of the COS instance.
    pub target_crn: String,
    /// Bucket name in the COS instance.
    pub bucket: String,
    /// API key with writer access to the COS instance.
    pub api_key: String,
}

impl CosEndpoint {
    /// Create COS endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingField`] if any value is empty.
    pub fn new(
        endpoint: impl Into<String>,
        target_crn: impl Into<String>,
        bucket: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let cos = Self {
            endpoint: endpoint.into(),
            target_crn: target_crn.into(),
            bucket: bucket.into(),
            api_key: api_key.into(),
        };

        for (field, value) in [
            ("endpoint", &cos.endpoint),
            ("target_crn", &cos.target_crn),
            ("bucket", &cos.bucket),
            ("api_key", &cos.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(ModelError::MissingField(field));
            }
        }

        Ok(cos)
    }
}

/// COS endpoint as returned by the service. Credentials come back masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCosEndpoint {
    /// Host name of the COS endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// CRN of the COS instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_crn: Option<String>,
    /// Bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// API key (masked as `REDACTED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// A target resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// The ID of the target.
    pub id: TargetId,
    /// The name of the target.
    pub name: String,
    /// ID of the activity tracker instance in this region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// CRN of the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    /// Kind of target.
    pub target_type: TargetType,
    /// Encryption key used to buffer events (masked).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_key: Option<String>,
    /// COS endpoint details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_endpoint: Option<TargetCosEndpoint>,
}

/// A list of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetList {
    /// The targets.
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// Payload to create or replace a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetInput {
    /// Name of the target. At most 256 characters.
    pub name: String,
    /// Kind of target.
    pub target_type: TargetType,
    /// COS endpoint settings.
    pub cos_endpoint: CosEndpoint,
}

impl TargetInput {
    /// Longest accepted target name.
    pub const MAX_NAME_LEN: usize = 256;

    /// Create a COS target payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or too long.
    pub fn cos(name: impl Into<String>, cos_endpoint: CosEndpoint) -> Result<Self> {
        let name = name.into();
        validate_name(&name, Self::MAX_NAME_LEN)?;
        Ok(Self {
            name,
            target_type: TargetType::Cos,
            cos_endpoint,
        })
    }
}

/// A routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Target IDs. Regional routes use bare target UUIDs; global routes use
    /// `region:target-id`.
    pub target_ids: Vec<String>,
}

impl Rule {
    /// Rule sending events to a single target in the same region.
    #[must_use]
    pub fn to_target(target_id: TargetId) -> Self {
        Self {
            target_ids: vec![target_id.to_string()],
        }
    }
}

/// A route resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The ID of the route.
    pub id: RouteId,
    /// The name of the route.
    pub name: String,
    /// ID of the activity tracker instance in this region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// CRN of the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crn: Option<String>,
    /// Version of the route, incremented on every replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    /// Whether global events are forwarded to this region.
    #[serde(default)]
    pub receive_global_events: bool,
    /// Routing rules, evaluated in order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A list of routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteList {
    /// The routes.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Payload to create or replace a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInput {
    /// Name of the route. At most 180 characters.
    pub name: String,
    /// Whether global events are forwarded to this region.
    pub receive_global_events: bool,
    /// Routing rules, evaluated in order.
    pub rules: Vec<Rule>,
}

impl RouteInput {
    /// Longest accepted route name.
    pub const MAX_NAME_LEN: usize = 180;

    /// Create a route payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or no rule is given.
    pub fn new(
        name: impl Into<String>,
        receive_global_events: bool,
        rules: Vec<Rule>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name, Self::MAX_NAME_LEN)?;
        if rules.is_empty() || rules.iter().any(|r| r.target_ids.is_empty()) {
            return Err(ModelError::MissingField("rules.target_ids"));
        }
        Ok(Self {
            name,
            receive_global_events,
            rules,
        })
    }
}

fn validate_name(name: &str, max_len: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ModelError::MissingField("name"));
    }
    let len = name.chars().count();
    if len > max_len {
        return Err(ModelError::InvalidField {
            field: "name",
            reason: format!("{len} characters, at most {max_len} allowed"),
        });
    }
    Ok(())
}
