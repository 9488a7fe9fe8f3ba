//! Usage report models.
//!
//! These mirror the JSON documents returned by the usage reports API.
//! Costs are reported as floating point amounts in the account's billing
//! currency, exactly as the service returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BillingMonth;

/// Summary of charges and credits for an account in one billing month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// The ID of the account.
    pub account_id: String,
    /// The month in which usages were incurred.
    pub billing_month: BillingMonth,
    /// Billing country.
    pub billing_country_code: String,
    /// The currency in which the account is billed.
    pub billing_currency_code: String,
    /// Charges related to cloud resources.
    pub resources: ResourcesSummary,
    /// Offers applicable for the account for the month.
    #[serde(default)]
    pub offers: Vec<Offer>,
    /// Support-related charges.
    #[serde(default)]
    pub support: Vec<SupportSummary>,
    /// Charges and credits related to subscriptions.
    pub subscription: SubscriptionSummary,
}

/// Charges related to cloud resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSummary {
    /// Billable charges for all cloud resources used in the account.
    pub billable_cost: f64,
    /// Non-billable charges for all cloud resources used in the account.
    pub non_billable_cost: f64,
}

/// An individual offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// The ID of the offer.
    pub offer_id: String,
    /// Total credits before applying the offer.
    pub credits_total: f64,
    /// Template the offer was generated from.
    pub offer_template: String,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub expires_on: DateTime<Utc>,
    /// Credit balance of the offer.
    pub credits: OfferCredits,
}

/// Credit information related to an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferCredits {
    /// Credits available at the beginning of the month.
    pub starting_balance: f64,
    /// Credits used this month.
    pub used: f64,
    /// Remaining credits.
    pub balance: f64,
}

/// Support charges for the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportSummary {
    /// Monthly support cost.
    pub cost: f64,
    /// Support tier.
    #[serde(rename = "type")]
    pub support_type: String,
    /// Additional support cost for the month.
    pub overage: f64,
}

/// Charges and credits related to subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    /// Charges after exhausting subscription and offer credits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overage: Option<f64>,
    /// Subscriptions applicable for the month.
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// A subscription on the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// The ID of the subscription.
    pub subscription_id: String,
    /// Charge agreement number.
    pub charge_agreement_number: String,
    /// Subscription type.
    #[serde(rename = "type")]
    pub subscription_type: String,
    /// Credits available in the subscription for the month.
    pub subscription_amount: f64,
    /// When the subscription became active.
    pub start: DateTime<Utc>,
    /// When the subscription ends. Absent for pay-as-you-go accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Total credits in the subscription.
    pub credits_total: f64,
    /// Terms the subscription is split into.
    #[serde(default)]
    pub terms: Vec<SubscriptionTerm>,
}

/// One term of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionTerm {
    /// Start of the term.
    pub start: DateTime<Utc>,
    /// End of the term.
    pub end: DateTime<Utc>,
    /// Credits for the term.
    pub credits: SubscriptionTermCredits,
}

/// Credits related to a subscription term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionTermCredits {
    /// Total credits for the term.
    pub total: f64,
    /// Unused credits at the beginning of the month.
    pub starting_balance: f64,
    /// Credits used this month.
    pub used: f64,
    /// Remaining credits.
    pub balance: f64,
}

/// Aggregated usage for all plans in an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// The ID of the account.
    pub account_id: String,
    /// Country whose pricing applies.
    pub pricing_country: String,
    /// Currency of all cost fields.
    pub currency_code: String,
    /// The month.
    pub month: BillingMonth,
    /// Resources used in the account.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Aggregated usage for all plans in a resource group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupUsage {
    /// The ID of the account.
    pub account_id: String,
    /// The ID of the resource group.
    pub resource_group_id: String,
    /// Country whose pricing applies.
    pub pricing_country: String,
    /// Currency of all cost fields.
    pub currency_code: String,
    /// The month.
    pub month: BillingMonth,
    /// Resources used in the resource group.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Aggregated usage for all plans in a Cloud Foundry organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUsage {
    /// The ID of the account.
    pub account_id: String,
    /// The ID of the organization.
    pub organization_id: String,
    /// Country whose pricing applies.
    pub pricing_country: String,
    /// Currency of all cost fields.
    pub currency_code: String,
    /// The month.
    pub month: BillingMonth,
    /// Resources used in the organization.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Container for all plans of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The ID of the resource.
    pub resource_id: String,
    /// Billable charges.
    pub billable_cost: f64,
    /// Pre-discount billable charges.
    pub billable_rated_cost: f64,
    /// Non-billable charges.
    pub non_billable_cost: f64,
    /// Pre-discount non-billable charges.
    pub non_billable_rated_cost: f64,
    /// Plans of the resource.
    #[serde(default)]
    pub plans: Vec<Plan>,
    /// Discounts applicable to the resource.
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

/// Aggregated values for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The ID of the plan.
    pub plan_id: String,
    /// Pricing region of the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_region: Option<String>,
    /// Whether the plan charges are billed to the customer.
    pub billable: bool,
    /// Total cost of the plan.
    pub cost: f64,
    /// Total pre-discount cost of the plan.
    pub rated_cost: f64,
    /// Metrics of the plan.
    #[serde(default)]
    pub usage: Vec<Metric>,
    /// Discounts applicable to the plan.
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

/// A single usage metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// The name of the metric.
    pub metric: String,
    /// Aggregated quantity.
    pub quantity: f64,
    /// Quantity used when calculating charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rateable_quantity: Option<f64>,
    /// Cost incurred by the metric.
    pub cost: f64,
    /// Pre-discount cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_cost: Option<f64>,
    /// Price tiers the cost was calculated with. Opaque to this crate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price: Vec<serde_json::Value>,
    /// Unit of the quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Informational cost excluded from plan charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_chargeable: Option<bool>,
    /// Discounts applicable to the metric.
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

/// A discount associated with a metric, plan, or resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// Reference ID of the discount.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Discount category name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Discount percentage.
    pub discount: f64,
}

/// Usage of one resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceUsage {
    /// The ID of the account.
    pub account_id: String,
    /// The ID of the resource instance.
    pub resource_instance_id: String,
    /// The ID of the resource.
    pub resource_id: String,
    /// The ID of the resource group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
    /// The ID of the organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// The ID of the space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    /// The ID of the consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
    /// Region where the instance was provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Pricing region for the usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_region: Option<String>,
    /// Country whose pricing applies.
    pub pricing_country: String,
    /// Currency of all cost fields.
    pub currency_code: String,
    /// Whether the charges are billed to the customer.
    pub billable: bool,
    /// The ID of the plan.
    pub plan_id: String,
    /// The month.
    pub month: BillingMonth,
    /// Metrics of the instance.
    #[serde(default)]
    pub usage: Vec<Metric>,
}

/// Link to the first page of a resource instance usage listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancesUsageFirst {
    /// URL of the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Link to the next page of a resource instance usage listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancesUsageNext {
    /// URL of the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Value of the `_start` query parameter for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// One page of resource instance usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancesUsage {
    /// Maximum number of instances the server returns per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Number of instances in this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Link to the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<InstancesUsageFirst>,
    /// Link to the next page. Absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<InstancesUsageNext>,
    /// Instance usage records.
    #[serde(default)]
    pub resources: Vec<InstanceUsage>,
}

impl InstancesUsage {
    /// The `href` of the next page, if the server returned one.
    #[must_use]
    pub fn next_href(&self) -> Option<&str> {
        self.next.as_ref().and_then(|n| n.href.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instances_usage_page() {
        let page: InstancesUsage = serde_json::from_value(json!({
            "limit": 2,
            "count": 1,
            "first": { "href": "/v4/accounts/acc/resource_instances/usage/2024-01?_limit=2" },
            "next": {
                "href": "/v4/accounts/acc/resource_instances/usage/2024-01?_limit=2&_start=abc",
                "offset": "abc"
            },
            "resources": [{
                "account_id": "acc",
                "resource_instance_id": "crn:v1:inst",
                "resource_id": "cloudant",
                "pricing_country": "USA",
                "currency_code": "USD",
                "billable": true,
                "plan_id": "lite",
                "month": "2024-01",
                "usage": [{
                    "metric": "STORAGE",
                    "quantity": 10.5,
                    "cost": 1.25,
                    "rated_cost": 1.5,
                    "price": [{ "price": 0.1, "quantityTier": 1 }],
                    "discounts": []
                }]
            }]
        }))
        .unwrap();

        assert_eq!(page.limit, Some(2));
        assert_eq!(page.count, Some(1));
        assert_eq!(
            page.next_href(),
            Some("/v4/accounts/acc/resource_instances/usage/2024-01?_limit=2&_start=abc")
        );
        let instance = &page.resources[0];
        assert_eq!(instance.month.to_string(), "2024-01");
        assert!(instance.region.is_none());
        assert_eq!(instance.usage[0].price.len(), 1);
    }

    #[test]
    fn last_page_has_no_next() {
        let page: InstancesUsage =
            serde_json::from_value(json!({ "limit": 10, "count": 0, "resources": [] })).unwrap();
        assert!(page.next_href().is_none());
        assert!(page.resources.is_empty());
    }

    #[test]
    fn account_summary() {
        let summary: AccountSummary = serde_json::from_value(json!({
            "account_id": "acc",
            "billing_month": "2024-02",
            "billing_country_code": "USA",
            "billing_currency_code": "USD",
            "resources": { "billable_cost": 12.5, "non_billable_cost": 0.0 },
            "offers": [{
                "offer_id": "offer-1",
                "credits_total": 200.0,
                "offer_template": "trial",
                "valid_from": "2024-01-01T00:00:00Z",
                "expires_on": "2024-12-31T00:00:00Z",
                "credits": { "starting_balance": 200.0, "used": 12.5, "balance": 187.5 }
            }],
            "support": [{ "cost": 0.0, "type": "basic", "overage": 0.0 }],
            "subscription": {}
        }))
        .unwrap();

        assert_eq!(summary.billing_month, "2024-02".parse().unwrap());
        assert_eq!(summary.offers[0].credits.balance, 187.5);
        assert_eq!(summary.support[0].support_type, "basic");
        assert!(summary.subscription.subscriptions.is_empty());
    }

    #[test]
    fn rejects_bad_month() {
        let result = serde_json::from_value::<AccountUsage>(json!({
            "account_id": "acc",
            "pricing_country": "USA",
            "currency_code": "USD",
            "month": "March",
            "resources": []
        }));
        assert!(result.is_err());
    }
}
