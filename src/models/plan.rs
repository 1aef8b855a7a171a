use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::dates;

/// Billing plan document (collection: `plans`). `name` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    /// Price in minor currency units (cents). Divided by 100 for display.
    pub price: i64,

    /// Monthly sending quota for the tier
    pub email_limit: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: i64,
    pub email_limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        PlanResponse {
            id: plan.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: plan.name,
            price: plan.price,
            email_limit: plan.email_limit,
            stripe_price_id: plan.stripe_price_id,
            description: plan.description,
            created_at: plan.created_at.map(dates::to_rfc3339),
            updated_at: plan.updated_at.map(dates::to_rfc3339),
        }
    }
}
