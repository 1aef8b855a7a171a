use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Campaign lifecycle states accepted on creation
pub const CAMPAIGN_STATUSES: [&str; 4] = ["active", "paused", "completed", "draft"];

/// Reply-timing window stored on campaigns (e.g. `{ time: 2, unit: "days" }`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Outreach campaign document (collection: `campaigns`).
///
/// Engagement is never stored here: sent/reply counts are derived from
/// `emailactivities` at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// active | paused | completed | draft
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_of_voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_email_address: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_subscribe: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_subscribe_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_from: Option<ResponseWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_to: Option<ResponseWindow>,

    /// Mailbox address the campaign sends from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Owning user
    pub user_id: ObjectId,

    /// Target list of leads (a campaign without a list has nothing to send)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

/// Request body for POST /api/campaigns. Optional fields so validation can
/// produce the route's own error messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub name: Option<String>,
    pub sender: Option<String>,
    pub status: Option<String>,
    pub language: Option<String>,
    pub tone_of_voice: Option<String>,
    pub show_email_address: Option<bool>,
    pub un_subscribe: Option<bool>,
    pub un_subscribe_type: Option<String>,
    pub response_from: Option<ResponseWindow>,
    pub response_to: Option<ResponseWindow>,
    pub user_id: Option<String>,
    pub list_id: Option<String>,
}

/// Request body for PATCH /api/campaigns/{id} (allow-list; unknown fields ignored)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub status: Option<String>,
    pub sender: Option<String>,
    pub language: Option<String>,
    pub tone_of_voice: Option<String>,
    pub show_email_address: Option<bool>,
    pub un_subscribe: Option<bool>,
    pub un_subscribe_type: Option<String>,
    pub response_from: Option<ResponseWindow>,
    pub response_to: Option<ResponseWindow>,
    pub list_id: Option<String>,
}
