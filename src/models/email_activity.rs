use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::models::lead::{Lead, LeadRef};
use crate::utils::dates;

/// Activity type recorded for an outgoing message
pub const ACTIVITY_SENT: &str = "sent";

/// Activity types counted as engagement. A reply of any flavor means the
/// lead answered.
pub const REPLY_TYPES: [&str; 3] = ["reply", "ai-reply", "manual-reply"];

/// Event-ledger document (collection: `emailactivities`): one record per sent
/// message or reply. Every engagement metric in the service is derived from
/// this collection at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailActivity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub lead_id: ObjectId,

    pub campaign_id: ObjectId,

    /// Mailbox that sent the message (ref `mails`)
    pub sender_id: ObjectId,

    /// sent | reply | ai-reply | manual-reply
    #[serde(rename = "type")]
    pub activity_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// When the message went out / the reply arrived
    pub timestamp: bson::DateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_step: Option<i64>,

    /// Self-reference forming a reply thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(
        rename = "handledByAI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub handled_by_ai: Option<bool>,

    #[serde(rename = "canAIReply", default)]
    pub can_ai_reply: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

impl EmailActivity {
    /// Whether this record counts as engagement (any reply flavor)
    pub fn is_reply(&self) -> bool {
        REPLY_TYPES.contains(&self.activity_type.as_str())
    }

    pub fn is_sent(&self) -> bool {
        self.activity_type == ACTIVITY_SENT
    }
}

/// Activity as rendered in a campaign's recent-activity list (ids as hex,
/// dates as RFC 3339). `leadId` carries the populated lead, null when the
/// lead was deleted out from under its activities.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub lead_id: Option<LeadRef>,
    pub campaign_id: String,
    pub sender_id: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_step: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(
        rename = "handledByAI",
        skip_serializing_if = "Option::is_none"
    )]
    pub handled_by_ai: Option<bool>,
    #[serde(rename = "canAIReply")]
    pub can_ai_reply: bool,
}

impl ActivityResponse {
    pub fn from_activity(activity: &EmailActivity, lead: Option<&Lead>) -> Self {
        ActivityResponse {
            id: activity.id.map(|id| id.to_hex()).unwrap_or_default(),
            lead_id: lead.map(LeadRef::from),
            campaign_id: activity.campaign_id.to_hex(),
            sender_id: activity.sender_id.to_hex(),
            activity_type: activity.activity_type.clone(),
            subject: activity.subject.clone(),
            body: activity.body.clone(),
            timestamp: dates::to_rfc3339(activity.timestamp),
            sequence_step: activity.sequence_step,
            reply_to: activity.reply_to.map(|id| id.to_hex()),
            sentiment: activity.sentiment.clone(),
            intent: activity.intent.clone(),
            handled_by_ai: activity.handled_by_ai,
            can_ai_reply: activity.can_ai_reply,
        }
    }
}
