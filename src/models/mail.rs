use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Sending mailbox document (collection: `mails`). Email activity references
/// it as `senderId`. This schema carries no timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Mailbox provider (e.g. "gmail")
    pub provider: String,

    pub email: String,

    #[serde(default)]
    pub status: bool,

    #[serde(default)]
    pub warm_up_status: bool,

    pub user_id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
