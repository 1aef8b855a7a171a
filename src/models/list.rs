use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Lead list document (collection: `lists`). Groups leads for a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub status: String,

    /// Where the leads came from (e.g. "website", "linkedin")
    #[serde(default)]
    pub source: Vec<String>,

    pub user_id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

/// Populated `listId` shape used by campaign responses
#[derive(Debug, Clone, Serialize)]
pub struct ListRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&List> for ListRef {
    fn from(list: &List) -> Self {
        ListRef {
            id: list.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: list.name.clone(),
        }
    }
}
