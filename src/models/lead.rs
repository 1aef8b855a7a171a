use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Target recipient document (collection: `leads`). Belongs to exactly one
/// list. The prospect fields mirror what the enrichment import writes;
/// `companyLinkdedin` is the on-disk spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,

    pub list_id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_clean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_linkdedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_linkedin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_staff_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_staff_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

/// Populated `leadId` shape used by recent-activity responses
#[derive(Debug, Clone, Serialize)]
pub struct LeadRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Lead> for LeadRef {
    fn from(lead: &Lead) -> Self {
        LeadRef {
            id: lead.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: lead.email.clone(),
            name: lead.name.clone(),
        }
    }
}
