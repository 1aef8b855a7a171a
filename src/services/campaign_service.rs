use std::collections::{BTreeMap, HashMap};

use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::MongoDB;
use crate::models::{
    ActivityResponse, Campaign, CreateCampaignRequest, EmailActivity, Lead, List, ListRef,
    ResponseWindow, UpdateCampaignRequest, User, UserRef, ACTIVITY_SENT, CAMPAIGN_STATUSES,
    REPLY_TYPES,
};
use crate::services::stats_service::round_percent;
use crate::utils::dates;
use crate::utils::error::AppError;
use crate::utils::validation::is_valid_email;

const COLLECTION: &str = "campaigns";

/// Owner assigned to campaigns created without a userId (single-operator
/// deployments never send one)
const DEFAULT_USER_ID: &str = "507f1f77bcf86cd799439011";

// ==================== RESPONSE SHAPES ====================

/// Campaign document as rendered in responses (ids as hex, dates as RFC 3339).
/// Owner and list refs live on `PopulatedCampaign`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_of_voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_email_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub un_subscribe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub un_subscribe_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_from: Option<ResponseWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_to: Option<ResponseWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Campaign> for CampaignBody {
    fn from(campaign: Campaign) -> Self {
        CampaignBody {
            id: campaign.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: campaign.name,
            status: campaign.status,
            language: campaign.language,
            tone_of_voice: campaign.tone_of_voice,
            show_email_address: campaign.show_email_address,
            un_subscribe: campaign.un_subscribe,
            un_subscribe_type: campaign.un_subscribe_type,
            response_from: campaign.response_from,
            response_to: campaign.response_to,
            sender: campaign.sender,
            created_at: campaign.created_at.map(dates::to_rfc3339),
            updated_at: campaign.updated_at.map(dates::to_rfc3339),
        }
    }
}

/// Campaign with owner and list resolved to embedded refs. Both render as
/// null when unset or when the referenced document is gone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCampaign {
    #[serde(flatten)]
    pub campaign: CampaignBody,
    pub user_id: Option<UserRef>,
    pub list_id: Option<ListRef>,
}

/// List-view row: campaign plus engagement counters and running time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListItem {
    #[serde(flatten)]
    pub campaign: PopulatedCampaign,
    pub messages_sent: u64,
    pub messages_to_send: u64,
    pub replies: u64,
    pub engagement_rate: i64,
    /// Days between creation and last update, rounded up
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyActivityEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub sent: u64,
    pub replies: u64,
}

/// Detail view: counters plus the ten newest activities and the full
/// per-day history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: PopulatedCampaign,
    pub messages_sent: u64,
    pub messages_to_send: u64,
    pub replies: u64,
    pub engagement_rate: i64,
    pub recent_activities: Vec<ActivityResponse>,
    pub daily_activity: Vec<DailyActivityEntry>,
}

// ==================== DERIVED METRICS ====================

/// Sent/reply counts per calendar day (UTC), oldest day first. Days with no
/// activity never appear.
pub fn bucket_daily(activities: &[EmailActivity]) -> Vec<DailyActivityEntry> {
    let mut days: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for activity in activities {
        let day = dates::day_key(dates::to_chrono(activity.timestamp));
        let entry = days.entry(day).or_default();
        if activity.is_sent() {
            entry.0 += 1;
        }
        if activity.is_reply() {
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(day, (sent, replies))| DailyActivityEntry {
            id: day,
            sent,
            replies,
        })
        .collect()
}

/// Whole days between creation and last update, rounded up. 0 when either
/// timestamp is missing.
pub fn duration_days(
    created: Option<bson::DateTime>,
    updated: Option<bson::DateTime>,
) -> i64 {
    match (created, updated) {
        (Some(created), Some(updated)) => {
            let elapsed_ms = updated.timestamp_millis() - created.timestamp_millis();
            (elapsed_ms as f64 / 86_400_000.0).ceil() as i64
        }
        _ => 0,
    }
}

/// (messages sent, messages to send, replies) for one campaign.
/// `messages_to_send` is the size of the target list, 0 without a list.
async fn campaign_counts(
    db: &MongoDB,
    campaign_id: ObjectId,
    list_id: Option<ObjectId>,
) -> Result<(u64, u64, u64), AppError> {
    let activities = db.collection::<EmailActivity>("emailactivities");

    let messages_sent = activities
        .count_documents(doc! { "campaignId": campaign_id, "type": ACTIVITY_SENT })
        .await?;
    let replies = activities
        .count_documents(doc! { "campaignId": campaign_id, "type": { "$in": REPLY_TYPES.to_vec() } })
        .await?;

    let messages_to_send = match list_id {
        Some(list_id) => {
            db.collection::<Lead>("leads")
                .count_documents(doc! { "listId": list_id })
                .await?
        }
        None => 0,
    };

    Ok((messages_sent, messages_to_send, replies))
}

// ==================== POPULATION ====================

/// Resolve owner and list refs for a batch of campaigns with one query per
/// collection. Dangling references come back as None.
async fn populate_campaigns(
    db: &MongoDB,
    campaigns: Vec<Campaign>,
) -> Result<Vec<PopulatedCampaign>, AppError> {
    let mut user_ids: Vec<ObjectId> = Vec::new();
    let mut list_ids: Vec<ObjectId> = Vec::new();
    for campaign in &campaigns {
        if !user_ids.contains(&campaign.user_id) {
            user_ids.push(campaign.user_id);
        }
        if let Some(list_id) = campaign.list_id {
            if !list_ids.contains(&list_id) {
                list_ids.push(list_id);
            }
        }
    }

    let users: Vec<User> = if user_ids.is_empty() {
        Vec::new()
    } else {
        db.collection::<User>("users")
            .find(doc! { "_id": { "$in": user_ids } })
            .await?
            .try_collect()
            .await?
    };
    let lists: Vec<List> = if list_ids.is_empty() {
        Vec::new()
    } else {
        db.collection::<List>("lists")
            .find(doc! { "_id": { "$in": list_ids } })
            .await?
            .try_collect()
            .await?
    };

    let users_by_id: HashMap<ObjectId, UserRef> = users
        .iter()
        .filter_map(|user| user.id.map(|id| (id, UserRef::from(user))))
        .collect();
    let lists_by_id: HashMap<ObjectId, ListRef> = lists
        .iter()
        .filter_map(|list| list.id.map(|id| (id, ListRef::from(list))))
        .collect();

    Ok(campaigns
        .into_iter()
        .map(|campaign| {
            let user_id = users_by_id.get(&campaign.user_id).cloned();
            let list_id = campaign
                .list_id
                .and_then(|id| lists_by_id.get(&id).cloned());
            PopulatedCampaign {
                campaign: CampaignBody::from(campaign),
                user_id,
                list_id,
            }
        })
        .collect())
}

async fn populate_campaign(
    db: &MongoDB,
    campaign: Campaign,
) -> Result<PopulatedCampaign, AppError> {
    populate_campaigns(db, vec![campaign])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("Campaign population returned nothing".to_string()))
}

// ==================== LIST / DETAIL ====================

pub async fn list_campaigns(
    db: &MongoDB,
    status: Option<&str>,
) -> Result<Vec<CampaignListItem>, AppError> {
    let mut filter = Document::new();
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        filter.insert("status", status);
    }

    let campaigns: Vec<Campaign> = db
        .collection::<Campaign>(COLLECTION)
        .find(filter)
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    let mut counts = Vec::with_capacity(campaigns.len());
    let mut durations = Vec::with_capacity(campaigns.len());
    for campaign in &campaigns {
        let campaign_id = campaign.id.unwrap_or_else(ObjectId::new);
        counts.push(campaign_counts(db, campaign_id, campaign.list_id).await?);
        durations.push(duration_days(campaign.created_at, campaign.updated_at));
    }

    let populated = populate_campaigns(db, campaigns).await?;

    Ok(populated
        .into_iter()
        .zip(counts)
        .zip(durations)
        .map(|((campaign, (sent, to_send, replies)), duration)| CampaignListItem {
            campaign,
            messages_sent: sent,
            messages_to_send: to_send,
            replies,
            engagement_rate: round_percent(replies, sent),
            duration,
        })
        .collect())
}

pub async fn campaign_detail(
    db: &MongoDB,
    campaign_id: ObjectId,
) -> Result<CampaignDetail, AppError> {
    let campaign = db
        .collection::<Campaign>(COLLECTION)
        .find_one(doc! { "_id": campaign_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    let (messages_sent, messages_to_send, replies) =
        campaign_counts(db, campaign_id, campaign.list_id).await?;

    let activities = db.collection::<EmailActivity>("emailactivities");
    let recent: Vec<EmailActivity> = activities
        .find(doc! { "campaignId": campaign_id })
        .sort(doc! { "timestamp": -1 })
        .limit(10)
        .await?
        .try_collect()
        .await?;

    let mut lead_ids: Vec<ObjectId> = Vec::new();
    for activity in &recent {
        if !lead_ids.contains(&activity.lead_id) {
            lead_ids.push(activity.lead_id);
        }
    }
    let leads: Vec<Lead> = if lead_ids.is_empty() {
        Vec::new()
    } else {
        db.collection::<Lead>("leads")
            .find(doc! { "_id": { "$in": lead_ids } })
            .await?
            .try_collect()
            .await?
    };
    let leads_by_id: HashMap<ObjectId, &Lead> = leads
        .iter()
        .filter_map(|lead| lead.id.map(|id| (id, lead)))
        .collect();

    let recent_activities: Vec<ActivityResponse> = recent
        .iter()
        .map(|activity| {
            ActivityResponse::from_activity(activity, leads_by_id.get(&activity.lead_id).copied())
        })
        .collect();

    let history: Vec<EmailActivity> = activities
        .find(doc! { "campaignId": campaign_id })
        .await?
        .try_collect()
        .await?;
    let daily_activity = bucket_daily(&history);

    let campaign = populate_campaign(db, campaign).await?;

    Ok(CampaignDetail {
        campaign,
        messages_sent,
        messages_to_send,
        replies,
        engagement_rate: round_percent(replies, messages_sent),
        recent_activities,
        daily_activity,
    })
}

// ==================== CREATE / UPDATE / DELETE ====================

/// Field checks for campaign creation, first failure wins
pub fn validate_new_campaign(body: &CreateCampaignRequest) -> Result<(), AppError> {
    let name_ok = body
        .name
        .as_deref()
        .map(|name| !name.trim().is_empty())
        .unwrap_or(false);
    if !name_ok {
        return Err(AppError::BadRequest("Campaign name is required".to_string()));
    }

    let sender_ok = body
        .sender
        .as_deref()
        .map(is_valid_email)
        .unwrap_or(false);
    if !sender_ok {
        return Err(AppError::BadRequest(
            "Must be a valid sender email".to_string(),
        ));
    }

    let status_ok = body
        .status
        .as_deref()
        .map(|status| CAMPAIGN_STATUSES.contains(&status))
        .unwrap_or(false);
    if !status_ok {
        return Err(AppError::BadRequest("Invalid status".to_string()));
    }

    Ok(())
}

pub async fn create_campaign(
    db: &MongoDB,
    body: CreateCampaignRequest,
) -> Result<PopulatedCampaign, AppError> {
    validate_new_campaign(&body)?;

    let user_id = ObjectId::parse_str(body.user_id.as_deref().unwrap_or(DEFAULT_USER_ID))
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;
    let list_id = match body.list_id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => Some(
            ObjectId::parse_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid list ID".to_string()))?,
        ),
        None => None,
    };

    let now = bson::DateTime::now();
    let campaign = Campaign {
        id: Some(ObjectId::new()),
        name: body.name.map(|name| name.trim().to_string()),
        status: body.status.unwrap_or_else(|| "draft".to_string()),
        language: body.language,
        tone_of_voice: body.tone_of_voice,
        show_email_address: body.show_email_address,
        un_subscribe: body.un_subscribe,
        un_subscribe_type: body.un_subscribe_type,
        response_from: body.response_from,
        response_to: body.response_to,
        sender: body.sender.map(|sender| sender.trim().to_string()),
        user_id,
        list_id,
        created_at: Some(now),
        updated_at: Some(now),
    };
    db.collection::<Campaign>(COLLECTION)
        .insert_one(&campaign)
        .await?;

    populate_campaign(db, campaign).await
}

pub async fn update_campaign(
    db: &MongoDB,
    campaign_id: ObjectId,
    body: UpdateCampaignRequest,
) -> Result<PopulatedCampaign, AppError> {
    let mut set = Document::new();
    if let Some(name) = body.name {
        set.insert("name", name);
    }
    if let Some(status) = body.status {
        if !CAMPAIGN_STATUSES.contains(&status.as_str()) {
            return Err(AppError::BadRequest("Invalid status".to_string()));
        }
        set.insert("status", status);
    }
    if let Some(sender) = body.sender {
        set.insert("sender", sender);
    }
    if let Some(language) = body.language {
        set.insert("language", language);
    }
    if let Some(tone) = body.tone_of_voice {
        set.insert("toneOfVoice", tone);
    }
    if let Some(show) = body.show_email_address {
        set.insert("showEmailAddress", show);
    }
    if let Some(unsubscribe) = body.un_subscribe {
        set.insert("unSubscribe", unsubscribe);
    }
    if let Some(kind) = body.un_subscribe_type {
        set.insert("unSubscribeType", kind);
    }
    if let Some(window) = body.response_from {
        set.insert("responseFrom", bson::to_bson(&window)?);
    }
    if let Some(window) = body.response_to {
        set.insert("responseTo", bson::to_bson(&window)?);
    }
    if let Some(raw) = body.list_id.as_deref().filter(|id| !id.is_empty()) {
        let list_id = ObjectId::parse_str(raw)
            .map_err(|_| AppError::BadRequest("Invalid list ID".to_string()))?;
        set.insert("listId", list_id);
    }
    set.insert("updatedAt", bson::DateTime::now());

    let campaigns = db.collection::<Campaign>(COLLECTION);
    let updated = campaigns
        .update_one(doc! { "_id": campaign_id }, doc! { "$set": set })
        .await?;
    if updated.matched_count == 0 {
        return Err(AppError::NotFound("Campaign not found".to_string()));
    }

    let campaign = campaigns
        .find_one(doc! { "_id": campaign_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    populate_campaign(db, campaign).await
}

pub async fn delete_campaign(db: &MongoDB, campaign_id: ObjectId) -> Result<(), AppError> {
    let deleted = db
        .collection::<Campaign>(COLLECTION)
        .delete_one(doc! { "_id": campaign_id })
        .await?;
    if deleted.deleted_count == 0 {
        return Err(AppError::NotFound("Campaign not found".to_string()));
    }
    Ok(())
}

// ==================== OVERVIEW ====================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatsOverview {
    pub total_campaigns: u64,
    pub active_campaigns: u64,
    pub paused_campaigns: u64,
    pub completed_campaigns: u64,
    pub draft_campaigns: u64,
    pub total_messages_sent: u64,
    pub total_replies: u64,
    pub overall_engagement_rate: i64,
}

pub async fn stats_overview(db: &MongoDB) -> Result<CampaignStatsOverview, AppError> {
    let campaigns = db.collection::<Campaign>(COLLECTION);
    let total_campaigns = campaigns.count_documents(doc! {}).await?;
    let active_campaigns = campaigns.count_documents(doc! { "status": "active" }).await?;
    let paused_campaigns = campaigns.count_documents(doc! { "status": "paused" }).await?;
    let completed_campaigns = campaigns
        .count_documents(doc! { "status": "completed" })
        .await?;
    let draft_campaigns = campaigns.count_documents(doc! { "status": "draft" }).await?;

    let activities = db.collection::<EmailActivity>("emailactivities");
    let total_messages_sent = activities
        .count_documents(doc! { "type": ACTIVITY_SENT })
        .await?;
    let total_replies = activities
        .count_documents(doc! { "type": { "$in": REPLY_TYPES.to_vec() } })
        .await?;

    Ok(CampaignStatsOverview {
        total_campaigns,
        active_campaigns,
        paused_campaigns,
        completed_campaigns,
        draft_campaigns,
        total_messages_sent,
        total_replies,
        overall_engagement_rate: round_percent(total_replies, total_messages_sent),
    })
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn activity(kind: &str, at: &str) -> EmailActivity {
        let when = DateTime::parse_from_rfc3339(at)
            .unwrap()
            .with_timezone(&Utc);
        EmailActivity {
            id: Some(ObjectId::new()),
            lead_id: ObjectId::new(),
            campaign_id: ObjectId::new(),
            sender_id: ObjectId::new(),
            activity_type: kind.to_string(),
            subject: None,
            body: None,
            timestamp: dates::to_bson(when),
            sequence_step: None,
            reply_to: None,
            sentiment: None,
            intent: None,
            handled_by_ai: None,
            can_ai_reply: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_bucket_daily_counts_per_day() {
        let activities = vec![
            activity("sent", "2024-06-10T09:00:00Z"),
            activity("sent", "2024-06-10T15:00:00Z"),
            activity("reply", "2024-06-10T16:00:00Z"),
            activity("sent", "2024-06-12T08:00:00Z"),
            activity("ai-reply", "2024-06-12T11:00:00Z"),
        ];

        let daily = bucket_daily(&activities);
        assert_eq!(daily.len(), 2);

        assert_eq!(daily[0].id, "2024-06-10");
        assert_eq!(daily[0].sent, 2);
        assert_eq!(daily[0].replies, 1);

        // quiet days are skipped, not zero-filled
        assert_eq!(daily[1].id, "2024-06-12");
        assert_eq!(daily[1].sent, 1);
        assert_eq!(daily[1].replies, 1);
    }

    #[test]
    fn test_bucket_daily_unknown_type_creates_empty_entry() {
        let activities = vec![activity("bounce", "2024-06-10T09:00:00Z")];
        let daily = bucket_daily(&activities);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].sent, 0);
        assert_eq!(daily[0].replies, 0);
    }

    #[test]
    fn test_duration_days_rounds_up() {
        let start = bson::DateTime::from_millis(0);
        assert_eq!(duration_days(Some(start), Some(start)), 0);
        assert_eq!(
            duration_days(Some(start), Some(bson::DateTime::from_millis(1))),
            1
        );
        assert_eq!(
            duration_days(Some(start), Some(bson::DateTime::from_millis(86_400_000))),
            1
        );
        assert_eq!(
            duration_days(
                Some(start),
                Some(bson::DateTime::from_millis(86_400_001))
            ),
            2
        );
    }

    #[test]
    fn test_duration_days_missing_timestamps() {
        let now = bson::DateTime::now();
        assert_eq!(duration_days(None, Some(now)), 0);
        assert_eq!(duration_days(Some(now), None), 0);
        assert_eq!(duration_days(None, None), 0);
    }

    fn create_request() -> CreateCampaignRequest {
        CreateCampaignRequest {
            name: Some("Q3 Launch".to_string()),
            sender: Some("outreach@example.com".to_string()),
            status: Some("active".to_string()),
            language: None,
            tone_of_voice: None,
            show_email_address: None,
            un_subscribe: None,
            un_subscribe_type: None,
            response_from: None,
            response_to: None,
            user_id: None,
            list_id: None,
        }
    }

    #[test]
    fn test_validate_new_campaign_accepts_complete_request() {
        assert!(validate_new_campaign(&create_request()).is_ok());
    }

    #[test]
    fn test_validate_new_campaign_name_first() {
        let mut body = create_request();
        body.name = Some("   ".to_string());
        body.sender = None;
        let err = validate_new_campaign(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Campaign name is required");
    }

    #[test]
    fn test_validate_new_campaign_sender_before_status() {
        let mut body = create_request();
        body.sender = Some("not-an-email".to_string());
        body.status = Some("launched".to_string());
        let err = validate_new_campaign(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Must be a valid sender email");
    }

    #[test]
    fn test_validate_new_campaign_rejects_unknown_status() {
        let mut body = create_request();
        body.status = Some("launched".to_string());
        let err = validate_new_campaign(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid status");
    }

    #[test]
    fn test_validate_new_campaign_requires_status() {
        let mut body = create_request();
        body.status = None;
        let err = validate_new_campaign(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid status");
    }
}
