use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::MongoDB;
use crate::models::{Campaign, EmailActivity, Lead, Mail, User, ACTIVITY_SENT, REPLY_TYPES};
use crate::utils::dates;
use crate::utils::error::AppError;

// ==================== SHARED HELPERS ====================

/// Integer percentage with the dashboard's rounding (half rounds up).
/// A zero denominator is defined as 0, not an error.
pub fn round_percent(part: u64, whole: u64) -> i64 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as i64
}

/// Window start for a user-period query. Unknown periods fall back to month.
pub fn period_start(period: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        "day" => dates::start_of_day(now),
        "week" => now - Duration::days(7),
        _ => dates::start_of_month(now),
    }
}

/// `{_id, count}` group row, the shape the dashboard's grouped queries emit.
/// `_id` is null only for the lead-conversion buckets.
#[derive(Debug, Serialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub count: u64,
}

fn count_sorted<I: IntoIterator<Item = String>>(keys: I) -> Vec<GroupCount> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(id, count)| GroupCount { id: Some(id), count })
        .collect()
}

/// Activity counts per type, type ascending
pub fn group_by_type(activities: &[EmailActivity]) -> Vec<GroupCount> {
    count_sorted(activities.iter().map(|a| a.activity_type.clone()))
}

/// Campaign counts per status, status ascending
pub fn group_campaigns_by_status(campaigns: &[Campaign]) -> Vec<GroupCount> {
    count_sorted(campaigns.iter().map(|c| c.status.clone()))
}

#[derive(Debug, Serialize)]
pub struct DayActivity {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
    pub types: Vec<String>,
}

/// Activity counts per UTC day with the distinct types seen that day,
/// day ascending. Days without activity do not appear.
pub fn group_by_day(activities: &[EmailActivity]) -> Vec<DayActivity> {
    let mut days: BTreeMap<String, (u64, BTreeSet<String>)> = BTreeMap::new();
    for activity in activities {
        let key = dates::day_key(dates::to_chrono(activity.timestamp));
        let entry = days.entry(key).or_default();
        entry.0 += 1;
        entry.1.insert(activity.activity_type.clone());
    }
    days.into_iter()
        .map(|(id, (count, types))| DayActivity {
            id,
            count,
            types: types.into_iter().collect(),
        })
        .collect()
}

/// Tally per key preserving first-seen order, then sort by count descending
fn tally_desc<I: IntoIterator<Item = ObjectId>>(keys: I) -> Vec<(ObjectId, u64)> {
    let mut counts: HashMap<ObjectId, u64> = HashMap::new();
    let mut order: Vec<ObjectId> = Vec::new();
    for key in keys {
        let entry = counts.entry(key).or_insert(0);
        if *entry == 0 {
            order.push(key);
        }
        *entry += 1;
    }
    let mut tallies: Vec<(ObjectId, u64)> =
        order.into_iter().map(|key| (key, counts[&key])).collect();
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies
}

// ==================== GLOBAL OVERVIEW ====================

/// Dashboard counters for GET /api/stats. `emailOpenRate` is historically
/// named: it is the reply rate (no open tracking exists to feed a real one),
/// and `emailClickRate` is fixed at 0 for the same reason.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub emails_sent: u64,
    pub active_campaigns: u64,
    pub engaged_leads: u64,
    pub system_health: String,
    pub total_users: u64,
    pub verified_users: u64,
    pub pro_users: u64,
    pub total_campaigns: u64,
    pub total_leads: u64,
    pub email_open_rate: i64,
    pub email_click_rate: i64,
}

pub async fn global_stats(db: &MongoDB) -> Result<GlobalStats, AppError> {
    let users = db.collection::<User>("users");
    let campaigns = db.collection::<Campaign>("campaigns");
    let leads = db.collection::<Lead>("leads");
    let activities = db.collection::<EmailActivity>("emailactivities");

    let total_users = users.count_documents(doc! {}).await?;
    let verified_users = users.count_documents(doc! { "isVerified": true }).await?;
    let pro_users = users.count_documents(doc! { "plan": "Pro" }).await?;

    let total_campaigns = campaigns.count_documents(doc! {}).await?;
    let active_campaigns = campaigns.count_documents(doc! { "status": "active" }).await?;

    let total_leads = leads.count_documents(doc! {}).await?;

    let emails_sent = activities
        .count_documents(doc! { "type": ACTIVITY_SENT })
        .await?;
    let total_replies = activities
        .count_documents(doc! { "type": { "$in": REPLY_TYPES.to_vec() } })
        .await?;

    Ok(GlobalStats {
        emails_sent,
        active_campaigns,
        engaged_leads: total_replies,
        system_health: "Healthy".to_string(),
        total_users,
        verified_users,
        pro_users,
        total_campaigns,
        total_leads,
        email_open_rate: round_percent(total_replies, emails_sent),
        email_click_rate: 0,
    })
}

// ==================== USER PERIOD STATS ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPeriodStats {
    pub period: String,
    pub sent_emails_count: u64,
    pub created_campaigns_count: u64,
    pub activities_by_type: Vec<GroupCount>,
    pub activities_by_day: Vec<DayActivity>,
    pub campaigns_by_status: Vec<GroupCount>,
    pub total_activities: u64,
}

/// Per-user statistics for GET /api/stats/user/{userId}. The window is
/// `period`: today / trailing 7x24h / calendar month to date. The user's
/// activity is whatever references one of their mailboxes as `senderId`.
pub async fn user_period_stats(
    db: &MongoDB,
    user_id: ObjectId,
    period: &str,
) -> Result<UserPeriodStats, AppError> {
    let start = dates::to_bson(period_start(period, Utc::now()));

    let sender_ids: Vec<ObjectId> = db
        .collection::<Mail>("mails")
        .distinct("_id", doc! { "userId": user_id })
        .await?
        .into_iter()
        .filter_map(|id| id.as_object_id())
        .collect();

    let window: Vec<EmailActivity> = db
        .collection::<EmailActivity>("emailactivities")
        .find(doc! {
            "senderId": { "$in": sender_ids },
            "timestamp": { "$gte": start },
        })
        .await?
        .try_collect()
        .await?;

    let campaigns: Vec<Campaign> = db
        .collection::<Campaign>("campaigns")
        .find(doc! { "userId": user_id, "createdAt": { "$gte": start } })
        .await?
        .try_collect()
        .await?;

    let activities_by_day = group_by_day(&window);
    let total_activities = activities_by_day.iter().map(|day| day.count).sum();
    let sent_emails_count = window.iter().filter(|a| a.is_sent()).count() as u64;

    Ok(UserPeriodStats {
        period: period.to_string(),
        sent_emails_count,
        created_campaigns_count: campaigns.len() as u64,
        activities_by_type: group_by_type(&window),
        activities_by_day,
        campaigns_by_status: group_campaigns_by_status(&campaigns),
        total_activities,
    })
}

// ==================== WEEKLY ENGAGEMENT ====================

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyEngagementPoint {
    pub label: String,
    pub sent: u64,
    pub engaged: u64,
    pub date: String,
}

/// The 7 day-window starts for the weekly series, oldest first
pub fn trailing_week(today: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    (0..7).rev().map(|offset| today - Duration::days(offset)).collect()
}

/// Last 7 calendar days ending today, oldest first. Always exactly 7 entries;
/// days without activity stay at zero.
pub async fn weekly_engagement(db: &MongoDB) -> Result<Vec<WeeklyEngagementPoint>, AppError> {
    let activities = db.collection::<EmailActivity>("emailactivities");
    let today = dates::start_of_day(Utc::now());

    let mut chart_data = Vec::with_capacity(7);
    for day_start in trailing_week(today) {
        let day_end = day_start + Duration::days(1);
        let window = doc! {
            "$gte": dates::to_bson(day_start),
            "$lt": dates::to_bson(day_end),
        };

        let sent = activities
            .count_documents(doc! { "type": ACTIVITY_SENT, "timestamp": window.clone() })
            .await?;
        let engaged = activities
            .count_documents(doc! {
                "type": { "$in": REPLY_TYPES.to_vec() },
                "timestamp": window,
            })
            .await?;

        chart_data.push(WeeklyEngagementPoint {
            label: dates::weekday_label(day_start).to_string(),
            sent,
            engaged,
            date: dates::day_key(day_start),
        });
    }

    Ok(chart_data)
}

// ==================== GROWTH / PERFORMANCE / CONVERSION ====================

/// Registrations of the trailing 30 days grouped by day, day ascending.
/// The threshold keeps the current time of day (not snapped to midnight).
pub async fn user_growth(db: &MongoDB) -> Result<Vec<GroupCount>, AppError> {
    let since = dates::to_bson(Utc::now() - Duration::days(30));

    let recent: Vec<User> = db
        .collection::<User>("users")
        .find(doc! { "createdAt": { "$gte": since } })
        .await?
        .try_collect()
        .await?;

    Ok(count_sorted(recent.iter().filter_map(|user| {
        user.created_at
            .map(|created| dates::day_key(dates::to_chrono(created)))
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformanceEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
    pub avg_engagement: Option<f64>,
    pub total_emails_sent: i64,
}

/// Campaigns grouped by status. `avgEngagement` and `totalEmailsSent` read
/// legacy per-campaign fields no writer stores anymore, so they come back
/// null and 0; engagement lives in `emailactivities`.
pub async fn campaign_performance(db: &MongoDB) -> Result<Vec<CampaignPerformanceEntry>, AppError> {
    let campaigns: Vec<Campaign> = db
        .collection::<Campaign>("campaigns")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    Ok(group_campaigns_by_status(&campaigns)
        .into_iter()
        .map(|group| CampaignPerformanceEntry {
            id: group.id.unwrap_or_default(),
            count: group.count,
            avg_engagement: None,
            total_emails_sent: 0,
        })
        .collect())
}

/// Leads grouped by `status`. The lead schema stores no status field, so
/// every document lands in the `_id: null` bucket; no leads means no buckets.
pub async fn lead_conversion(db: &MongoDB) -> Result<Vec<GroupCount>, AppError> {
    let total = db
        .collection::<Lead>("leads")
        .count_documents(doc! {})
        .await?;

    if total == 0 {
        return Ok(vec![]);
    }
    Ok(vec![GroupCount { id: None, count: total }])
}

// ==================== WEEKLY BREAKDOWN ====================

#[derive(Debug, Serialize)]
pub struct BreakdownEntry {
    #[serde(rename = "_id")]
    pub id: String,
    /// Kept at null when the referenced campaign/mailbox no longer exists;
    /// the group itself is never dropped
    pub name: Option<String>,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBreakdown {
    pub by_campaign: Vec<BreakdownEntry>,
    pub by_user: Vec<BreakdownEntry>,
}

/// Sent mail of the trailing 7 days (starting 6 days before today at UTC
/// midnight) grouped by campaign and by sender mailbox, count descending.
pub async fn weekly_breakdown(db: &MongoDB) -> Result<WeeklyBreakdown, AppError> {
    let start = dates::start_of_day(Utc::now()) - Duration::days(6);

    let activities: Vec<EmailActivity> = db
        .collection::<EmailActivity>("emailactivities")
        .find(doc! {
            "type": ACTIVITY_SENT,
            "timestamp": { "$gte": dates::to_bson(start) },
        })
        .await?
        .try_collect()
        .await?;

    let campaign_tallies = tally_desc(activities.iter().map(|a| a.campaign_id));
    let campaign_ids: Vec<ObjectId> = campaign_tallies.iter().map(|(id, _)| *id).collect();
    let campaigns: Vec<Campaign> = db
        .collection::<Campaign>("campaigns")
        .find(doc! { "_id": { "$in": campaign_ids } })
        .await?
        .try_collect()
        .await?;
    let campaign_names: HashMap<ObjectId, Option<String>> = campaigns
        .into_iter()
        .filter_map(|c| c.id.map(|id| (id, c.name)))
        .collect();

    let by_campaign = campaign_tallies
        .into_iter()
        .map(|(id, count)| BreakdownEntry {
            id: id.to_hex(),
            name: campaign_names.get(&id).cloned().flatten(),
            count,
        })
        .collect();

    let sender_tallies = tally_desc(activities.iter().map(|a| a.sender_id));
    let sender_ids: Vec<ObjectId> = sender_tallies.iter().map(|(id, _)| *id).collect();
    let mails: Vec<Mail> = db
        .collection::<Mail>("mails")
        .find(doc! { "_id": { "$in": sender_ids } })
        .await?
        .try_collect()
        .await?;
    let mail_emails: HashMap<ObjectId, String> = mails
        .into_iter()
        .filter_map(|m| m.id.map(|id| (id, m.email)))
        .collect();

    let by_user = sender_tallies
        .into_iter()
        .map(|(id, count)| BreakdownEntry {
            id: id.to_hex(),
            name: mail_emails.get(&id).cloned(),
            count,
        })
        .collect();

    Ok(WeeklyBreakdown { by_campaign, by_user })
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson;

    fn activity(kind: &str, at: DateTime<Utc>) -> EmailActivity {
        EmailActivity {
            id: Some(ObjectId::new()),
            lead_id: ObjectId::new(),
            campaign_id: ObjectId::new(),
            sender_id: ObjectId::new(),
            activity_type: kind.to_string(),
            subject: None,
            body: None,
            timestamp: dates::to_bson(at),
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
    fn test_round_percent_half_up() {
        assert_eq!(round_percent(1, 3), 33);
        assert_eq!(round_percent(1, 2), 50);
        assert_eq!(round_percent(2, 3), 67);
        // 2.5% rounds up, not to even
        assert_eq!(round_percent(1, 40), 3);
    }

    #[test]
    fn test_round_percent_zero_denominator() {
        assert_eq!(round_percent(0, 0), 0);
        assert_eq!(round_percent(5, 0), 0);
    }

    #[test]
    fn test_period_start_day() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 45).unwrap();
        let start = period_start("day", now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_start_week() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 45).unwrap();
        let start = period_start("week", now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 8, 14, 30, 45).unwrap());
    }

    #[test]
    fn test_period_start_month_and_unknown() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 30, 45).unwrap();
        let month_start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(period_start("month", now), month_start);
        assert_eq!(period_start("quarter", now), month_start);
    }

    #[test]
    fn test_trailing_week_shape() {
        let today = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        let week = trailing_week(today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(week[6], today);
        let labels: Vec<&str> = week.iter().map(|d| dates::weekday_label(*d)).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    }

    #[test]
    fn test_group_by_type_sorted() {
        let day = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let activities = vec![
            activity("sent", day),
            activity("reply", day),
            activity("sent", day),
            activity("ai-reply", day),
        ];
        let groups = group_by_type(&activities);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].id.as_deref(), Some("ai-reply"));
        assert_eq!(groups[1].id.as_deref(), Some("reply"));
        assert_eq!(groups[2].id.as_deref(), Some("sent"));
        assert_eq!(groups[2].count, 2);
    }

    #[test]
    fn test_group_by_day_no_gap_filling() {
        let first = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 4, 9, 0, 0).unwrap();
        let activities = vec![
            activity("sent", first),
            activity("reply", first),
            activity("sent", later),
        ];
        let days = group_by_day(&activities);
        // only days with activity, ascending, no synthesized gap days
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].id, "2025-06-01");
        assert_eq!(days[0].count, 2);
        assert_eq!(days[0].types, vec!["reply".to_string(), "sent".to_string()]);
        assert_eq!(days[1].id, "2025-06-04");
        assert_eq!(days[1].count, 1);
    }

    #[test]
    fn test_total_activities_is_sum_of_days() {
        let first = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let activities = vec![
            activity("sent", first),
            activity("sent", first),
            activity("reply", later),
        ];
        let days = group_by_day(&activities);
        let total: u64 = days.iter().map(|d| d.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_tally_desc_orders_by_count() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let tallies = tally_desc(vec![a, b, b, a, b]);
        assert_eq!(tallies[0], (b, 3));
        assert_eq!(tallies[1], (a, 2));
    }

    #[test]
    fn test_tally_desc_keeps_first_seen_order_on_ties() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let tallies = tally_desc(vec![a, b, a, b]);
        assert_eq!(tallies[0].0, a);
        assert_eq!(tallies[1].0, b);
    }

    #[test]
    fn test_group_count_serializes_null_id() {
        let bucket = GroupCount { id: None, count: 4 };
        let value = serde_json::to_value(&bucket).unwrap();
        assert!(value.get("_id").unwrap().is_null());
        assert_eq!(value.get("count").unwrap(), 4);
    }

    #[test]
    fn test_activity_type_predicates() {
        let day = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert!(activity("sent", day).is_sent());
        assert!(activity("reply", day).is_reply());
        assert!(activity("ai-reply", day).is_reply());
        assert!(activity("manual-reply", day).is_reply());
        assert!(!activity("sent", day).is_reply());
    }

    #[test]
    fn test_bson_datetime_survives_day_bucketing() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        let stored = bson::DateTime::from_millis(at.timestamp_millis());
        assert_eq!(dates::day_key(dates::to_chrono(stored)), "2025-06-01");
    }
}
