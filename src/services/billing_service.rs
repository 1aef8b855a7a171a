use std::collections::HashMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::MongoDB;
use crate::models::{Plan, PlanResponse, PlanValue, User, UserResponse};
use crate::services::stats_service::round_percent;
use crate::utils::dates;
use crate::utils::error::AppError;

// ==================== PLAN RESOLUTION ====================

/// Effective plan name for a user's stored `plan` value. Legacy documents
/// carry a numeric tier code (or a numeric string); newer ones carry the name
/// itself. Unset, blank and unmapped values fall back to "basic". Applied
/// once wherever a plan is interpreted, so every billing view agrees.
pub fn resolve_plan_name(plan: Option<&PlanValue>) -> String {
    match plan {
        Some(PlanValue::Name(name)) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return "basic".to_string();
            }
            match trimmed.parse::<f64>() {
                Ok(code) => ordinal_plan_name(code.trunc() as i64).to_string(),
                Err(_) => name.clone(),
            }
        }
        Some(PlanValue::Code(code)) => code
            .as_i64()
            .or_else(|| code.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(ordinal_plan_name)
            .unwrap_or("basic")
            .to_string(),
        None => "basic".to_string(),
    }
}

/// Legacy tier codes as they were numbered before plans moved to names
fn ordinal_plan_name(code: i64) -> &'static str {
    match code {
        1 => "basic",
        2 => "premium",
        3 => "premiumPlus",
        _ => "basic",
    }
}

// ==================== BILLING ROWS ====================

/// One dashboard row per user for GET /api/billing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRow {
    pub name: String,
    pub plan: String,
    /// Quota of the resolved plan; null when no Plan document carries it
    pub email_limit: Option<i64>,
    pub status: String,
    pub expiry: String,
    pub role: Option<String>,
}

/// Pure row mapping so the resolution and status logic is testable without
/// a store. `expiry` is the date 30 days out, every row alike (nothing
/// stores real billing periods yet).
pub fn build_billing_rows(users: &[User], plans: &[Plan], today: DateTime<Utc>) -> Vec<BillingRow> {
    let limits: HashMap<&str, i64> = plans
        .iter()
        .map(|plan| (plan.name.as_str(), plan.email_limit))
        .collect();
    let expiry = dates::day_key(today + Duration::days(30));

    users
        .iter()
        .map(|user| {
            let plan = resolve_plan_name(user.plan.as_ref());
            BillingRow {
                name: user.username.clone(),
                email_limit: limits.get(plan.as_str()).copied(),
                status: if user.is_verified { "active" } else { "inactive" }.to_string(),
                expiry: expiry.clone(),
                role: user.role.clone(),
                plan,
            }
        })
        .collect()
}

pub async fn billing_rows(db: &MongoDB) -> Result<Vec<BillingRow>, AppError> {
    let users: Vec<User> = db
        .collection::<User>("users")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    let plans: Vec<Plan> = db
        .collection::<Plan>("plans")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    Ok(build_billing_rows(&users, &plans, Utc::now()))
}

// ==================== USER BILLING DETAIL ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBilling {
    pub user: UserResponse,
    pub plan: Option<PlanResponse>,
    pub available_plans: Vec<PlanResponse>,
}

pub async fn user_billing(db: &MongoDB, user_id: ObjectId) -> Result<UserBilling, AppError> {
    let user = db
        .collection::<User>("users")
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let plans = db.collection::<Plan>("plans");
    let plan_name = resolve_plan_name(user.plan.as_ref());
    let user_plan = plans.find_one(doc! { "name": &plan_name }).await?;
    let all_plans: Vec<Plan> = plans.find(doc! {}).await?.try_collect().await?;

    Ok(UserBilling {
        user: UserResponse::from(user),
        plan: user_plan.map(PlanResponse::from),
        available_plans: all_plans.into_iter().map(PlanResponse::from).collect(),
    })
}

/// Move a user to a named plan. The plan must exist in the plans collection.
pub async fn update_user_plan(
    db: &MongoDB,
    user_id: ObjectId,
    plan: &str,
) -> Result<UserResponse, AppError> {
    let plans = db.collection::<Plan>("plans");
    if plans.find_one(doc! { "name": plan }).await?.is_none() {
        return Err(AppError::BadRequest(
            "Invalid plan. Plan not found in database".to_string(),
        ));
    }

    let users = db.collection::<User>("users");
    let updated = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "plan": plan, "updatedAt": bson::DateTime::now() } },
        )
        .await?;
    if updated.matched_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserResponse::from(user))
}

// ==================== ANALYTICS ====================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDistributionEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
    /// Display price (stored minor units / 100); 0 when no Plan doc exists
    pub price: f64,
    pub monthly_revenue: f64,
    pub yearly_revenue: f64,
    pub percentage: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueSummary {
    pub monthly: f64,
    pub yearly: f64,
    pub projected: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingAnalytics {
    pub plan_distribution: Vec<PlanDistributionEntry>,
    pub total_users: u64,
    pub revenue: RevenueSummary,
    pub conversion_rate: i64,
}

/// Distribution, revenue and conversion over in-memory user/plan sets.
/// Plan names keep first-seen order across users.
pub fn build_billing_analytics(users: &[User], plans: &[Plan]) -> BillingAnalytics {
    let prices: HashMap<&str, i64> = plans
        .iter()
        .map(|plan| (plan.name.as_str(), plan.price))
        .collect();

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for user in users {
        let name = resolve_plan_name(user.plan.as_ref());
        let entry = counts.entry(name.clone()).or_insert(0);
        if *entry == 0 {
            order.push(name);
        }
        *entry += 1;
    }

    let total_users = users.len() as u64;
    let mut plan_distribution = Vec::with_capacity(order.len());
    let mut monthly_total = 0.0;
    let mut yearly_total = 0.0;
    let mut priced_users = 0u64;

    for name in order {
        let count = counts[&name];
        let price = prices
            .get(name.as_str())
            .map(|cents| *cents as f64 / 100.0)
            .unwrap_or(0.0);
        let monthly = count as f64 * price;
        let yearly = monthly * 12.0;
        if price > 0.0 {
            priced_users += count;
        }
        monthly_total += monthly;
        yearly_total += yearly;

        plan_distribution.push(PlanDistributionEntry {
            id: name,
            count,
            price,
            monthly_revenue: monthly,
            yearly_revenue: yearly,
            percentage: round_percent(count, total_users),
        });
    }

    BillingAnalytics {
        plan_distribution,
        total_users,
        revenue: RevenueSummary {
            monthly: monthly_total,
            yearly: yearly_total,
            projected: yearly_total * 12.0,
        },
        conversion_rate: round_percent(priced_users, total_users),
    }
}

pub async fn billing_analytics(db: &MongoDB) -> Result<BillingAnalytics, AppError> {
    let users: Vec<User> = db
        .collection::<User>("users")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    let plans: Vec<Plan> = db
        .collection::<Plan>("plans")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    Ok(build_billing_analytics(&users, &plans))
}

// ==================== MOCK PAYMENT ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub currency: String,
    pub status: String,
    pub timestamp: String,
}

/// Mock gateway: echoes the amount back under a generated transaction id.
/// Nothing is charged anywhere.
pub fn process_payment(amount: Option<f64>) -> PaymentResult {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect();

    PaymentResult {
        success: true,
        transaction_id: format!("txn_{}_{}", Utc::now().timestamp_millis(), suffix),
        amount,
        currency: "USD".to_string(),
        status: "succeeded".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

// ==================== PLAN CRUD ====================

pub async fn list_plans(db: &MongoDB) -> Result<Vec<PlanResponse>, AppError> {
    let plans: Vec<Plan> = db
        .collection::<Plan>("plans")
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    Ok(plans.into_iter().map(PlanResponse::from).collect())
}

pub async fn update_plan_limit(
    db: &MongoDB,
    plan_name: &str,
    email_limit: i64,
) -> Result<PlanResponse, AppError> {
    let plans = db.collection::<Plan>("plans");
    let updated = plans
        .update_one(
            doc! { "name": plan_name },
            doc! { "$set": { "emailLimit": email_limit, "updatedAt": bson::DateTime::now() } },
        )
        .await?;
    if updated.matched_count == 0 {
        return Err(AppError::NotFound("Plan not found".to_string()));
    }

    let plan = plans
        .find_one(doc! { "name": plan_name })
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
    Ok(PlanResponse::from(plan))
}

pub async fn create_plan(
    db: &MongoDB,
    name: &str,
    email_limit: i64,
    price: i64,
    stripe_price_id: Option<String>,
    description: Option<String>,
) -> Result<PlanResponse, AppError> {
    let plans = db.collection::<Plan>("plans");
    if plans.find_one(doc! { "name": name }).await?.is_some() {
        return Err(AppError::BadRequest(
            "Plan with this name already exists".to_string(),
        ));
    }

    let now = bson::DateTime::now();
    let plan = Plan {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        price,
        email_limit,
        stripe_price_id: Some(stripe_price_id.unwrap_or_default()),
        description: Some(description.unwrap_or_default()),
        created_at: Some(now),
        updated_at: Some(now),
    };
    plans.insert_one(&plan).await?;

    Ok(PlanResponse::from(plan))
}

pub async fn delete_plan(db: &MongoDB, plan_name: &str) -> Result<(), AppError> {
    let deleted = db
        .collection::<Plan>("plans")
        .delete_one(doc! { "name": plan_name })
        .await?;
    if deleted.deleted_count == 0 {
        return Err(AppError::NotFound("Plan not found".to_string()));
    }
    Ok(())
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Number;

    fn user(name: &str, plan: Option<PlanValue>, verified: bool) -> User {
        User {
            id: Some(ObjectId::new()),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "secret".to_string(),
            role: Some("regular".to_string()),
            plan,
            is_verified: verified,
            verification_code: None,
            code_expires: None,
            reset_token: None,
            reset_token_expiry: None,
            provider: None,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn plan(name: &str, price: i64, email_limit: i64) -> Plan {
        Plan {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            price,
            email_limit,
            stripe_price_id: None,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_resolve_plan_name_codes() {
        let two = PlanValue::Code(Number::from(2));
        assert_eq!(resolve_plan_name(Some(&two)), "premium");
        let one = PlanValue::Code(Number::from(1));
        assert_eq!(resolve_plan_name(Some(&one)), "basic");
        let three = PlanValue::Code(Number::from(3));
        assert_eq!(resolve_plan_name(Some(&three)), "premiumPlus");
    }

    #[test]
    fn test_resolve_plan_name_numeric_strings() {
        let two = PlanValue::Name("2".to_string());
        assert_eq!(resolve_plan_name(Some(&two)), "premium");
        // fractional numeric strings truncate like the legacy parser did
        let two_ish = PlanValue::Name("2.9".to_string());
        assert_eq!(resolve_plan_name(Some(&two_ish)), "premium");
        let padded = PlanValue::Name("  3 ".to_string());
        assert_eq!(resolve_plan_name(Some(&padded)), "premiumPlus");
    }

    #[test]
    fn test_resolve_plan_name_fallbacks() {
        assert_eq!(resolve_plan_name(None), "basic");
        let unmapped = PlanValue::Code(Number::from(7));
        assert_eq!(resolve_plan_name(Some(&unmapped)), "basic");
        let blank = PlanValue::Name("   ".to_string());
        assert_eq!(resolve_plan_name(Some(&blank)), "basic");
        let fractional = PlanValue::Code(Number::from_f64(2.9).unwrap());
        assert_eq!(resolve_plan_name(Some(&fractional)), "basic");
    }

    #[test]
    fn test_resolve_plan_name_verbatim_names() {
        let pro = PlanValue::Name("Pro".to_string());
        assert_eq!(resolve_plan_name(Some(&pro)), "Pro");
        let premium = PlanValue::Name("premiumPlus".to_string());
        assert_eq!(resolve_plan_name(Some(&premium)), "premiumPlus");
    }

    #[test]
    fn test_billing_rows_mapping() {
        let users = vec![
            user("ana", Some(PlanValue::Name("premium".to_string())), true),
            user("bruno", None, false),
        ];
        let plans = vec![plan("basic", 0, 100), plan("premium", 2900, 5000)];
        let today = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let rows = build_billing_rows(&users, &plans, today);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].plan, "premium");
        assert_eq!(rows[0].email_limit, Some(5000));
        assert_eq!(rows[0].status, "active");
        assert_eq!(rows[0].expiry, "2025-07-01");

        assert_eq!(rows[1].plan, "basic");
        assert_eq!(rows[1].email_limit, Some(100));
        assert_eq!(rows[1].status, "inactive");
    }

    #[test]
    fn test_billing_rows_unknown_plan_has_null_limit() {
        let users = vec![user("ana", Some(PlanValue::Name("Pro".to_string())), true)];
        let plans = vec![plan("basic", 0, 100)];
        let today = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let rows = build_billing_rows(&users, &plans, today);
        assert_eq!(rows[0].plan, "Pro");
        assert_eq!(rows[0].email_limit, None);
    }

    #[test]
    fn test_analytics_counts_cover_all_users() {
        let users = vec![
            user("a", Some(PlanValue::Name("premium".to_string())), true),
            user("b", Some(PlanValue::Code(Number::from(2))), true),
            user("c", None, false),
            user("d", Some(PlanValue::Name("Pro".to_string())), true),
        ];
        let plans = vec![plan("basic", 0, 100), plan("premium", 2900, 5000)];

        let analytics = build_billing_analytics(&users, &plans);
        assert_eq!(analytics.total_users, 4);
        let counted: u64 = analytics.plan_distribution.iter().map(|p| p.count).sum();
        assert_eq!(counted, analytics.total_users);
    }

    #[test]
    fn test_analytics_revenue_math() {
        let users = vec![
            user("a", Some(PlanValue::Name("premium".to_string())), true),
            user("b", Some(PlanValue::Name("premium".to_string())), true),
            user("c", None, true),
        ];
        let plans = vec![plan("basic", 0, 100), plan("premium", 2900, 5000)];

        let analytics = build_billing_analytics(&users, &plans);
        let premium = analytics
            .plan_distribution
            .iter()
            .find(|p| p.id == "premium")
            .unwrap();
        assert_eq!(premium.price, 29.0);
        assert_eq!(premium.monthly_revenue, 58.0);
        assert_eq!(premium.yearly_revenue, 696.0);
        assert_eq!(premium.percentage, 67);

        assert_eq!(analytics.revenue.monthly, 58.0);
        assert_eq!(analytics.revenue.yearly, 696.0);
        assert_eq!(analytics.revenue.projected, 696.0 * 12.0);
        // 2 of 3 users sit on a priced plan
        assert_eq!(analytics.conversion_rate, 67);
    }

    #[test]
    fn test_analytics_first_seen_order() {
        let users = vec![
            user("a", Some(PlanValue::Name("Pro".to_string())), true),
            user("b", None, true),
            user("c", Some(PlanValue::Name("Pro".to_string())), true),
        ];
        let analytics = build_billing_analytics(&users, &[]);
        assert_eq!(analytics.plan_distribution[0].id, "Pro");
        assert_eq!(analytics.plan_distribution[1].id, "basic");
    }

    #[test]
    fn test_analytics_empty_store() {
        let analytics = build_billing_analytics(&[], &[]);
        assert_eq!(analytics.total_users, 0);
        assert!(analytics.plan_distribution.is_empty());
        assert_eq!(analytics.conversion_rate, 0);
        assert_eq!(analytics.revenue.monthly, 0.0);
    }

    #[test]
    fn test_process_payment_shape() {
        let payment = process_payment(Some(49.0));
        assert!(payment.success);
        assert!(payment.transaction_id.starts_with("txn_"));
        assert_eq!(payment.transaction_id.split('_').count(), 3);
        assert_eq!(payment.transaction_id.split('_').last().unwrap().len(), 9);
        assert_eq!(payment.currency, "USD");
        assert_eq!(payment.status, "succeeded");
        assert_eq!(payment.amount, Some(49.0));
    }

    #[test]
    fn test_process_payment_without_amount_omits_field() {
        let payment = process_payment(None);
        let value = serde_json::to_value(&payment).unwrap();
        assert!(value.get("amount").is_none());
    }
}
