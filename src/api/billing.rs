use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::database::MongoDB;
use crate::services::billing_service::{self, BillingAnalytics};
use crate::utils::error::AppError;

/// Body for PATCH /api/billing/user/{userId}/plan
#[derive(Debug, Deserialize)]
pub struct UpdateUserPlanRequest {
    pub plan: Option<String>,
}

/// GET /api/billing - One billing row per user
#[get("")]
pub async fn get_billing(db: web::Data<MongoDB>) -> impl Responder {
    match billing_service::billing_rows(&db).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => e.to_response("Error fetching billing data"),
    }
}

/// GET /api/billing/user/{userId} - A user's current plan plus the catalog
#[get("/user/{userId}")]
pub async fn get_user_billing(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error fetching user billing")
        }
    };

    match billing_service::user_billing(&db, user_id).await {
        Ok(billing) => HttpResponse::Ok().json(billing),
        Err(e) => e.to_response("Error fetching user billing"),
    }
}

/// PATCH /api/billing/user/{userId}/plan - Move a user to an existing plan
#[patch("/user/{userId}/plan")]
pub async fn update_user_plan(
    path: web::Path<String>,
    body: web::Json<UpdateUserPlanRequest>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error updating user plan")
        }
    };
    let plan = body.into_inner().plan.unwrap_or_default();

    match billing_service::update_user_plan(&db, user_id, &plan).await {
        Ok(user) => HttpResponse::Ok().json(json!({
            "message": format!("User plan updated to {}", plan),
            "user": user,
        })),
        Err(e) => e.to_response("Error updating user plan"),
    }
}

/// GET /api/billing/analytics - Plan distribution, revenue and conversion
#[utoipa::path(
    get,
    path = "/api/billing/analytics",
    tag = "Billing",
    responses(
        (status = 200, description = "Billing analytics", body = BillingAnalytics)
    )
)]
#[get("/analytics")]
pub async fn get_billing_analytics(db: web::Data<MongoDB>) -> impl Responder {
    match billing_service::billing_analytics(&db).await {
        Ok(analytics) => HttpResponse::Ok().json(analytics),
        Err(e) => e.to_response("Error fetching billing analytics"),
    }
}

/// POST /api/billing/process-payment - Mock gateway, nothing is charged
#[post("/process-payment")]
pub async fn process_payment(body: web::Json<serde_json::Value>) -> impl Responder {
    let amount = body.get("amount").and_then(|value| value.as_f64());
    let payment = billing_service::process_payment(amount);

    HttpResponse::Ok().json(json!({
        "message": "Payment processed successfully",
        "payment": payment,
    }))
}

/// GET /api/billing/plans - The plan catalog
#[get("/plans")]
pub async fn get_plans(db: web::Data<MongoDB>) -> impl Responder {
    match billing_service::list_plans(&db).await {
        Ok(plans) => HttpResponse::Ok().json(plans),
        Err(e) => e.to_response("Error fetching plans"),
    }
}

/// POST /api/billing/plan - Create a plan
#[post("/plan")]
pub async fn create_plan(
    body: web::Json<serde_json::Value>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let name = body
        .get("name")
        .and_then(|value| value.as_str())
        .filter(|name| !name.is_empty());
    let email_limit = body
        .get("emailLimit")
        .and_then(|value| value.as_i64())
        .filter(|limit| *limit >= 0);
    let (name, email_limit) = match (name, email_limit) {
        (Some(name), Some(limit)) => (name, limit),
        _ => {
            return AppError::BadRequest("Invalid plan data".to_string())
                .to_response("Error creating plan")
        }
    };
    let price = body.get("price").and_then(|value| value.as_i64()).unwrap_or(0);
    let stripe_price_id = body
        .get("stripePriceId")
        .and_then(|value| value.as_str())
        .map(str::to_string);
    let description = body
        .get("description")
        .and_then(|value| value.as_str())
        .map(str::to_string);

    match billing_service::create_plan(&db, name, email_limit, price, stripe_price_id, description)
        .await
    {
        Ok(plan) => HttpResponse::Created().json(plan),
        Err(e) => e.to_response("Error creating plan"),
    }
}

/// PATCH /api/billing/plan/{planName} - Change a plan's sending quota
#[patch("/plan/{planName}")]
pub async fn update_plan(
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let plan_name = path.into_inner();
    let email_limit = match body
        .get("emailLimit")
        .and_then(|value| value.as_i64())
        .filter(|limit| *limit >= 0)
    {
        Some(limit) => limit,
        None => {
            return AppError::BadRequest("Invalid emailLimit".to_string())
                .to_response("Error updating plan")
        }
    };

    match billing_service::update_plan_limit(&db, &plan_name, email_limit).await {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(e) => e.to_response("Error updating plan"),
    }
}

/// DELETE /api/billing/plan/{planName}
#[delete("/plan/{planName}")]
pub async fn delete_plan(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let plan_name = path.into_inner();

    match billing_service::delete_plan(&db, &plan_name).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Plan deleted successfully" })),
        Err(e) => e.to_response("Error deleting plan"),
    }
}
