use actix_web::{get, web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::database::MongoDB;
use crate::services::stats_service::{self, GlobalStats, WeeklyEngagementPoint};
use crate::utils::error::AppError;

/// Window selector for GET /api/stats/user/{userId}
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

/// GET /api/stats - Platform-wide dashboard numbers
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Global platform statistics", body = GlobalStats)
    )
)]
#[get("")]
pub async fn get_stats(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::global_stats(&db).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.to_response("Error fetching stats"),
    }
}

/// GET /api/stats/user/{userId} - One user's activity inside a period
/// (day, week or month)
#[get("/user/{userId}")]
pub async fn get_user_stats(
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error fetching user stats")
        }
    };
    let period = query.period.clone().unwrap_or_else(|| "month".to_string());

    match stats_service::user_period_stats(&db, user_id, &period).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.to_response("Error fetching user stats"),
    }
}

/// GET /api/stats/weekly-engagement - Sent vs engaged, one point per day of
/// the trailing week
#[utoipa::path(
    get,
    path = "/api/stats/weekly-engagement",
    tag = "Stats",
    responses(
        (status = 200, description = "Seven daily engagement points, oldest first", body = Vec<WeeklyEngagementPoint>)
    )
)]
#[get("/weekly-engagement")]
pub async fn get_weekly_engagement(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::weekly_engagement(&db).await {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(e) => e.to_response("Error fetching weekly engagement"),
    }
}

/// GET /api/stats/user-growth - Registrations per day over the last 30 days
#[get("/user-growth")]
pub async fn get_user_growth(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::user_growth(&db).await {
        Ok(growth) => HttpResponse::Ok().json(growth),
        Err(e) => e.to_response("Error fetching user growth"),
    }
}

/// GET /api/stats/campaign-performance - Campaign counts per status
#[get("/campaign-performance")]
pub async fn get_campaign_performance(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::campaign_performance(&db).await {
        Ok(performance) => HttpResponse::Ok().json(performance),
        Err(e) => e.to_response("Error fetching campaign performance"),
    }
}

/// GET /api/stats/lead-conversion - Single bucket with the total lead count
#[get("/lead-conversion")]
pub async fn get_lead_conversion(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::lead_conversion(&db).await {
        Ok(conversion) => HttpResponse::Ok().json(conversion),
        Err(e) => e.to_response("Error fetching lead conversion"),
    }
}

/// GET /api/stats/weekly-engagement-breakdown - Sent volume of the trailing
/// week split by campaign and by sender mailbox
#[get("/weekly-engagement-breakdown")]
pub async fn get_weekly_engagement_breakdown(db: web::Data<MongoDB>) -> impl Responder {
    match stats_service::weekly_breakdown(&db).await {
        Ok(breakdown) => HttpResponse::Ok().json(breakdown),
        Err(e) => e.to_response("Error fetching engagement breakdown"),
    }
}
