use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::database::MongoDB;
use crate::models::{CreateCampaignRequest, UpdateCampaignRequest};
use crate::services::campaign_service::{self, CampaignStatsOverview};
use crate::utils::error::AppError;

/// Query-string filter for GET /api/campaigns
#[derive(Debug, Deserialize)]
pub struct CampaignListQuery {
    pub status: Option<String>,
}

/// GET /api/campaigns - Campaigns with engagement counters, newest first,
/// optionally narrowed to one status
#[get("")]
pub async fn get_campaigns(
    query: web::Query<CampaignListQuery>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    match campaign_service::list_campaigns(&db, query.status.as_deref()).await {
        Ok(campaigns) => HttpResponse::Ok().json(campaigns),
        Err(e) => e.to_response("Error fetching campaigns"),
    }
}

/// GET /api/campaigns/stats/overview - Status and engagement totals
#[utoipa::path(
    get,
    path = "/api/campaigns/stats/overview",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Campaign statistics", body = CampaignStatsOverview)
    )
)]
#[get("/stats/overview")]
pub async fn get_campaign_stats_overview(db: web::Data<MongoDB>) -> impl Responder {
    match campaign_service::stats_overview(&db).await {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => e.to_response("Error fetching campaign stats"),
    }
}

/// GET /api/campaigns/{id} - One campaign with recent and daily activity
#[get("/{id}")]
pub async fn get_campaign(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let campaign_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid campaign ID".to_string())
                .to_response("Error fetching campaign")
        }
    };

    match campaign_service::campaign_detail(&db, campaign_id).await {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => e.to_response("Error fetching campaign"),
    }
}

/// POST /api/campaigns - Create a campaign
#[post("")]
pub async fn create_campaign(
    body: web::Json<CreateCampaignRequest>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    match campaign_service::create_campaign(&db, body.into_inner()).await {
        Ok(campaign) => HttpResponse::Created().json(campaign),
        Err(e) => e.to_response("Error creating campaign"),
    }
}

/// PATCH /api/campaigns/{id} - Update the allow-listed campaign fields
#[patch("/{id}")]
pub async fn update_campaign(
    path: web::Path<String>,
    body: web::Json<UpdateCampaignRequest>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let campaign_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid campaign ID".to_string())
                .to_response("Error updating campaign")
        }
    };

    match campaign_service::update_campaign(&db, campaign_id, body.into_inner()).await {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => e.to_response("Error updating campaign"),
    }
}

/// DELETE /api/campaigns/{id}
#[delete("/{id}")]
pub async fn delete_campaign(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let campaign_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid campaign ID".to_string())
                .to_response("Error deleting campaign")
        }
    };

    match campaign_service::delete_campaign(&db, campaign_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Campaign deleted successfully" })),
        Err(e) => e.to_response("Error deleting campaign"),
    }
}
