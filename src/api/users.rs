use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::database::MongoDB;
use crate::models::{CreateUserRequest, UpdateUserRequest};
use crate::services::user_service::{self, UserListFilter, UserStatsOverview};
use crate::utils::error::AppError;

/// GET /api/users - List users, optionally filtered by email, role, plan
/// or verification state
#[get("")]
pub async fn get_users(
    query: web::Query<UserListFilter>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    match user_service::list_users(&db, &query).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.to_response("Error fetching users"),
    }
}

/// GET /api/users/stats/overview - Verification and plan counters
#[utoipa::path(
    get,
    path = "/api/users/stats/overview",
    tag = "Users",
    responses(
        (status = 200, description = "User statistics", body = UserStatsOverview)
    )
)]
#[get("/stats/overview")]
pub async fn get_user_stats_overview(db: web::Data<MongoDB>) -> impl Responder {
    match user_service::stats_overview(&db).await {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => e.to_response("Error fetching user stats"),
    }
}

/// GET /api/users/{id} - One user by id
#[get("/{id}")]
pub async fn get_user(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error fetching user")
        }
    };

    match user_service::get_user(&db, user_id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.to_response("Error fetching user"),
    }
}

/// POST /api/users - Create a user
#[post("")]
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    match user_service::create_user(&db, body.into_inner()).await {
        Ok(user) => HttpResponse::Created().json(user),
        Err(e) => e.to_response("Error creating user"),
    }
}

/// PATCH /api/users/{id} - Update the allow-listed user fields
#[patch("/{id}")]
pub async fn update_user(
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
    db: web::Data<MongoDB>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error updating user")
        }
    };

    match user_service::update_user(&db, user_id, body.into_inner()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.to_response("Error updating user"),
    }
}

/// DELETE /api/users/{id}
#[delete("/{id}")]
pub async fn delete_user(path: web::Path<String>, db: web::Data<MongoDB>) -> impl Responder {
    let user_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return AppError::BadRequest("Invalid user ID".to_string())
                .to_response("Error deleting user")
        }
    };

    match user_service::delete_user(&db, user_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })),
        Err(e) => e.to_response("Error deleting user"),
    }
}
