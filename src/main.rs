mod api;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Route not found"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/sebastian-admin".to_string());
    let frontend_url = env::var("FRONTEND_URL")
        .unwrap_or_else(|_| "https://admin-pannel-brown.vercel.app".to_string());

    log::info!("🚀 Starting SebastianAdmin API...");
    log::info!("📊 Database: {}", mongodb_uri);

    api::metrics::mark_started();

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");

    // 🌱 Optional demo dataset (replaces existing data, so opt-in only)
    if env::var("SEED_SAMPLE_DATA").unwrap_or_default() == "true" {
        seeds::sample_data_seed::seed_sample_data(&db).await;
    }

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Malformed JSON answers with the API's own error shape
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid request body",
                    "message": message,
                })),
            )
            .into()
        });

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(json_config)
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            // Health check
            .route("/api/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // ==================== USERS API ====================
            .service(
                web::scope("/api/users")
                    .service(api::users::get_user_stats_overview)
                    .service(api::users::get_users)
                    .service(api::users::create_user)
                    .service(api::users::get_user)
                    .service(api::users::update_user)
                    .service(api::users::delete_user)
            )
            // ==================== CAMPAIGNS API ====================
            .service(
                web::scope("/api/campaigns")
                    .service(api::campaigns::get_campaign_stats_overview)
                    .service(api::campaigns::get_campaigns)
                    .service(api::campaigns::create_campaign)
                    .service(api::campaigns::get_campaign)
                    .service(api::campaigns::update_campaign)
                    .service(api::campaigns::delete_campaign)
            )
            // ==================== STATS API ====================
            .service(
                web::scope("/api/stats")
                    .service(api::stats::get_stats)
                    .service(api::stats::get_weekly_engagement)
                    .service(api::stats::get_user_growth)
                    .service(api::stats::get_campaign_performance)
                    .service(api::stats::get_lead_conversion)
                    .service(api::stats::get_weekly_engagement_breakdown)
                    .service(api::stats::get_user_stats)
            )
            // ==================== BILLING API ====================
            .service(
                web::scope("/api/billing")
                    .service(api::billing::get_billing)
                    .service(api::billing::get_billing_analytics)
                    .service(api::billing::process_payment)
                    .service(api::billing::get_plans)
                    .service(api::billing::create_plan)
                    .service(api::billing::update_plan)
                    .service(api::billing::delete_plan)
                    .service(api::billing::get_user_billing)
                    .service(api::billing::update_user_plan)
            )
            .default_service(web::route().to(not_found))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
