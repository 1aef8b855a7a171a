use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SebastianAdmin API",
        version = "1.0.0",
        description = "Admin backend for the Sebastian email-outreach platform.\n\n**Features:**\n- Platform-wide and per-user statistics\n- Campaign management with derived engagement metrics\n- User management\n- Billing dashboard, plan catalog and revenue analytics\n- Health monitoring and metrics",
        contact(
            name = "SebastianAdmin Team",
            email = "support@sebastian-admin.com"
        )
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Stats
        crate::api::stats::get_stats,
        crate::api::stats::get_weekly_engagement,

        // Campaigns
        crate::api::campaigns::get_campaign_stats_overview,

        // Users
        crate::api::users::get_user_stats_overview,

        // Billing
        crate::api::billing::get_billing_analytics,
    ),
    components(
        schemas(
            // Health & Metrics
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,

            // Stats
            crate::services::stats_service::GlobalStats,
            crate::services::stats_service::WeeklyEngagementPoint,

            // Campaigns
            crate::services::campaign_service::CampaignStatsOverview,

            // Users
            crate::services::user_service::UserStatsOverview,

            // Billing
            crate::services::billing_service::BillingAnalytics,
            crate::services::billing_service::PlanDistributionEntry,
            crate::services::billing_service::RevenueSummary,
        )
    ),
    tags(
        (name = "Health", description = "Health check and metrics endpoints for monitoring service status."),
        (name = "Stats", description = "Dashboard statistics derived from the email-activity ledger."),
        (name = "Campaigns", description = "Campaign management and per-campaign engagement metrics."),
        (name = "Users", description = "User management and verification counters."),
        (name = "Billing", description = "Billing rows, plan catalog and revenue analytics."),
    )
)]
pub struct ApiDoc;
