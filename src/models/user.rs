use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::dates;

/// Allowed roles on user creation
pub const USER_ROLES: [&str; 2] = ["admin", "regular"];

/// Allowed plan labels on user creation (billing tiers live in the plans collection)
pub const USER_PLANS: [&str; 2] = ["Free", "Pro"];

/// Legacy `plan` field: newer documents store the plan name, older ones a
/// numeric tier code (1..3). Both forms exist in production data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanValue {
    Name(String),
    Code(serde_json::Number),
}

/// User document (collection: `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub username: String,

    pub email: String,

    /// Stored verbatim. Never leaves the service: responses go through
    /// `UserResponse`, which has no password field.
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Plan name or legacy numeric code (see `PlanValue`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanValue>,

    #[serde(default)]
    pub is_verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_expires: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_expiry: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

/// Request body for POST /api/users. Every field optional so validation can
/// answer with the route's own messages instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub plan: Option<String>,
}

/// Request body for PATCH /api/users/{id} (allow-list; unknown fields ignored)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub plan: Option<PlanValue>,
    pub is_verified: Option<bool>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// User as rendered in responses: ObjectIds as hex, dates as RFC 3339,
/// password omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanValue>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            email: user.email,
            role: user.role,
            plan: user.plan,
            is_verified: user.is_verified,
            provider: user.provider,
            image: user.image,
            created_at: user.created_at.map(dates::to_rfc3339),
            updated_at: user.updated_at.map(dates::to_rfc3339),
        }
    }
}

/// Populated `userId` shape used by campaign responses
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        UserRef {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
