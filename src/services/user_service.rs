use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::MongoDB;
use crate::models::{
    CreateUserRequest, PlanValue, UpdateUserRequest, User, UserResponse, USER_PLANS, USER_ROLES,
};
use crate::services::stats_service::round_percent;
use crate::utils::error::AppError;
use crate::utils::validation::is_valid_email;

const COLLECTION: &str = "users";

// ==================== LIST / GET ====================

/// Query-string filters for GET /api/users. `email` is a case-insensitive
/// substring match; `isVerified` compares the raw value against "true" so
/// any other value filters for unverified users.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListFilter {
    pub email: Option<String>,
    pub role: Option<String>,
    pub plan: Option<String>,
    pub is_verified: Option<String>,
}

/// Mongo filter for the list view. Blank values count as absent, except
/// `isVerified` where presence alone activates the filter.
pub fn build_list_filter(filter: &UserListFilter) -> Document {
    let mut query = Document::new();
    if let Some(email) = filter.email.as_deref().filter(|v| !v.is_empty()) {
        query.insert("email", doc! { "$regex": email, "$options": "i" });
    }
    if let Some(role) = filter.role.as_deref().filter(|v| !v.is_empty()) {
        query.insert("role", role);
    }
    if let Some(plan) = filter.plan.as_deref().filter(|v| !v.is_empty()) {
        query.insert("plan", plan);
    }
    if let Some(is_verified) = filter.is_verified.as_deref() {
        query.insert("isVerified", is_verified == "true");
    }
    query
}

pub async fn list_users(
    db: &MongoDB,
    filter: &UserListFilter,
) -> Result<Vec<UserResponse>, AppError> {
    let users: Vec<User> = db
        .collection::<User>(COLLECTION)
        .find(build_list_filter(filter))
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn get_user(db: &MongoDB, user_id: ObjectId) -> Result<UserResponse, AppError> {
    let user = db
        .collection::<User>(COLLECTION)
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserResponse::from(user))
}

// ==================== CREATE ====================

/// Field checks for user creation, first failure wins
pub fn validate_new_user(body: &CreateUserRequest) -> Result<(), AppError> {
    let username_ok = body
        .username
        .as_deref()
        .map(|name| name.trim().chars().count() >= 3)
        .unwrap_or(false);
    if !username_ok {
        return Err(AppError::BadRequest(
            "Username must be at least 3 characters".to_string(),
        ));
    }

    let email_ok = body.email.as_deref().map(is_valid_email).unwrap_or(false);
    if !email_ok {
        return Err(AppError::BadRequest("Must be a valid email".to_string()));
    }

    let password_ok = body
        .password
        .as_deref()
        .map(|password| password.chars().count() >= 6)
        .unwrap_or(false);
    if !password_ok {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let role_ok = body
        .role
        .as_deref()
        .map(|role| USER_ROLES.contains(&role))
        .unwrap_or(false);
    if !role_ok {
        return Err(AppError::BadRequest(
            "Role must be admin or regular".to_string(),
        ));
    }

    let plan_ok = body
        .plan
        .as_deref()
        .map(|plan| USER_PLANS.contains(&plan))
        .unwrap_or(false);
    if !plan_ok {
        return Err(AppError::BadRequest("Plan must be Free or Pro".to_string()));
    }

    Ok(())
}

pub async fn create_user(
    db: &MongoDB,
    body: CreateUserRequest,
) -> Result<UserResponse, AppError> {
    validate_new_user(&body)?;

    // validation guarantees the fields below are present
    let username = body.username.unwrap_or_default().trim().to_string();
    let email = body.email.unwrap_or_default().trim().to_lowercase();

    let users = db.collection::<User>(COLLECTION);
    let existing = users
        .find_one(doc! { "$or": [ { "email": &email }, { "username": &username } ] })
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "User with this email or username already exists".to_string(),
        ));
    }

    let now = bson::DateTime::now();
    let user = User {
        id: Some(ObjectId::new()),
        username,
        email,
        password: body.password.unwrap_or_default(),
        role: body.role,
        plan: body.plan.map(PlanValue::Name),
        is_verified: false,
        verification_code: None,
        code_expires: None,
        reset_token: None,
        reset_token_expiry: None,
        provider: None,
        image: Some(String::new()),
        created_at: Some(now),
        updated_at: Some(now),
    };
    users.insert_one(&user).await?;

    Ok(UserResponse::from(user))
}

// ==================== UPDATE / DELETE ====================

pub async fn update_user(
    db: &MongoDB,
    user_id: ObjectId,
    body: UpdateUserRequest,
) -> Result<UserResponse, AppError> {
    let mut set = Document::new();
    if let Some(role) = body.role {
        set.insert("role", role);
    }
    if let Some(plan) = body.plan {
        set.insert("plan", bson::to_bson(&plan)?);
    }
    if let Some(is_verified) = body.is_verified {
        set.insert("isVerified", is_verified);
    }
    if let Some(username) = body.username {
        set.insert("username", username);
    }
    if let Some(email) = body.email {
        set.insert("email", email);
    }
    set.insert("updatedAt", bson::DateTime::now());

    let users = db.collection::<User>(COLLECTION);
    let updated = users
        .update_one(doc! { "_id": user_id }, doc! { "$set": set })
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

pub async fn delete_user(db: &MongoDB, user_id: ObjectId) -> Result<(), AppError> {
    let deleted = db
        .collection::<User>(COLLECTION)
        .delete_one(doc! { "_id": user_id })
        .await?;
    if deleted.deleted_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}

// ==================== OVERVIEW ====================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsOverview {
    pub total_users: u64,
    pub verified_users: u64,
    pub pro_users: u64,
    pub admin_users: u64,
    pub verification_rate: i64,
}

pub async fn stats_overview(db: &MongoDB) -> Result<UserStatsOverview, AppError> {
    let users = db.collection::<User>(COLLECTION);
    let total_users = users.count_documents(doc! {}).await?;
    let verified_users = users.count_documents(doc! { "isVerified": true }).await?;
    let pro_users = users.count_documents(doc! { "plan": "Pro" }).await?;
    let admin_users = users.count_documents(doc! { "role": "admin" }).await?;

    Ok(UserStatsOverview {
        total_users,
        verified_users,
        pro_users,
        admin_users,
        verification_rate: round_percent(verified_users, total_users),
    })
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            username: Some("john_doe".to_string()),
            email: Some("john@example.com".to_string()),
            password: Some("secret123".to_string()),
            role: Some("regular".to_string()),
            plan: Some("Free".to_string()),
        }
    }

    #[test]
    fn test_validate_new_user_accepts_complete_request() {
        assert!(validate_new_user(&create_request()).is_ok());
    }

    #[test]
    fn test_validate_new_user_username_checked_first() {
        let body = CreateUserRequest {
            username: None,
            email: None,
            password: None,
            role: None,
            plan: None,
        };
        let err = validate_new_user(&body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Username must be at least 3 characters"
        );
    }

    #[test]
    fn test_validate_new_user_trims_username_before_counting() {
        let mut body = create_request();
        body.username = Some("  ab  ".to_string());
        assert!(validate_new_user(&body).is_err());

        body.username = Some("  abc  ".to_string());
        assert!(validate_new_user(&body).is_ok());
    }

    #[test]
    fn test_validate_new_user_rejects_bad_email() {
        let mut body = create_request();
        body.email = Some("not-an-email".to_string());
        let err = validate_new_user(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Must be a valid email");
    }

    #[test]
    fn test_validate_new_user_rejects_short_password() {
        let mut body = create_request();
        body.password = Some("12345".to_string());
        let err = validate_new_user(&body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_validate_new_user_rejects_unknown_role_and_plan() {
        let mut body = create_request();
        body.role = Some("superuser".to_string());
        let err = validate_new_user(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Role must be admin or regular");

        let mut body = create_request();
        body.plan = Some("Enterprise".to_string());
        let err = validate_new_user(&body).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Plan must be Free or Pro");
    }

    #[test]
    fn test_build_list_filter_empty() {
        let filter = UserListFilter::default();
        assert!(build_list_filter(&filter).is_empty());
    }

    #[test]
    fn test_build_list_filter_email_regex() {
        let filter = UserListFilter {
            email: Some("example.com".to_string()),
            ..UserListFilter::default()
        };
        let query = build_list_filter(&filter);
        assert_eq!(
            query.get_document("email").unwrap(),
            &doc! { "$regex": "example.com", "$options": "i" }
        );
    }

    #[test]
    fn test_build_list_filter_skips_blank_values() {
        let filter = UserListFilter {
            email: Some(String::new()),
            role: Some(String::new()),
            plan: Some("Pro".to_string()),
            is_verified: None,
        };
        let query = build_list_filter(&filter);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get_str("plan").unwrap(), "Pro");
    }

    #[test]
    fn test_build_list_filter_is_verified_literal_true() {
        let filter = UserListFilter {
            is_verified: Some("true".to_string()),
            ..UserListFilter::default()
        };
        assert_eq!(
            build_list_filter(&filter).get_bool("isVerified").unwrap(),
            true
        );

        let filter = UserListFilter {
            is_verified: Some("yes".to_string()),
            ..UserListFilter::default()
        };
        assert_eq!(
            build_list_filter(&filter).get_bool("isVerified").unwrap(),
            false
        );
    }
}
