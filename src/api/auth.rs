//! Authentication and user-management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{Permission, Role, UpdateRole, UpdateStatus, User, UserQuery},
    models::token::{GoogleLoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse},
};

use super::{AuthenticatedUser, MessageResponse, PaginatedResponse};

/// Login with a Google ID token
#[utoipa::path(
    post,
    path = "/auth/google",
    tag = "auth",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing token"),
        (status = 401, description = "Invalid Google token")
    )
)]
pub async fn google_login(
    State(state): State<crate::AppState>,
    Json(request): Json<GoogleLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let token = request
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| crate::AppError::BadRequest("Google token is required".to_string()))?;

    let response = state.services.auth.login_with_google(token).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let refresh_token = request
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| crate::AppError::BadRequest("Refresh token is required".to_string()))?;

    let response = state
        .services
        .auth
        .refresh(refresh_token)
        .await?
        .ok_or_else(|| {
            crate::AppError::Authentication("Invalid or expired refresh token".to_string())
        })?;

    Ok(Json(response))
}

/// Logout: revoke the supplied refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(request): Json<LogoutRequest>,
) -> AppResult<Json<MessageResponse>> {
    if let Some(refresh_token) = request.refresh_token {
        state.services.auth.revoke(&refresh_token).await?;
    }

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Logout from all devices: revoke every refresh token of the caller
#[utoipa::path(
    post,
    path = "/auth/logout-all",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out everywhere", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout_all(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<MessageResponse>> {
    state.services.auth.revoke_all(user.id).await?;

    Ok(Json(MessageResponse {
        message: "Logged out from all devices".to_string(),
    }))
}

/// Current user with derived permissions
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// Get the current user and their permissions
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> AppResult<Json<MeResponse>> {
    let permissions = user.permissions();
    Ok(Json(MeResponse { user, permissions }))
}

/// List users (requires VIEW_USERS)
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "auth",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<User>),
        (status = 403, description = "Missing VIEW_USERS permission")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    user.require_permission(Permission::ViewUsers)?;

    let (users, total) = state.services.users.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: users,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Change a user's role (requires MANAGE_USERS)
#[utoipa::path(
    put,
    path = "/auth/users/{id}/role",
    tag = "auth",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "Missing MANAGE_USERS permission"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRole>,
) -> AppResult<Json<User>> {
    user.require_permission(Permission::ManageUsers)?;

    let role: Role = request
        .role
        .as_deref()
        .ok_or_else(|| crate::AppError::BadRequest("Role is required".to_string()))?
        .parse()
        .map_err(crate::AppError::Validation)?;

    let updated = state.services.users.set_role(id, role).await?;
    Ok(Json(updated))
}

/// Activate or deactivate a user (admin only). Deactivation revokes all the
/// user's refresh tokens.
#[utoipa::path(
    put,
    path = "/auth/users/{id}/status",
    tag = "auth",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateStatus,
    responses(
        (status = 200, description = "Status updated", body = User),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatus>,
) -> AppResult<Json<User>> {
    user.require_admin()?;

    let is_active = request
        .is_active
        .ok_or_else(|| crate::AppError::BadRequest("is_active field is required".to_string()))?;

    let updated = state.services.users.set_active(id, is_active).await?;
    Ok(Json(updated))
}

/// List available roles
#[utoipa::path(
    get,
    path = "/auth/roles",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available roles"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_roles(
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Json<serde_json::Value> {
    let roles: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
    Json(serde_json::json!({ "roles": roles }))
}

/// List available permissions
#[utoipa::path(
    get,
    path = "/auth/permissions",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available permissions"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_permissions(
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Json<serde_json::Value> {
    let permissions: Vec<&str> = Permission::ALL.iter().map(Permission::as_str).collect();
    Json(serde_json::json!({ "permissions": permissions }))
}
