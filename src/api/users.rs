use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::{ApiError, ApiResponse, AppState, PageQuery, Paginated, UserDto, validation};
use crate::db::UserChanges;

#[derive(Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Checks the mutable fields shared by create and update.
fn validate_changes(
    state: &AppState,
    request: &UpdateUserRequest,
) -> Result<(), ApiError> {
    let limits = &state.config().limits;
    if let Some(username) = &request.username {
        validation::validate_username(username, limits)?;
    }
    if let Some(email) = &request.email {
        validation::validate_email(email, limits)?;
    }
    if let Some(role) = &request.role {
        validation::validate_role(role)?;
    }
    Ok(())
}

/// Rejects a new username/email pair that collides with a different account.
async fn check_collisions(
    state: &AppState,
    request: &UpdateUserRequest,
    existing_id: Option<i32>,
) -> Result<(), ApiError> {
    let repo = state.store().users();

    if let Some(username) = &request.username
        && let Some(other) = repo.get_by_username(username).await?
        && Some(other.id) != existing_id
    {
        return Err(ApiError::validation("Username is already taken"));
    }

    if let Some(email) = &request.email
        && let Some(other) = repo.get_by_email(email).await?
        && Some(other.id) != existing_id
    {
        return Err(ApiError::validation("Email is already registered"));
    }

    Ok(())
}

/// GET /v1/users
pub async fn list_users(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Paginated<UserDto>>>, ApiError> {
    require_admin(&user)?;

    let (count, rows) = state
        .store()
        .users()
        .list(
            query.search.as_deref(),
            PageQuery {
                limit: query.limit,
                offset: query.offset,
            }
            .page(),
        )
        .await?;

    let results = rows.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/users
pub async fn create_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    require_admin(&user)?;

    let changes = UpdateUserRequest {
        username: Some(request.username.clone()),
        email: Some(request.email.clone()),
        role: request.role.clone(),
        ..Default::default()
    };
    validate_changes(&state, &changes)?;
    check_collisions(&state, &changes, None).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let created = state
        .store()
        .users()
        .create(
            &request.username,
            &request.email,
            UserChanges {
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                role: request.role,
                ..Default::default()
            },
            &now,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(created))),
    ))
}

/// GET /v1/users/me
pub async fn get_me(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user)))
}

/// PATCH /v1/users/me
///
/// Self-service profile edit. The role field is pinned: whatever the payload
/// says, the account comes out with the plain user role. A payload that fails
/// validation here answers 405, not 400; existing clients depend on that.
pub async fn update_me(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(mut request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    request.role = Some("user".to_string());

    if let Err(err) = validate_changes(&state, &request) {
        return Err(ApiError::MethodNotAllowed(err.to_string()));
    }
    if let Err(err) = check_collisions(&state, &request, Some(user.id)).await {
        return Err(ApiError::MethodNotAllowed(err.to_string()));
    }

    let updated = state
        .store()
        .users()
        .update(
            user.id,
            UserChanges {
                username: request.username,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                role: request.role,
            },
        )
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// GET /v1/users/{username}
pub async fn get_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_admin(&user)?;

    let target = state
        .store()
        .users()
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    Ok(Json(ApiResponse::success(UserDto::from(target))))
}

/// PATCH /v1/users/{username}
pub async fn update_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    require_admin(&user)?;

    let target = state
        .store()
        .users()
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    validate_changes(&state, &request)?;
    check_collisions(&state, &request, Some(target.id)).await?;

    let updated = state
        .store()
        .users()
        .update(
            target.id,
            UserChanges {
                username: request.username,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                role: request.role,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// DELETE /v1/users/{username}
pub async fn delete_user(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;

    let target = state
        .store()
        .users()
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    state.store().users().delete(target.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
