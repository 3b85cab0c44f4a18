use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, requester};
use super::{ApiError, ApiResponse, AppState, CommentDto, PageQuery, Paginated};
use crate::domain::{Action, author_or_staff_or_read_only};

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub text: String,
}

/// The review must exist under the title named in the path.
async fn ensure_review_exists(
    state: &AppState,
    title_id: i32,
    review_id: i32,
) -> Result<(), ApiError> {
    if state
        .store()
        .reviews()
        .get(title_id, review_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Review", review_id));
    }
    Ok(())
}

/// GET /v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<CommentDto>>>, ApiError> {
    ensure_review_exists(&state, title_id, review_id).await?;

    let (count, rows) = state
        .store()
        .comments()
        .list_for_review(review_id, query.page())
        .await?;

    let results = rows
        .into_iter()
        .map(|(comment, author)| CommentDto::new(comment, author))
        .collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    ensure_review_exists(&state, title_id, review_id).await?;

    if request.text.trim().is_empty() {
        return Err(ApiError::validation("Comment text cannot be empty"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let comment = state
        .store()
        .comments()
        .create(review_id, user.id, &request.text, &now)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CommentDto::new(comment, Some(user)))),
    ))
}

/// GET /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    ensure_review_exists(&state, title_id, review_id).await?;

    let (comment, author) = state
        .store()
        .comments()
        .get(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment", comment_id))?;

    Ok(Json(ApiResponse::success(CommentDto::new(comment, author))))
}

/// PATCH /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    ensure_review_exists(&state, title_id, review_id).await?;

    let repo = state.store().comments();
    let (comment, author) = repo
        .get(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment", comment_id))?;

    if !author_or_staff_or_read_only(Some(&requester(&user)), comment.author_id, Action::Update) {
        return Err(ApiError::forbidden("Not the author of this comment"));
    }

    if request.text.trim().is_empty() {
        return Err(ApiError::validation("Comment text cannot be empty"));
    }

    let updated = repo.update(comment, request.text).await?;
    Ok(Json(ApiResponse::success(CommentDto::new(updated, author))))
}

/// DELETE /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id, comment_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    ensure_review_exists(&state, title_id, review_id).await?;

    let repo = state.store().comments();
    let (comment, _) = repo
        .get(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment", comment_id))?;

    if !author_or_staff_or_read_only(Some(&requester(&user)), comment.author_id, Action::Delete) {
        return Err(ApiError::forbidden("Not the author of this comment"));
    }

    repo.delete(comment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
