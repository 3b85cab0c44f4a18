use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, requester};
use super::{ApiError, ApiResponse, AppState, PageQuery, Paginated, ReviewDto, validation};
use crate::domain::{Action, author_or_staff_or_read_only};

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i32,
}

#[derive(Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

async fn ensure_title_exists(state: &AppState, title_id: i32) -> Result<(), ApiError> {
    if state.store().titles().get(title_id).await?.is_none() {
        return Err(ApiError::not_found("Title", title_id));
    }
    Ok(())
}

/// GET /v1/titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(title_id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<ReviewDto>>>, ApiError> {
    ensure_title_exists(&state, title_id).await?;

    let (count, rows) = state
        .store()
        .reviews()
        .list_for_title(title_id, query.page())
        .await?;

    let results = rows
        .into_iter()
        .map(|(review, author)| ReviewDto::new(review, author))
        .collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/titles/{title_id}/reviews
///
/// One review per author per title; a second attempt answers 400.
pub async fn create_review(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(title_id): Path<i32>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ApiError> {
    ensure_title_exists(&state, title_id).await?;
    validation::validate_score(request.score)?;

    let repo = state.store().reviews();
    if repo
        .find_by_title_and_author(title_id, user.id)
        .await?
        .is_some()
    {
        return Err(ApiError::validation(
            "You have already reviewed this title",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let review = repo
        .create(title_id, user.id, &request.text, request.score, &now)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReviewDto::new(review, Some(user)))),
    ))
}

/// GET /v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let (review, author) = state
        .store()
        .reviews()
        .get(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", review_id))?;

    Ok(Json(ApiResponse::success(ReviewDto::new(review, author))))
}

/// PATCH /v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let repo = state.store().reviews();
    let (review, author) = repo
        .get(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", review_id))?;

    if !author_or_staff_or_read_only(Some(&requester(&user)), review.author_id, Action::Update) {
        return Err(ApiError::forbidden("Not the author of this review"));
    }

    if let Some(score) = request.score {
        validation::validate_score(score)?;
    }

    let updated = repo.update(review, request.text, request.score).await?;
    Ok(Json(ApiResponse::success(ReviewDto::new(updated, author))))
}

/// DELETE /v1/titles/{title_id}/reviews/{review_id}
pub async fn delete_review(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((title_id, review_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let repo = state.store().reviews();
    let (review, _) = repo
        .get(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", review_id))?;

    if !author_or_staff_or_read_only(Some(&requester(&user)), review.author_id, Action::Delete) {
        return Err(ApiError::forbidden("Not the author of this review"));
    }

    repo.delete(review.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
