use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::categories::{CatalogListQuery, CreateCatalogRequest};
use super::{ApiError, ApiResponse, AppState, GenreDto, Paginated, validation};

/// GET /v1/genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<ApiResponse<Paginated<GenreDto>>>, ApiError> {
    let (count, rows) = state
        .store()
        .genres()
        .list(query.search.as_deref(), query.page())
        .await?;

    let results = rows.into_iter().map(GenreDto::from).collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/genres
pub async fn create_genre(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCatalogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GenreDto>>), ApiError> {
    require_admin(&user)?;

    let limits = &state.config().limits;
    let name = validation::validate_name(&request.name, limits)?;
    let slug = validation::validate_slug(&request.slug, limits)?;

    if state.store().genres().get_by_slug(slug).await?.is_some() {
        return Err(ApiError::validation("Slug is already in use"));
    }

    let created = state.store().genres().create(name, slug).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(GenreDto::from(created))),
    ))
}

/// DELETE /v1/genres/{slug}
pub async fn delete_genre(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;

    if state.store().genres().delete_by_slug(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Genre", &slug))
    }
}
