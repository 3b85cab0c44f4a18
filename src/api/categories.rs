use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::{ApiError, ApiResponse, AppState, CategoryDto, PageQuery, Paginated, validation};

#[derive(Deserialize)]
pub struct CatalogListQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl CatalogListQuery {
    #[must_use]
    pub fn page(&self) -> crate::db::Page {
        PageQuery {
            limit: self.limit,
            offset: self.offset,
        }
        .page()
    }
}

#[derive(Deserialize)]
pub struct CreateCatalogRequest {
    pub name: String,
    pub slug: String,
}

/// GET /v1/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<ApiResponse<Paginated<CategoryDto>>>, ApiError> {
    let (count, rows) = state
        .store()
        .categories()
        .list(query.search.as_deref(), query.page())
        .await?;

    let results = rows.into_iter().map(CategoryDto::from).collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/categories
pub async fn create_category(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCatalogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    require_admin(&user)?;

    let limits = &state.config().limits;
    let name = validation::validate_name(&request.name, limits)?;
    let slug = validation::validate_slug(&request.slug, limits)?;

    if state.store().categories().get_by_slug(slug).await?.is_some() {
        return Err(ApiError::validation("Slug is already in use"));
    }

    let created = state.store().categories().create(name, slug).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CategoryDto::from(created))),
    ))
}

/// DELETE /v1/categories/{slug}
pub async fn delete_category(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;

    if state.store().categories().delete_by_slug(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Category", &slug))
    }
}
