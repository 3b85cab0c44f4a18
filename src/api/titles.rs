use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Datelike;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{CurrentUser, require_admin};
use super::{ApiError, ApiResponse, AppState, PageQuery, Paginated, TitleDto, validation};
use crate::db::{TitleChanges, TitleFilters};

#[derive(Deserialize)]
pub struct TitleListQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    pub genre: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

async fn resolve_category(state: &AppState, slug: &str) -> Result<i32, ApiError> {
    state
        .store()
        .categories()
        .get_by_slug(slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| ApiError::validation(format!("Unknown category: {slug}")))
}

async fn resolve_genres(state: &AppState, slugs: &[String]) -> Result<Vec<i32>, ApiError> {
    // Repeated slugs collapse to one link.
    let mut unique: Vec<String> = Vec::with_capacity(slugs.len());
    for slug in slugs {
        if !unique.contains(slug) {
            unique.push(slug.clone());
        }
    }

    let found = state.store().genres().get_by_slugs(&unique).await?;
    if found.len() != unique.len() {
        let missing: Vec<&str> = unique
            .iter()
            .filter(|slug| !found.iter().any(|g| &&g.slug == slug))
            .map(String::as_str)
            .collect();
        return Err(ApiError::validation(format!(
            "Unknown genres: {}",
            missing.join(", ")
        )));
    }
    Ok(found.into_iter().map(|g| g.id).collect())
}

/// GET /v1/titles
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleListQuery>,
) -> Result<Json<ApiResponse<Paginated<TitleDto>>>, ApiError> {
    let filters = TitleFilters {
        category: query.category,
        genre: query.genre,
        name: query.name,
        year: query.year,
    };

    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .page();
    let (count, rows) = state.store().titles().list(&filters, page).await?;

    let results = rows.into_iter().map(TitleDto::from).collect();
    Ok(Json(ApiResponse::success(Paginated { count, results })))
}

/// POST /v1/titles
pub async fn create_title(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TitleDto>>), ApiError> {
    require_admin(&user)?;

    let limits = &state.config().limits;
    let name = validation::validate_name(&request.name, limits)?;
    validation::validate_year(request.year, chrono::Utc::now().year())?;

    let category_id = match &request.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let genre_ids = match &request.genre {
        Some(slugs) => resolve_genres(&state, slugs).await?,
        None => Vec::new(),
    };

    let created = state
        .store()
        .titles()
        .create(
            name,
            request.year,
            request.description.as_deref(),
            category_id,
            &genre_ids,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TitleDto::from(created))),
    ))
}

/// GET /v1/titles/{id}
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    let row = state
        .store()
        .titles()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Title", id))?;

    Ok(Json(ApiResponse::success(TitleDto::from(row))))
}

/// PATCH /v1/titles/{id}
pub async fn update_title(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTitleRequest>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    require_admin(&user)?;

    let limits = &state.config().limits;
    let name = match &request.name {
        Some(name) => Some(validation::validate_name(name, limits)?.to_string()),
        None => None,
    };
    if let Some(year) = request.year {
        validation::validate_year(year, chrono::Utc::now().year())?;
    }

    let category_id = match &request.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let genre_ids = match &request.genre {
        Some(slugs) => Some(resolve_genres(&state, slugs).await?),
        None => None,
    };

    let updated = state
        .store()
        .titles()
        .update(
            id,
            TitleChanges {
                name,
                year: request.year,
                description: request.description,
                category_id,
                genre_ids,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Title", id))?;

    Ok(Json(ApiResponse::success(TitleDto::from(updated))))
}

/// DELETE /v1/titles/{id}
pub async fn delete_title(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;

    if state.store().titles().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Title", id))
    }
}
