use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SignupDto, TokenDto, validation};
use crate::domain::{Requester, Role};
use crate::entities::users;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// The authenticated user, resolved from the `Authorization: Bearer` header.
/// Rejects with 401 when the header is missing, the token does not verify,
/// or the account no longer exists.
pub struct CurrentUser(pub users::Model);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = state.tokens().decode_access_token(token)?;

        let user = state
            .store()
            .users()
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

        Ok(Self(user))
    }
}

/// Maps a stored account onto the identity the permission gates run against.
/// An unparseable role column falls back to the plain user role.
#[must_use]
pub fn requester(user: &users::Model) -> Requester {
    Requester {
        user_id: user.id,
        role: user.role.parse().unwrap_or(Role::User),
        is_superuser: user.is_superuser,
    }
}

pub fn require_admin(user: &users::Model) -> Result<(), ApiError> {
    if crate::domain::admin_only(Some(&requester(user))) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator access required"))
    }
}

/// POST /v1/auth/signup
///
/// Registers an account (or re-requests a code for an existing one) and
/// mails a confirmation code. Deliberately returns 200 rather than 201 so
/// a repeat signup with the same pair is indistinguishable from the first.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignupDto>>), ApiError> {
    let limits = &state.config().limits;
    validation::validate_username(&request.username, limits)?;
    validation::validate_email(&request.email, limits)?;

    let repo = state.store().users();
    let by_username = repo.get_by_username(&request.username).await?;
    let by_email = repo.get_by_email(&request.email).await?;

    let user = match (by_username, by_email) {
        (Some(user), _) if user.email == request.email => user,
        (Some(_), _) => {
            return Err(ApiError::validation("Username is already taken"));
        }
        (None, Some(_)) => {
            return Err(ApiError::validation("Email is already registered"));
        }
        (None, None) => {
            let now = chrono::Utc::now().to_rfc3339();
            repo.create(
                &request.username,
                &request.email,
                crate::db::UserChanges::default(),
                &now,
            )
            .await?
        }
    };

    let code = state.tokens().confirmation_code(&user);
    state
        .shared
        .mailer
        .send_confirmation_code(&user.email, &code)
        .await?;

    let dto = SignupDto {
        username: user.username,
        email: user.email,
    };
    Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
}

/// POST /v1/auth/token
///
/// Exchanges a confirmation code for a bearer token. The exchange bumps the
/// account's code epoch, so the same code cannot be used twice.
pub async fn token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<ApiResponse<TokenDto>>, ApiError> {
    let repo = state.store().users();
    let user = repo
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &request.username))?;

    if !state
        .tokens()
        .check_confirmation_code(&user, &request.confirmation_code)
    {
        return Err(ApiError::validation("Invalid confirmation code"));
    }

    repo.bump_code_epoch(user.id).await?;
    let token = state.tokens().issue_access_token(user.id)?;

    Ok(Json(ApiResponse::success(TokenDto { token })))
}
