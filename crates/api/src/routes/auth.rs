use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use retreats_db::models::{Organization, Role, User};
use retreats_services::auth::TokenPair;
use retreats_services::dao::user::{NewUser, ProfileUpdate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{
        Json,
        auth::{AuthUser, SESSION_COOKIE},
    },
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub organization: Option<Organization>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub profile_image: Option<String>,
    pub organization: Option<Organization>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub profile_image: Option<String>,
    pub organization: Option<Organization>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            role: user.role,
            mobile: user.mobile,
            city: user.city,
            country_code: user.country_code,
            profile_image: user.profile_image,
            organization: user.organization,
        }
    }
}

fn session(state: &AppState, user: User) -> Result<(HeaderMap, AuthResponse), ApiError> {
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User without id".to_string()))?;
    let tokens = state.auth.issue_tokens(user_id, &user.email, user.role)?;
    let headers = session_cookie(&tokens, state.settings.auth.secure_cookie)?;

    Ok((
        headers,
        AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user: user.into(),
        },
    ))
}

fn session_cookie(tokens: &TokenPair, secure: bool) -> Result<HeaderMap, ApiError> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.access_token, tokens.expires_in
    );
    if secure {
        cookie.push_str("; Secure");
    }
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()?;
    if body.role == Role::Admin {
        return Err(ApiError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let password_hash = state.auth.hash_password(&body.password)?;

    let user = state
        .users
        .create(NewUser {
            name: body.name,
            email: body.email,
            password_hash,
            role: body.role,
            mobile: body.mobile,
            city: body.city,
            country_code: body.country_code,
            organization: body.organization,
        })
        .await?;

    let (headers, response) = session(&state, user)?;
    Ok((StatusCode::CREATED, headers, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()?;

    let user = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    state.auth.check_password(&body.password, password_hash)?;

    let (headers, response) = session(&state, user)?;
    Ok((headers, Json(response)))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;

    let user = state.users.base.find_by_id(claims.user_id()?).await?;

    let (headers, response) = session(&state, user)?;
    Ok((headers, Json(response)))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    body.validate()?;

    let user = state
        .users
        .update_profile(
            auth.user_id,
            ProfileUpdate {
                name: body.name,
                mobile: body.mobile,
                city: body.city,
                country_code: body.country_code,
                profile_image: body.profile_image,
                organization: body.organization,
            },
        )
        .await?;

    Ok(Json(user.into()))
}
