//! Authentication and profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ojt_common::AppResult;
use ojt_core::{RegisterInput, RoleProfile, UpdateProfileInput};
use ojt_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::{ACCESS_TOKEN_COOKIE, AppState},
    response::ApiResponse,
};

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub date_joined: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            profile: RoleProfile::of(&u),
            full_name: u.full_name(),
            date_joined: u.created_at.to_rfc3339(),
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            profile_image: u.profile_image,
            bio: u.bio,
            is_verified: u.is_verified,
        }
    }
}

/// Account plus the token to authenticate with.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

fn access_token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Register a student or company account and sign it in.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let user = state.user_service.register(input).await?;
    let (user, token) = state.user_service.ensure_token(user).await?;

    let jar = jar.add(access_token_cookie(token.clone(), state.cookie_secure));
    Ok((
        jar,
        ApiResponse::created(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Log in and set the access token cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;
    let (user, token) = state.user_service.ensure_token(user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(access_token_cookie(token.clone(), state.cookie_secure));
    Ok((
        jar,
        ApiResponse::ok(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Log out: the current token stops working and the cookie is cleared.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<LogoutResponse>)> {
    state.user_service.regenerate_token(&user.id).await?;

    let jar = jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/"));
    Ok((jar, ApiResponse::ok(LogoutResponse { ok: true })))
}

/// Get the authenticated account.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Update the authenticated account's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
}
