//! Account and session handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{AuthError, AuthService, INVALID_CREDENTIALS};
use crate::config::Config;
use crate::db::AccountStore;
use crate::web::cookies::SessionCookies;
use crate::web::dto::{
    AccountProfile, ApiResponse, LoginRequest, LogoutResponse, RefreshResponse, SignupRequest,
    SignupResponse, ValidatedJson,
};
use crate::web::error::ApiError;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Auth service.
    pub auth: AuthService,
    /// Session cookie settings.
    pub cookies: SessionCookies,
}

impl AppState {
    /// Create a new application state.
    pub fn new(auth: AuthService, cookies: SessionCookies) -> Self {
        Self { auth, cookies }
    }

    /// Build the state from configuration over the given store.
    pub fn from_config(store: Arc<dyn AccountStore>, config: &Config) -> crate::Result<Self> {
        Ok(Self::new(
            AuthService::from_config(store, config)?,
            SessionCookies::from_config(&config.cookie),
        ))
    }
}

/// POST /users/signup - Register an account and start a session.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SignupResponse>>), ApiError> {
    let session = state.auth.register(req.into()).await?;

    let jar = state.cookies.attach(jar, &session.tokens);
    let body = ApiResponse::new(SignupResponse {
        id: session.account.id,
    });

    Ok((StatusCode::CREATED, jar, Json(body)))
}

/// POST /users/login - Verify credentials and start a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AccountProfile>>), ApiError> {
    let session = state.auth.login(req.into()).await.map_err(|e| match e {
        AuthError::NotFound(_) | AuthError::Unauthorized(_) => {
            ApiError::unauthorized(INVALID_CREDENTIALS)
        }
        other => other.into(),
    })?;

    let jar = state.cookies.attach(jar, &session.tokens);
    Ok((jar, Json(ApiResponse::new(AccountProfile::from(&session.account)))))
}

/// POST /users/refresh - Exchange the refresh cookie for a new access cookie.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<RefreshResponse>>), ApiError> {
    let refreshed = state
        .auth
        .refresh_access(SessionCookies::read_refresh(&jar))
        .await?;

    let jar = state.cookies.attach_access(jar, &refreshed.access);
    let body = ApiResponse::new(RefreshResponse {
        expires_at: refreshed.access.expires_at,
    });

    Ok((jar, Json(body)))
}

/// POST /users/logout - Clear both session cookies.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<LogoutResponse>>) {
    state.auth.logout(SessionCookies::read_access(&jar));

    let jar = state.cookies.clear(jar);
    (jar, Json(ApiResponse::new(LogoutResponse { message: "Logged out" })))
}

/// GET /users/get-user - Profile of the signed-in account.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<ApiResponse<AccountProfile>>, ApiError> {
    let account = state
        .auth
        .current_account(SessionCookies::read_access(&jar))
        .await?;

    Ok(Json(ApiResponse::new(AccountProfile::from(&account))))
}
