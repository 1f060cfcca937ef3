use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::TokenBundle,
    db::entities::user,
    error::AppError,
    middleware::guards::{cookie_value, AuthGuard, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
    response::{ApiResult, JsonApiResponse},
    services::user_service::ProfileUpdate,
    services::ServiceContext,
    state::AppState,
    routes::api::upload::MultipartForm,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-forgot-password-otp", post(verify_forgot_password_otp))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me))
        .route("/update-profile", put(update_profile))
        .route("/upload-avatar", put(upload_avatar))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub verification_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
}

impl From<&TokenBundle> for TokenResponse {
    fn from(bundle: &TokenBundle) -> Self {
        Self {
            access_token: bundle.access_token.clone(),
            refresh_token: bundle.refresh_token.clone(),
            token_type: bundle.token_type,
            expires_in: bundle.expires_in,
        }
    }
}

/// Public view of a user: credentials and reset state stay server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub mobile: Option<String>,
    pub role: String,
    pub status: String,
    pub email_verified: bool,
    pub last_login_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            mobile: user.mobile,
            role: user.role,
            status: user.status,
            email_verified: user.email_verified,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub tokens: TokenResponse,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    let user = services
        .auth(&state)
        .register(&body.username, &body.email, &body.password)
        .await?;

    JsonApiResponse::created(
        "User registered successfully, please verify your email",
        serde_json::json!({ "username": user.username, "email": user.email }),
    )
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyEmailRequest>,
) -> ApiResult<serde_json::Value> {
    let code: Uuid = body
        .verification_code
        .parse()
        .map_err(|_| AppError::bad_request("Invalid verification code"))?;

    let services = ServiceContext::from_state(&state);
    services
        .auth(&state)
        .verify_email(&code)
        .await
        .map_err(|err| match err {
            AppError::NotFound(_) => AppError::bad_request("Invalid verification code"),
            other => other,
        })?;

    JsonApiResponse::message("Email verified successfully")
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let services = ServiceContext::from_state(&state);
    let (user, tokens) = services.auth(&state).login(&body.email, &body.password).await?;

    let envelope = JsonApiResponse::with_status(
        StatusCode::OK,
        Some("Login successful".to_string()),
        Some(LoginResponse {
            user: user.into(),
            tokens: (&tokens).into(),
        }),
    );
    with_auth_cookies(&state, envelope.into_response(), &tokens)
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<Response, AppError> {
    let presented = cookie_value(&headers, REFRESH_TOKEN_COOKIE)
        .or_else(|| body.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(|| AppError::unauthorized("Missing refresh token"))?;

    let services = ServiceContext::from_state(&state);
    let tokens = services.auth(&state).refresh(&presented).await?;

    let envelope = JsonApiResponse::with_status(
        StatusCode::OK,
        Some("Tokens refreshed".to_string()),
        Some(TokenResponse::from(&tokens)),
    );
    with_auth_cookies(&state, envelope.into_response(), &tokens)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user_id = claims.user_id()?;
    let refresh = cookie_value(&headers, REFRESH_TOKEN_COOKIE);

    let services = ServiceContext::from_state(&state);
    services
        .auth(&state)
        .logout(&user_id, refresh.as_deref())
        .await?;

    let mut response = JsonApiResponse::message("Logged out successfully")?.into_response();
    append_cookie(&mut response, &clear_cookie(ACCESS_TOKEN_COOKIE))?;
    append_cookie(&mut response, &clear_cookie(REFRESH_TOKEN_COOKIE))?;
    Ok(response)
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    // A missing account is indistinguishable from a successful send, so the
    // endpoint cannot be used to probe registered emails.
    match services.auth(&state).forgot_password(&body.email).await {
        Ok(()) => {}
        Err(AppError::NotFound(_)) => {
            tracing::info!("password reset requested for unknown email");
        }
        Err(err) => return Err(err),
    }

    JsonApiResponse::message("If the email is registered, a reset code has been sent")
}

async fn verify_forgot_password_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyOtpRequest>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    services
        .auth(&state)
        .verify_password_reset_otp(&body.email, &body.otp)
        .await?;

    JsonApiResponse::message("OTP verified successfully")
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    let services = ServiceContext::from_state(&state);
    services
        .auth(&state)
        .reset_password(&body.email, &body.otp, &body.new_password, &body.confirm_password)
        .await?;

    JsonApiResponse::message("Password reset successfully")
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<UserResponse> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let user = services.user(&state).profile(&user_id).await?;
    JsonApiResponse::ok(user.into())
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<UserResponse> {
    let user_id = claims.user_id()?;
    let services = ServiceContext::from_state(&state);
    let user = services
        .user(&state)
        .update_profile(
            &user_id,
            ProfileUpdate {
                username: body.username,
                email: body.email,
                mobile: body.mobile,
                password: body.password,
            },
        )
        .await?;

    JsonApiResponse::ok_message("Profile updated successfully", user.into())
}

async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    multipart: Multipart,
) -> ApiResult<UserResponse> {
    let user_id = claims.user_id()?;
    let form = MultipartForm::read(multipart).await?;
    let avatar = form.file_required("avatar")?;

    let services = ServiceContext::from_state(&state);
    let user = services
        .user(&state)
        .upload_avatar(
            &user_id,
            &avatar.file_name,
            &avatar.content_type,
            avatar.bytes.clone(),
        )
        .await?;

    JsonApiResponse::ok_message("Avatar updated successfully", user.into())
}

fn with_auth_cookies(
    state: &AppState,
    mut response: Response,
    tokens: &TokenBundle,
) -> Result<Response, AppError> {
    let auth = state
        .config
        .auth
        .as_ref()
        .ok_or_else(|| AppError::internal("auth config missing"))?;

    let access = auth_cookie(
        ACCESS_TOKEN_COOKIE,
        &tokens.access_token,
        auth.access_ttl_secs as i64,
    );
    let refresh = auth_cookie(
        REFRESH_TOKEN_COOKIE,
        &tokens.refresh_token,
        auth.refresh_ttl_days * 24 * 60 * 60,
    );
    append_cookie(&mut response, &access)?;
    append_cookie(&mut response, &refresh)?;
    Ok(response)
}

fn auth_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly; Secure; SameSite=None")
}

fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None")
}

fn append_cookie(response: &mut Response, cookie: &str) -> Result<(), AppError> {
    let value = cookie
        .parse()
        .map_err(|_| AppError::internal("cookie value failed to encode"))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
