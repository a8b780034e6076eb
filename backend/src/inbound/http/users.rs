//! Member registration, login and profile handlers.
//!
//! ```text
//! POST  /api/v1/register {"name":"Ada","email":"ada@example.org","password":"secret","location":"Leeds"}
//! POST  /api/v1/login    {"email":"ada@example.org","password":"secret"}
//! POST  /api/v1/logout
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me {"location":"York"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CredentialsValidationError, DisplayName, EmailAddress, Error, Location, LoginCredentials,
    NewPassword, ProfileUpdate, RegistrationDraft, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, field_error, nothing_to_update_error};

/// Request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub location: String,
}

impl TryFrom<RegisterRequest> for RegistrationDraft {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: DisplayName::new(&value.name).map_err(map_user_validation_error)?,
            email: EmailAddress::new(&value.email).map_err(map_user_validation_error)?,
            password: NewPassword::new(&value.password).map_err(map_credentials_error)?,
            location: Location::new(&value.location).map_err(map_user_validation_error)?,
        })
    }
}

/// Request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password).map_err(map_credentials_error)
    }
}

/// Request body for `PATCH /api/v1/users/me`. Only these fields are editable.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name.
    pub name: Option<String>,
    /// New location.
    pub location: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let update = Self {
            display_name: value
                .name
                .map(DisplayName::new)
                .transpose()
                .map_err(map_user_validation_error)?,
            location: value
                .location
                .map(Location::new)
                .transpose()
                .map_err(map_user_validation_error)?,
        };
        if update.is_empty() {
            return Err(nothing_to_update_error(&["name", "location"]));
        }
        Ok(update)
    }
}

/// Public member profile. Never carries credential material.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.org")]
    pub email: String,
    #[schema(example = "Leeds")]
    pub location: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.display_name().to_string(),
            email: user.email().to_string(),
            location: user.location().to_string(),
            created_at: user.created_at(),
        }
    }
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let message = err.to_string();
    match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => {
            field_error(FieldName::new("id"), ErrorCode::InvalidUuid, message)
        }
        UserValidationError::EmptyDisplayName => {
            field_error(FieldName::new("name"), ErrorCode::MissingField, message)
        }
        UserValidationError::DisplayNameTooLong { .. } => {
            field_error(FieldName::new("name"), ErrorCode::TooLong, message)
        }
        UserValidationError::InvalidEmail => {
            field_error(FieldName::new("email"), ErrorCode::InvalidValue, message)
        }
        UserValidationError::EmptyLocation => {
            field_error(FieldName::new("location"), ErrorCode::MissingField, message)
        }
        UserValidationError::LocationTooLong { .. } => {
            field_error(FieldName::new("location"), ErrorCode::TooLong, message)
        }
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let message = err.to_string();
    match err {
        CredentialsValidationError::InvalidEmail => {
            field_error(FieldName::new("email"), ErrorCode::InvalidValue, message)
        }
        CredentialsValidationError::EmptyPassword => {
            field_error(FieldName::new("password"), ErrorCode::MissingField, message)
        }
        CredentialsValidationError::PasswordTooShort { .. } => {
            field_error(FieldName::new("password"), ErrorCode::InvalidValue, message)
        }
    }
}

/// Register a member and sign them in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or e-mail already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let draft = RegistrationDraft::try_from(payload.into_inner())?;
    let user = state.accounts.register(draft).await?;
    session.sign_in(user.id())?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Authenticate a member and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// Profile of the signed-in member.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current member", body = UserResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Member no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.profiles.fetch_profile(&user_id).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Edit the signed-in member's display name or location.
///
/// Items keep the owner snapshot taken when they were listed.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated member", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.accounts.update_profile(&user_id, update).await?;
    Ok(web::Json(UserResponse::from(user)))
}
