use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    Extension, Json,
};
use tracing::{info, warn};

use crate::{
    error::AppError,
    model::CurrentUser,
    password::{hash_password, verify_password},
    schema::{
        CreateTodoSchema, LoginResponse, LoginSchema, MessageResponse, SignupResponse,
        SignupSchema,
    },
    AppState,
};

const HOME_PAGE: &str = include_str!("../templates/base.html");

// Unwraps a JSON body, turning extractor rejections into a 400 with `{msg}`
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// Ids that are not integers cannot name a task, so they answer like an unknown id
fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::TaskNotFound)
}

// Handler for the landing page
pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

// Handler for registering a new user; answers with a token so the client is logged in
pub async fn signup(
    State(data): State<Arc<AppState>>,
    payload: Result<Json<SignupSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (username, password, email) = json_body(payload)?.into_parts(data.require_email)?;

    if let Some(reason) = data.password_policy.validate(&password) {
        return Err(AppError::WeakPassword(reason));
    }

    if data.store.username_exists(&username).await? {
        return Err(AppError::DuplicateUsername);
    }
    if let Some(email) = &email {
        if data.store.email_exists(email).await? {
            return Err(AppError::DuplicateEmail);
        }
    }

    let cost = data.bcrypt_cost;
    let password_hash =
        tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

    let user = data
        .store
        .insert_user(&username, email.as_deref(), &password_hash)
        .await?;
    let access_token = data.tokens.issue(user.id)?;

    info!(user_id = user.id, %username, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            msg: "User created successfully",
            access_token,
        }),
    ))
}

// Handler for logging in; unknown users and wrong passwords get the same answer
pub async fn login(
    State(data): State<Arc<AppState>>,
    payload: Result<Json<LoginSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(payload)?;
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let Some(user) = data.store.find_user_by_username(&username).await? else {
        warn!(%username, "login for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    let hash = user.password_hash;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;
    if !verified {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = data.tokens.issue(user.id)?;
    info!(user_id = user.id, "user logged in");

    Ok((StatusCode::OK, Json(LoginResponse { access_token })))
}

// Handler for listing the caller's todos
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let todos = data.store.list_todos(user.id).await?;
    Ok(Json(todos))
}

// Handler for creating a new Todo owned by the caller
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateTodoSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let name = json_body(payload)?.into_name()?;
    let todo = data.store.insert_todo(user.id, &name).await?;
    Ok(Json(todo))
}

// Handler for flipping the done flag of a Todo by ID
pub async fn update_todo(
    path: Result<Path<i64>, PathRejection>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let id = task_id(path)?;
    let todo = data
        .store
        .toggle_todo(id)
        .await?
        .ok_or(AppError::TaskNotFound)?;
    Ok(Json(todo))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    path: Result<Path<i64>, PathRejection>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let id = task_id(path)?;
    if !data.store.delete_todo(id).await? {
        return Err(AppError::TaskNotFound);
    }
    Ok(Json(MessageResponse {
        message: "Task deleted",
    }))
}
