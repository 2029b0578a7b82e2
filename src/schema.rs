use serde::{Deserialize, Serialize};

use crate::error::AppError;

// Request body for signing up; every field is checked by `into_parts`
#[derive(Debug, Deserialize)]
pub struct SignupSchema {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl SignupSchema {
    // Splits the body into `(username, password, email)`, rejecting absent or
    // empty fields. Email is only mandatory when `require_email` is set.
    pub fn into_parts(
        self,
        require_email: bool,
    ) -> Result<(String, String, Option<String>), AppError> {
        let username = present(self.username);
        let password = present(self.password);
        let email = present(self.email);

        match (username, password) {
            (Some(username), Some(password)) if !require_email || email.is_some() => {
                Ok((username, password, email))
            }
            _ if require_email => Err(AppError::MissingField(
                "Username, email and password are required".to_string(),
            )),
            _ => Err(AppError::MissingField(
                "Username and password are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginSchema {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Request body for creating a new Todo
#[derive(Debug, Deserialize)]
pub struct CreateTodoSchema {
    pub name: Option<String>,
}

impl CreateTodoSchema {
    pub fn into_name(self) -> Result<String, AppError> {
        self.name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::MissingField("Task name is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub msg: &'static str,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
