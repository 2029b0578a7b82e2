use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::AppError, model::CurrentUser, AppState};

// Requires a valid `Authorization: Bearer <token>` header and records the caller
pub async fn mw_require_auth<B>(
    State(data): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let auth_header = if let Some(auth_header) = auth_header {
        auth_header
    } else {
        return Err(AppError::Unauthorized(
            "Missing Authorization Header".to_string(),
        ));
    };

    let token = match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme == "Bearer" && !token.trim().is_empty() => token.trim(),
        _ => {
            return Err(AppError::Unauthorized(
                "Bad Authorization header. Expected 'Authorization: Bearer <JWT>'".to_string(),
            ))
        }
    };

    let user_id = data.tokens.verify(token).map_err(|err| {
        warn!(error = %err, "rejected access token");
        err
    })?;

    request.extensions_mut().insert(CurrentUser { id: user_id });

    Ok(next.run(request).await)
}
