use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState};

// Configure CORS for the single front-end origin of this deployment
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .expose_headers([AUTHORIZATION])
}

pub fn create_router(app_state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let app = Router::new()
        .route("/api/todos", get(get_todos).post(create_todo))
        .route("/api/todos/:id", put(update_todo).delete(delete_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/", get(home))
        .with_state(app_state)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http());
    app
}
