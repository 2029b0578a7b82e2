// Multi-tenant to-do list backend: signup/login with bcrypt-hashed passwords,
// JWT bearer authentication and per-user todo CRUD over SQLite.

pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod schema;
pub mod store;
pub mod token;

use chrono::Duration;

use crate::{config::Config, password::PasswordPolicy, store::Store, token::TokenService};

pub use route::create_router;

// Struct representing the application state shared by every handler
pub struct AppState {
    pub store: Store,
    pub tokens: TokenService,
    pub password_policy: PasswordPolicy,
    pub require_email: bool,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            tokens: TokenService::new(
                &config.jwt_secret,
                Duration::minutes(config.jwt_expires_minutes),
            ),
            password_policy: config.password_policy.clone(),
            require_email: config.require_email,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}
