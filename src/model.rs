use serde::Serialize;

// Data model representing a Todo item; the owner is never sent to clients
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Todo {
    pub task_id: i64,
    pub name: String,
    pub done: bool,
    #[serde(skip_serializing)]
    pub user_id: i64,
}

// Data model representing a registered user
#[derive(sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// Identity of the caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
}
