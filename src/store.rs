// SQLite persistence for users and todos.
use std::{str::FromStr, time::Duration};

use sqlx::{
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

use crate::{
    error::AppError,
    model::{Todo, User},
};

const SCHEMA: [&str; 3] = [
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT UNIQUE,
        password_hash TEXT NOT NULL
    );"#,
    r#"CREATE TABLE IF NOT EXISTS todos (
        task_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        done BOOLEAN NOT NULL DEFAULT 0,
        user_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    "CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos (user_id);",
];

// Handle on the database pool, opened once at startup and shared by every handler.
#[derive(Clone)]
pub struct Store {
    db: Pool<Sqlite>,
}

impl Store {
    // Opens the pool, creating the database file if it does not exist yet.
    // An in-memory database lives only as long as its connection, so it is
    // pinned to a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let db = pool_options.connect_with(options).await?;
        info!(url, "connected to the database");
        Ok(Self { db })
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            query(statement).execute(&self.db).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    // Inserts a user. A unique-constraint violation becomes the matching
    // duplicate error, so a signup that slipped past the existence checks still
    // gets the same answer.
    pub async fn insert_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User, AppError> {
        query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) \
             RETURNING id, username, email, password_hash",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(duplicate_user_error)
    }

    pub async fn list_todos(&self, owner_id: i64) -> Result<Vec<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT task_id, name, done, user_id FROM todos WHERE user_id = ? ORDER BY task_id",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
    }

    // A signed token whose user row is gone fails the owner foreign key; that
    // caller has no identity here, so it is answered like a bad token
    pub async fn insert_todo(&self, owner_id: i64, name: &str) -> Result<Todo, AppError> {
        query_as::<_, Todo>(
            "INSERT INTO todos (name, done, user_id) VALUES (?, 0, ?) \
             RETURNING task_id, name, done, user_id",
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await
        .map_err(unknown_owner_error)
    }

    // Looks the todo up by id alone; the owner is not consulted
    pub async fn toggle_todo(&self, task_id: i64) -> Result<Option<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "UPDATE todos SET done = NOT done WHERE task_id = ? \
             RETURNING task_id, name, done, user_id",
        )
        .bind(task_id)
        .fetch_optional(&self.db)
        .await
    }

    // Returns false when no todo had that id
    pub async fn delete_todo(&self, task_id: i64) -> Result<bool, sqlx::Error> {
        let rows_affected = query("DELETE FROM todos WHERE task_id = ?")
            .bind(task_id)
            .execute(&self.db)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }
}

fn duplicate_user_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            // SQLite reports the offending column as "users.<column>"
            return if db_err.message().contains("users.email") {
                AppError::DuplicateEmail
            } else {
                AppError::DuplicateUsername
            };
        }
    }
    AppError::Database(err)
}

fn unknown_owner_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::Unauthorized("Invalid token".to_string());
        }
    }
    AppError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        let store = Store::connect("sqlite::memory:", 1).await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let store = store().await;
        store.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn users_are_found_by_exact_username() {
        let store = store().await;
        let user = store
            .insert_user("alice", Some("a@x.com"), "hash")
            .await
            .unwrap();

        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email.as_deref(), Some("a@x.com"));
        assert_eq!(found.password_hash, "hash");

        assert!(store.find_user_by_username("Alice").await.unwrap().is_none());
        assert!(store.username_exists("alice").await.unwrap());
        assert!(!store.username_exists("bob").await.unwrap());
        assert!(store.email_exists("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn unique_constraints_map_to_duplicates() {
        let store = store().await;
        store.insert_user("alice", Some("a@x.com"), "hash").await.unwrap();

        let err = store
            .insert_user("alice", Some("other@x.com"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername), "{err:?}");

        let err = store
            .insert_user("bob", Some("a@x.com"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail), "{err:?}");
    }

    #[tokio::test]
    async fn missing_emails_do_not_collide() {
        let store = store().await;
        store.insert_user("alice", None, "hash").await.unwrap();
        store.insert_user("bob", None, "hash").await.unwrap();
    }

    #[tokio::test]
    async fn todos_are_listed_per_owner_in_insertion_order() {
        let store = store().await;
        let alice = store.insert_user("alice", None, "hash").await.unwrap();
        let bob = store.insert_user("bob", None, "hash").await.unwrap();

        let first = store.insert_todo(alice.id, "buy milk").await.unwrap();
        store.insert_todo(bob.id, "walk dog").await.unwrap();
        let second = store.insert_todo(alice.id, "pay rent").await.unwrap();

        assert!(!first.done);
        assert_eq!(first.user_id, alice.id);
        assert_eq!(store.list_todos(alice.id).await.unwrap(), vec![first, second]);
        assert_eq!(store.list_todos(bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn todos_need_an_existing_owner() {
        let store = store().await;
        let err = store.insert_todo(99, "buy milk").await.unwrap_err();
        assert!(
            matches!(&err, AppError::Unauthorized(msg) if msg == "Invalid token"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn toggle_flips_done_each_call() {
        let store = store().await;
        let alice = store.insert_user("alice", None, "hash").await.unwrap();
        let todo = store.insert_todo(alice.id, "buy milk").await.unwrap();

        let once = store.toggle_todo(todo.task_id).await.unwrap().unwrap();
        assert!(once.done);
        let twice = store.toggle_todo(todo.task_id).await.unwrap().unwrap();
        assert_eq!(twice, todo);
    }

    #[tokio::test]
    async fn deleted_todos_are_gone() {
        let store = store().await;
        let alice = store.insert_user("alice", None, "hash").await.unwrap();
        let todo = store.insert_todo(alice.id, "buy milk").await.unwrap();

        assert!(store.delete_todo(todo.task_id).await.unwrap());
        assert!(!store.delete_todo(todo.task_id).await.unwrap());
        assert!(store.toggle_todo(todo.task_id).await.unwrap().is_none());
        assert!(store.list_todos(alice.id).await.unwrap().is_empty());
    }
}
