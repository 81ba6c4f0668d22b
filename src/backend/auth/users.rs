/**
 * User Model and Database Operations
 *
 * Accounts, profile fields and the name search used to find people to chat
 * with.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::messaging::{Participant, ProfileResponse, SenderProfile, UserSummary};

/// Maximum rows returned by a name search
pub const SEARCH_LIMIT: i64 = 50;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, avatar, description, created_at, updated_at";

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login email, unique case-insensitively
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Avatar image URL
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub fn profile(&self) -> ProfileResponse {
        ProfileResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            description: self.description.clone(),
        }
    }

    pub fn sender_profile(&self) -> SenderProfile {
        SenderProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `name` - Display name
/// * `email` - User email
/// * `password_hash` - Hashed password
///
/// # Errors
/// A duplicate email surfaces as a unique-violation `sqlx::Error::Database`.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let query = format!(
        "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
}

/// Get user by email (case-insensitive)
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE email = ? COLLATE NOCASE", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive substring search on display name, excluding `exclude`
///
/// An empty term lists everyone but the caller, capped at `SEARCH_LIMIT`.
pub async fn search_users(
    pool: &SqlitePool,
    term: &str,
    exclude: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(term.trim()));
    let query = format!(
        "SELECT {} FROM users WHERE name LIKE ? ESCAPE '\\' AND id <> ? ORDER BY name LIMIT ?",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(pattern)
        .bind(exclude)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await
}

/// Update description and/or avatar; `None` leaves a field unchanged
///
/// Returns `None` when the user does not exist.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    description: Option<&str>,
    avatar: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        "UPDATE users SET description = COALESCE(?, description), avatar = COALESCE(?, avatar), \
         updated_at = ? WHERE id = ? RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(description)
        .bind(avatar)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Whether a sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
