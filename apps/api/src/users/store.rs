use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{Role, Team, User};

/// All users, ordered for the identity-selection grid.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Users for a set of ids. Returns an empty list (not an error) when `ids`
/// is empty.
pub async fn list_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub team: Team,
    pub role: Role,
    pub github_username: Option<String>,
}

pub async fn insert_user(pool: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (id, username, display_name, email, team, role, github_username, selected_user_ids)
        VALUES ($1, $2, $3, $4, $5, $6, $7, '{}')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.username)
    .bind(&new.display_name)
    .bind(&new.email)
    .bind(new.team)
    .bind(new.role)
    .bind(&new.github_username)
    .fetch_one(pool)
    .await
}

pub struct ProfileUpdate {
    pub display_name: String,
    pub email: String,
    pub github_username: Option<String>,
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET display_name = $2, email = $3, github_username = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.display_name)
    .bind(&update.email)
    .bind(&update.github_username)
    .fetch_optional(pool)
    .await
}
