use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::note::Note;
use crate::models::user::{Role, Team, User};
use crate::notes::store as note_store;
use crate::state::AppState;
use crate::users::store::{self, NewUser, ProfileUpdate};

/// Warning text attached to responses when a store read fails and the
/// handler degrades to an empty result instead of erroring.
pub const STORE_WARNING: &str =
    "Some data could not be loaded right now. Showing what is available.";

#[derive(Serialize)]
pub struct DirectoryResponse {
    pub users: Vec<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<DirectoryResponse>, AppError> {
    let (users, warning) = match store::list_users(&state.db).await {
        Ok(users) => (users, None),
        Err(e) => {
            warn!("User directory fetch failed: {e}");
            (Vec::new(), Some(STORE_WARNING.to_string()))
        }
    };
    Ok(Json(DirectoryResponse { users, warning }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /api/v1/login
///
/// Identity selection, not authentication: resolves the chosen username and
/// returns the user's own notes for the dashboard.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = req.username.trim();
    let user = store::find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user named '{username}'")))?;

    let (notes, warning) = match note_store::list_notes_for_user(&state.db, user.id).await {
        Ok(notes) => (notes, None),
        Err(e) => {
            warn!("Note fetch failed during login for {}: {e}", user.id);
            (Vec::new(), Some(STORE_WARNING.to_string()))
        }
    };

    Ok(Json(LoginResponse {
        user,
        notes,
        warning,
    }))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub team: Team,
    pub role: Role,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub github_username: Option<String>,
}

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Please enter a username.".to_string()));
    }
    if username.contains(char::is_whitespace) {
        return Err(AppError::Validation(
            "Usernames may not contain spaces.".to_string(),
        ));
    }

    if store::find_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::Validation(
            "Username already exists. Choose another.".to_string(),
        ));
    }

    let new = NewUser {
        display_name: req
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| username.clone()),
        email: req.email.unwrap_or_default(),
        team: req.team,
        role: req.role,
        github_username: req.github_username.filter(|g| !g.trim().is_empty()),
        username,
    };

    let user = store::insert_user(&state.db, &new).await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub github_username: Option<String>,
}

/// PUT /api/v1/users/:id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<User>, AppError> {
    if req.display_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Display name cannot be empty.".to_string(),
        ));
    }

    let update = ProfileUpdate {
        display_name: req.display_name.trim().to_string(),
        email: req.email.trim().to_string(),
        github_username: req.github_username.filter(|g| !g.trim().is_empty()),
    };

    let user = store::update_profile(&state.db, id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(Json(user))
}
