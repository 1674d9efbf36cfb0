use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Team a user belongs to. Stored as the `team` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    Engineering,
    Pmo,
    Product,
}

impl Team {
    /// Uppercase label, used for lexicographic group ordering in the
    /// aggregated view.
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Engineering => "ENGINEERING",
            Team::Pmo => "PMO",
            Team::Product => "PRODUCT",
        }
    }
}

/// Fixed set of role titles. Stored as the `role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role")]
pub enum Role {
    #[sqlx(rename = "Engineer")]
    #[serde(rename = "Engineer")]
    Engineer,
    #[sqlx(rename = "Senior Director of Engineering")]
    #[serde(rename = "Senior Director of Engineering")]
    SeniorDirectorOfEngineering,
    #[sqlx(rename = "Senior Product Manager")]
    #[serde(rename = "Senior Product Manager")]
    SeniorProductManager,
    #[sqlx(rename = "Program Manager")]
    #[serde(rename = "Program Manager")]
    ProgramManager,
    #[sqlx(rename = "VP of Product")]
    #[serde(rename = "VP of Product")]
    VpOfProduct,
    #[sqlx(rename = "VP of PMO")]
    #[serde(rename = "VP of PMO")]
    VpOfPmo,
}

/// A dashboard user. `selected_user_ids` is the roster of colleagues whose
/// notes feed this user's aggregated view; it is mutated only through the
/// selection manager. A user may appear in their own roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub team: Team,
    pub role: Role,
    pub github_username: Option<String>,
    pub selected_user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_labels_sort_lexicographically() {
        let mut labels = vec![
            Team::Product.as_str(),
            Team::Engineering.as_str(),
            Team::Pmo.as_str(),
        ];
        labels.sort();
        assert_eq!(labels, vec!["ENGINEERING", "PMO", "PRODUCT"]);
    }

    #[test]
    fn test_role_serializes_as_title_string() {
        let json = serde_json::to_string(&Role::SeniorDirectorOfEngineering).unwrap();
        assert_eq!(json, "\"Senior Director of Engineering\"");
    }
}
