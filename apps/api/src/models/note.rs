use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A daily standup note. At most one note exists per `(user_id, date)` pair;
/// the upsert workflow enforces this via read-then-branch, not a database
/// constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub yesterday_text: Option<String>,
    pub today_text: Option<String>,
    pub blockers_text: Option<String>,
    pub learnings_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The four free-text sections of a note as submitted from the form.
/// All fields are optional, but at least one must carry text to save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    #[serde(default)]
    pub yesterday_text: Option<String>,
    #[serde(default)]
    pub today_text: Option<String>,
    #[serde(default)]
    pub blockers_text: Option<String>,
    #[serde(default)]
    pub learnings_text: Option<String>,
}

impl NoteFields {
    /// Trims every field, mapping whitespace-only values to `None`.
    pub fn trimmed(&self) -> NoteFields {
        fn clean(field: &Option<String>) -> Option<String> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        }
        NoteFields {
            yesterday_text: clean(&self.yesterday_text),
            today_text: clean(&self.today_text),
            blockers_text: clean(&self.blockers_text),
            learnings_text: clean(&self.learnings_text),
        }
    }

    /// True when no field carries any text. An empty note is never persisted.
    pub fn is_empty(&self) -> bool {
        let trimmed = self.trimmed();
        trimmed.yesterday_text.is_none()
            && trimmed.today_text.is_none()
            && trimmed.blockers_text.is_none()
            && trimmed.learnings_text.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_drops_whitespace_only_fields() {
        let fields = NoteFields {
            yesterday_text: Some("  shipped the thing  ".to_string()),
            today_text: Some("   ".to_string()),
            blockers_text: Some(String::new()),
            learnings_text: None,
        };
        let trimmed = fields.trimmed();
        assert_eq!(trimmed.yesterday_text.as_deref(), Some("shipped the thing"));
        assert_eq!(trimmed.today_text, None);
        assert_eq!(trimmed.blockers_text, None);
        assert_eq!(trimmed.learnings_text, None);
    }

    #[test]
    fn test_is_empty_for_all_whitespace() {
        let fields = NoteFields {
            yesterday_text: Some(" ".to_string()),
            today_text: Some("\n\t".to_string()),
            blockers_text: None,
            learnings_text: Some(String::new()),
        };
        assert!(fields.is_empty());
    }

    #[test]
    fn test_is_empty_false_with_one_field() {
        let fields = NoteFields {
            learnings_text: Some("learned about debounce timers".to_string()),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }
}
