use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::note::Note;
use crate::models::user::User;

/// Sentinel display name when a note's owner is missing from the roster.
/// The name lookup is total; it never fails.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Visible separator between note blocks in the transcript.
const BLOCK_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No notes are available to summarize. Select at least one user in the Summary Aggregator.")]
    NoNotesSelected,

    #[error("None of the selected users have submitted a note for today.")]
    NoTodayNotes,

    #[error("Today's notes contain no text to summarize.")]
    EmptyPayload,
}

/// Ephemeral value object sent to the summarization function. Lives only for
/// the duration of one summarize call.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    /// Natural-language transcript of today's notes.
    pub notes: String,
    /// Unique contributor display names, in first-appearance order.
    pub users: Vec<String>,
    pub date: NaiveDate,
    #[serde(rename = "requestingUserDisplayName")]
    pub requesting_user_display_name: String,
}

fn field_or_na(field: &Option<String>) -> &str {
    field
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("N/A")
}

fn render_block(note: &Note, display_name: &str) -> String {
    format!(
        "{display_name}:\nYesterday: {}\nToday: {}\nBlockers: {}\nLearnings: {}",
        field_or_na(&note.yesterday_text),
        field_or_na(&note.today_text),
        field_or_na(&note.blockers_text),
        field_or_na(&note.learnings_text),
    )
}

/// Builds a bounded summary request from the aggregated notes.
///
/// Filters to exactly today's UTC date. An empty input set and a set with no
/// notes from today are distinct failures with distinct user-facing text.
pub fn build(
    aggregated_notes: &[Note],
    users: &[User],
    requesting_user: &User,
    today: NaiveDate,
) -> Result<SummaryRequest, BuildError> {
    if aggregated_notes.is_empty() {
        return Err(BuildError::NoNotesSelected);
    }

    let todays: Vec<&Note> = aggregated_notes.iter().filter(|n| n.date == today).collect();
    if todays.is_empty() {
        return Err(BuildError::NoTodayNotes);
    }

    let names: HashMap<Uuid, &str> = users
        .iter()
        .map(|u| (u.id, u.display_name.as_str()))
        .collect();

    let mut contributors: Vec<String> = Vec::new();
    let mut blocks: Vec<String> = Vec::new();
    for note in &todays {
        let name = names.get(&note.user_id).copied().unwrap_or(UNKNOWN_USER);
        if !contributors.iter().any(|c| c == name) {
            contributors.push(name.to_string());
        }
        blocks.push(render_block(note, name));
    }

    let notes = blocks.join(BLOCK_SEPARATOR);
    // Unreachable given the filter above, but checked anyway.
    if notes.trim().is_empty() {
        return Err(BuildError::EmptyPayload);
    }

    Ok(SummaryRequest {
        notes,
        users: contributors,
        date: today,
        requesting_user_display_name: requesting_user.display_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, Team};
    use chrono::{TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn user(id: u128, name: &str) -> User {
        User {
            id: Uuid::from_u128(id),
            username: name.to_lowercase(),
            display_name: name.to_string(),
            email: String::new(),
            team: Team::Engineering,
            role: Role::Engineer,
            github_username: None,
            selected_user_ids: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn note(owner: u128, d: &str, today_text: Option<&str>) -> Note {
        Note {
            id: Uuid::new_v4(),
            user_id: Uuid::from_u128(owner),
            date: date(d),
            yesterday_text: None,
            today_text: today_text.map(str::to_string),
            blockers_text: None,
            learnings_text: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_input_is_no_notes_selected() {
        let requester = user(1, "Zara");
        let err = build(&[], &[], &requester, date("2024-06-01")).unwrap_err();
        assert_eq!(err, BuildError::NoNotesSelected);
    }

    #[test]
    fn test_only_past_notes_is_no_today_notes() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir")];
        let notes = vec![note(2, "2024-05-31", Some("yesterday's work"))];
        let err = build(&notes, &users, &requester, date("2024-06-01")).unwrap_err();
        assert_eq!(err, BuildError::NoTodayNotes);
    }

    #[test]
    fn test_transcript_substitutes_na_for_empty_fields() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir")];
        let notes = vec![note(2, "2024-06-01", Some("ship the client"))];
        let req = build(&notes, &users, &requester, date("2024-06-01")).unwrap();
        assert!(req.notes.contains("Amir:"));
        assert!(req.notes.contains("Yesterday: N/A"));
        assert!(req.notes.contains("Today: ship the client"));
        assert!(req.notes.contains("Blockers: N/A"));
        assert!(req.notes.contains("Learnings: N/A"));
    }

    #[test]
    fn test_contributors_deduped_in_first_appearance_order() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir"), user(3, "Noor")];
        // Two notes from unknown owners collapse into one "Unknown User".
        let notes = vec![
            note(3, "2024-06-01", Some("a")),
            note(9, "2024-06-01", Some("b")),
            note(2, "2024-06-01", Some("c")),
            note(8, "2024-06-01", Some("d")),
        ];
        let req = build(&notes, &users, &requester, date("2024-06-01")).unwrap();
        assert_eq!(req.users, vec!["Noor", UNKNOWN_USER, "Amir"]);
    }

    #[test]
    fn test_past_notes_are_filtered_out_of_transcript() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir")];
        let notes = vec![
            note(2, "2024-06-01", Some("today's plan")),
            note(2, "2024-05-30", Some("old plan")),
        ];
        let req = build(&notes, &users, &requester, date("2024-06-01")).unwrap();
        assert!(req.notes.contains("today's plan"));
        assert!(!req.notes.contains("old plan"));
    }

    #[test]
    fn test_request_carries_requester_and_date() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir")];
        let notes = vec![note(2, "2024-06-01", Some("x"))];
        let req = build(&notes, &users, &requester, date("2024-06-01")).unwrap();
        assert_eq!(req.requesting_user_display_name, "Zara");
        assert_eq!(req.date, date("2024-06-01"));
    }

    #[test]
    fn test_wire_shape_matches_function_contract() {
        let requester = user(1, "Zara");
        let users = vec![user(2, "Amir")];
        let notes = vec![note(2, "2024-06-01", Some("x"))];
        let req = build(&notes, &users, &requester, date("2024-06-01")).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["requestingUserDisplayName"], "Zara");
        assert!(json["notes"].is_string());
        assert!(json["users"].is_array());
    }
}
