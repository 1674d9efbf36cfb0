pub mod handlers;

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::note::Note;
use crate::models::user::{Role, Team, User};
use crate::notes::store as note_store;
use crate::users::store as user_store;

/// Coarse relative date-range selector for the aggregated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Today,
    ThisWeek,
    ThisMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowKind {
    /// Inclusive date range for this window, anchored at `today` (UTC).
    ///
    /// Weeks start on Monday; on a Sunday the week start is six days prior.
    /// Every window bounds `end` at `today`, so future-dated notes never
    /// appear in any view.
    pub fn range(self, today: NaiveDate) -> DateRange {
        let start = match self {
            WindowKind::Today => today,
            WindowKind::ThisWeek => today
                .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
                .unwrap_or(today),
            WindowKind::ThisMonth => today.with_day(1).unwrap_or(today),
        };
        DateRange { start, end: today }
    }
}

/// One user's notes within a team group, newest date first.
#[derive(Debug, Clone, Serialize)]
pub struct UserGroup {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: Role,
    pub notes: Vec<Note>,
}

/// All users of one team that have notes in the window. Emitted once per
/// team transition so the view renders a single header per team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamGroup {
    pub team: Team,
    pub users: Vec<UserGroup>,
}

/// The derived, non-persisted aggregated view: notes filtered to a window
/// and a roster, grouped by team then user. Recomputed on every relevant
/// input change.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedView {
    pub window: WindowKind,
    pub teams: Vec<TeamGroup>,
}

impl AggregatedView {
    pub fn empty(window: WindowKind) -> Self {
        Self {
            window,
            teams: Vec::new(),
        }
    }

    /// Flattened notes across all groups, for the summary request builder.
    pub fn notes(&self) -> Vec<Note> {
        self.teams
            .iter()
            .flat_map(|t| t.users.iter())
            .flat_map(|u| u.notes.iter().cloned())
            .collect()
    }
}

/// Groups notes by team then user with a deterministic order: team ascending
/// lexicographic, display name ascending within team, notes newest-first
/// within user. Stable for any permutation of the input. Users with zero
/// notes in the window get no placeholder group; notes whose owner is not in
/// `users` are dropped.
pub fn group_notes(notes: Vec<Note>, users: &[User]) -> Vec<TeamGroup> {
    let by_id: HashMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();

    let mut buckets: HashMap<Uuid, Vec<Note>> = HashMap::new();
    for note in notes {
        if by_id.contains_key(&note.user_id) {
            buckets.entry(note.user_id).or_default().push(note);
        }
    }

    let mut groups: Vec<UserGroup> = buckets
        .into_iter()
        .map(|(user_id, mut notes)| {
            notes.sort_by(|a, b| b.date.cmp(&a.date));
            let user = by_id[&user_id];
            UserGroup {
                user_id,
                display_name: user.display_name.clone(),
                role: user.role,
                notes,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        let team_a = by_id[&a.user_id].team.as_str();
        let team_b = by_id[&b.user_id].team.as_str();
        team_a
            .cmp(team_b)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    let mut teams: Vec<TeamGroup> = Vec::new();
    for group in groups {
        let team = by_id[&group.user_id].team;
        match teams.last_mut() {
            Some(last) if last.team == team => last.users.push(group),
            _ => teams.push(TeamGroup {
                team,
                users: vec![group],
            }),
        }
    }
    teams
}

/// Retrieves and groups notes for a roster over a window. An empty roster
/// yields an empty view, not an error.
pub async fn aggregate(
    pool: &PgPool,
    user_ids: &[Uuid],
    window: WindowKind,
    today: NaiveDate,
) -> Result<AggregatedView, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(AggregatedView::empty(window));
    }

    let range = window.range(today);
    let notes = note_store::list_notes_for_users(pool, user_ids, range.start, range.end).await?;
    let users = user_store::list_by_ids(pool, user_ids).await?;

    Ok(AggregatedView {
        window,
        teams: group_notes(notes, &users),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn user(id: u128, name: &str, team: Team) -> User {
        User {
            id: Uuid::from_u128(id),
            username: name.to_lowercase(),
            display_name: name.to_string(),
            email: String::new(),
            team,
            role: Role::Engineer,
            github_username: None,
            selected_user_ids: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn note(owner: u128, d: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            user_id: Uuid::from_u128(owner),
            date: date(d),
            yesterday_text: Some("y".to_string()),
            today_text: Some("t".to_string()),
            blockers_text: None,
            learnings_text: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_today_window_is_single_day() {
        let r = WindowKind::Today.range(date("2024-06-01"));
        assert_eq!(r.start, date("2024-06-01"));
        assert_eq!(r.end, date("2024-06-01"));
    }

    #[test]
    fn test_week_window_starts_monday() {
        // 2024-06-01 is a Saturday; the preceding Monday is 2024-05-27.
        let r = WindowKind::ThisWeek.range(date("2024-06-01"));
        assert_eq!(r.start, date("2024-05-27"));
        assert_eq!(r.end, date("2024-06-01"));
    }

    #[test]
    fn test_week_window_on_sunday_goes_back_six_days() {
        // 2024-06-02 is a Sunday.
        let r = WindowKind::ThisWeek.range(date("2024-06-02"));
        assert_eq!(r.start, date("2024-05-27"));
    }

    #[test]
    fn test_week_window_on_monday_is_same_day() {
        let r = WindowKind::ThisWeek.range(date("2024-05-27"));
        assert_eq!(r.start, date("2024-05-27"));
        assert_eq!(r.end, date("2024-05-27"));
    }

    #[test]
    fn test_month_window_starts_on_the_first() {
        let r = WindowKind::ThisMonth.range(date("2024-06-15"));
        assert_eq!(r.start, date("2024-06-01"));
        assert_eq!(r.end, date("2024-06-15"));
    }

    #[test]
    fn test_grouping_orders_team_then_display_name() {
        let users = vec![
            user(1, "Zara", Team::Engineering),
            user(2, "Amir", Team::Product),
            user(3, "Noor", Team::Engineering),
            user(4, "Lena", Team::Pmo),
        ];
        let notes = vec![
            note(2, "2024-06-01"),
            note(1, "2024-06-01"),
            note(4, "2024-06-01"),
            note(3, "2024-06-01"),
        ];

        let teams = group_notes(notes, &users);
        let team_order: Vec<&str> = teams.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(team_order, vec!["ENGINEERING", "PMO", "PRODUCT"]);

        let eng_names: Vec<&str> = teams[0]
            .users
            .iter()
            .map(|u| u.display_name.as_str())
            .collect();
        assert_eq!(eng_names, vec!["Noor", "Zara"]);
    }

    #[test]
    fn test_grouping_is_stable_under_permutation() {
        let users = vec![
            user(1, "Zara", Team::Engineering),
            user(2, "Amir", Team::Product),
            user(3, "Noor", Team::Engineering),
        ];
        let notes = vec![
            note(1, "2024-06-01"),
            note(1, "2024-05-30"),
            note(2, "2024-06-01"),
            note(3, "2024-05-31"),
        ];

        let forward = group_notes(notes.clone(), &users);
        let mut shuffled = notes;
        shuffled.reverse();
        shuffled.swap(0, 2);
        let backward = group_notes(shuffled, &users);

        let flatten = |teams: &[TeamGroup]| -> Vec<(String, Vec<NaiveDate>)> {
            teams
                .iter()
                .flat_map(|t| t.users.iter())
                .map(|u| {
                    (
                        u.display_name.clone(),
                        u.notes.iter().map(|n| n.date).collect(),
                    )
                })
                .collect()
        };
        assert_eq!(flatten(&forward), flatten(&backward));
    }

    #[test]
    fn test_notes_are_newest_first_within_user() {
        let users = vec![user(1, "Zara", Team::Engineering)];
        let notes = vec![
            note(1, "2024-05-30"),
            note(1, "2024-06-01"),
            note(1, "2024-05-31"),
        ];
        let teams = group_notes(notes, &users);
        let dates: Vec<NaiveDate> = teams[0].users[0].notes.iter().map(|n| n.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-06-01"), date("2024-05-31"), date("2024-05-30")]
        );
    }

    #[test]
    fn test_users_without_notes_are_absent() {
        let users = vec![
            user(1, "Zara", Team::Engineering),
            user(2, "Amir", Team::Product),
        ];
        let notes = vec![note(1, "2024-06-01")];
        let teams = group_notes(notes, &users);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].users.len(), 1);
        assert_eq!(teams[0].users[0].display_name, "Zara");
    }

    #[test]
    fn test_notes_from_unknown_owner_are_dropped() {
        let users = vec![user(1, "Zara", Team::Engineering)];
        let notes = vec![note(1, "2024-06-01"), note(9, "2024-06-01")];
        let teams = group_notes(notes, &users);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].users[0].notes.len(), 1);
    }

    #[test]
    fn test_one_team_group_per_team_transition() {
        let users = vec![
            user(1, "Ada", Team::Engineering),
            user(2, "Bo", Team::Engineering),
            user(3, "Cy", Team::Pmo),
        ];
        let notes = vec![
            note(1, "2024-06-01"),
            note(2, "2024-06-01"),
            note(3, "2024-06-01"),
        ];
        let teams = group_notes(notes, &users);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].users.len(), 2);
        assert_eq!(teams[1].users.len(), 1);
    }
}
