pub mod handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::user::User;

/// Trailing-edge debounce window for persisting selection changes. Rapid
/// toggles collapse into one commit carrying the state after the last one.
pub const COMMIT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Warning returned alongside selection responses after a commit failed.
/// The in-memory roster is kept; the next toggle's cycle retries the save.
pub const COMMIT_WARNING: &str =
    "Your selection could not be saved. It will be retried on your next change.";

/// Persistence seam for the selection roster, behind a trait so the debounce
/// logic is testable without a database.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn save_selection(&self, user_id: Uuid, selected: &[Uuid]) -> anyhow::Result<()>;
}

/// Writes the roster to the user row. The only code path that mutates
/// `selected_user_ids`.
pub struct PgSelectionStore {
    pool: PgPool,
}

impl PgSelectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SelectionStore for PgSelectionStore {
    async fn save_selection(&self, user_id: Uuid, selected: &[Uuid]) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET selected_user_ids = $2 WHERE id = $1")
            .bind(user_id)
            .bind(selected)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

struct Entry {
    selected: Vec<Uuid>,
    /// Bumped on every toggle. A debounce task only commits if its captured
    /// generation is still current when the timer fires, which makes the
    /// debounce trailing-edge: only the last toggle in a burst persists.
    generation: u64,
    /// Set when the most recent commit attempt failed; cleared by the next
    /// successful one. Read by `commit_warning`.
    commit_failed: bool,
}

struct Inner {
    store: Arc<dyn SelectionStore>,
    entries: Mutex<HashMap<Uuid, Entry>>,
}

/// Owns each user's in-memory "selected colleagues" roster.
///
/// Toggles mutate local state synchronously so dependents (the aggregated
/// view) can re-derive immediately; persistence happens on a debounced timer
/// and is optimistic-only: a failed commit is logged, never rolled back, and
/// the next toggle's cycle retries with the latest state.
#[derive(Clone)]
pub struct SelectionManager {
    inner: Arc<Inner>,
}

impl SelectionManager {
    pub fn new(store: Arc<dyn SelectionStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The user's current selection: in-memory state when present, otherwise
    /// the persisted roster on the user entity. Synchronous, no I/O.
    pub fn current(&self, user: &User) -> Vec<Uuid> {
        let entries = self.inner.entries.lock().unwrap();
        entries
            .get(&user.id)
            .map(|e| e.selected.clone())
            .unwrap_or_else(|| user.selected_user_ids.clone())
    }

    /// A user-facing warning when the user's last selection commit failed and
    /// no later commit has succeeded. Attached to selection responses so the
    /// user learns their roster has not persisted.
    pub fn commit_warning(&self, user_id: Uuid) -> Option<String> {
        let entries = self.inner.entries.lock().unwrap();
        entries
            .get(&user_id)
            .filter(|e| e.commit_failed)
            .map(|_| COMMIT_WARNING.to_string())
    }

    /// Flips `colleague_id` in the user's selection and returns the new full
    /// selection immediately. Schedules a debounced commit of the final
    /// state; each toggle supersedes any pending commit.
    pub fn toggle(&self, user: &User, colleague_id: Uuid) -> Vec<Uuid> {
        let (selected, generation) = {
            let mut entries = self.inner.entries.lock().unwrap();
            let entry = entries.entry(user.id).or_insert_with(|| Entry {
                selected: user.selected_user_ids.clone(),
                generation: 0,
                commit_failed: false,
            });

            match entry.selected.iter().position(|id| *id == colleague_id) {
                Some(idx) => {
                    entry.selected.remove(idx);
                }
                None => entry.selected.push(colleague_id),
            }
            entry.generation += 1;
            (entry.selected.clone(), entry.generation)
        };

        let inner = Arc::clone(&self.inner);
        let user_id = user.id;
        tokio::spawn(async move {
            tokio::time::sleep(COMMIT_DEBOUNCE).await;

            let latest = {
                let entries = inner.entries.lock().unwrap();
                match entries.get(&user_id) {
                    Some(entry) if entry.generation == generation => Some(entry.selected.clone()),
                    _ => None, // superseded by a later toggle
                }
            };

            if let Some(latest) = latest {
                debug!("Committing selection for user {user_id}: {} ids", latest.len());
                let failed = match inner.store.save_selection(user_id, &latest).await {
                    Ok(()) => false,
                    Err(e) => {
                        warn!("Selection commit failed for user {user_id}: {e}");
                        true
                    }
                };
                let mut entries = inner.entries.lock().unwrap();
                if let Some(entry) = entries.get_mut(&user_id) {
                    entry.commit_failed = failed;
                }
            }
        });

        selected
    }
}
