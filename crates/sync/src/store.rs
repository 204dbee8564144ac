//! Optimistic, write-behind store for goals and activities.
//!
//! [`GoalSyncStore`] owns the locally-cached entity lists and a set of
//! per-goal pending edits.  Edits apply to the local copy immediately
//! and are persisted in the background: all edits accumulated for a
//! goal since its last flight are drained into one `PATCH`, and a
//! failed flight merges its snapshot back underneath any edits made
//! while it was in the air, so nothing the user typed is ever lost.
//!
//! Flights for the same goal are serialized; flights for different
//! goals run concurrently.  A 401/403 from any endpoint clears the
//! held credential, surfaces a session-expired message, and schedules
//! a single redirect event after a short delay.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::api::LearningApi;
use crate::error::ApiError;
use crate::events::{StoreEvent, StoreEvents};
use crate::session::TokenStore;
use crate::wire::{ActivityPayload, CourseRecord, GoalPatch, GoalPayload, WeeklySummary};
use skillstack_core::activity::{Activity, ActivityDraft};
use skillstack_core::goal::{Goal, GoalChanges, GoalDraft, GoalEdit};
use skillstack_core::insights::GoalInsights;
use skillstack_core::types::DbId;

/// Delay between an authentication failure and the redirect event.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// How many imported courses the store keeps, newest first.
pub const RECENT_IMPORT_LIMIT: usize = 6;

/// Sync status of one goal, for per-row indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// No pending edits and no flight in progress.
    Clean,
    /// Edits are waiting to be persisted.
    Dirty,
    /// A `PATCH` for this goal is currently in flight.
    Persisting,
}

/// Status messages surfaced to the user, one slot per concern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMessages {
    pub goals: Option<String>,
    pub activities: Option<String>,
    /// Save failures from background persists.
    pub sync: Option<String>,
    pub course_import: Option<String>,
    pub summary: Option<String>,
}

/// Everything the store caches locally.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub goals: Vec<Goal>,
    pub activities: Vec<Activity>,
    pub recent_imports: Vec<CourseRecord>,
    pub latest_summary: Option<WeeklySummary>,
    pub messages: StatusMessages,
}

/// Optimistic local store with coalesced background persistence.
pub struct GoalSyncStore {
    api: Arc<dyn LearningApi>,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<StoreState>,
    /// Not-yet-persisted edits, keyed by goal id.
    pending: StdMutex<HashMap<DbId, GoalChanges>>,
    /// Per-goal flight locks; flights for one goal never overlap.
    persist_locks: StdMutex<HashMap<DbId, Arc<Mutex<()>>>>,
    /// Goals with a `PATCH` currently in flight.
    persisting: StdMutex<HashSet<DbId>>,
    /// Latched once the first redirect has been scheduled.
    redirect_scheduled: AtomicBool,
    events: StoreEvents,
    cancel: CancellationToken,
}

impl GoalSyncStore {
    pub fn new(api: Arc<dyn LearningApi>, tokens: Arc<dyn TokenStore>) -> Arc<Self> {
        Arc::new(Self {
            api,
            tokens,
            state: RwLock::new(StoreState::default()),
            pending: StdMutex::new(HashMap::new()),
            persist_locks: StdMutex::new(HashMap::new()),
            persisting: StdMutex::new(HashSet::new()),
            redirect_scheduled: AtomicBool::new(false),
            events: StoreEvents::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to session-level events ([`StoreEvent`]).
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Stop background work.  In-flight requests finish but no longer
    /// touch local state, and a scheduled redirect is abandoned.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ---- accessors ----

    /// Snapshot of the full cached state.
    pub async fn state(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub async fn goals(&self) -> Vec<Goal> {
        self.state.read().await.goals.clone()
    }

    pub async fn activities(&self) -> Vec<Activity> {
        self.state.read().await.activities.clone()
    }

    pub async fn messages(&self) -> StatusMessages {
        self.state.read().await.messages.clone()
    }

    pub async fn recent_imports(&self) -> Vec<CourseRecord> {
        self.state.read().await.recent_imports.clone()
    }

    pub async fn latest_summary(&self) -> Option<WeeklySummary> {
        self.state.read().await.latest_summary.clone()
    }

    /// Aggregates for the insights panel, computed over the cached goals.
    pub async fn insights(&self) -> GoalInsights {
        GoalInsights::compute(&self.state.read().await.goals)
    }

    /// Sync status of one goal.  A goal with a flight in the air shows
    /// [`EditState::Persisting`] even when newer edits are queued behind it.
    pub fn goal_edit_state(&self, id: DbId) -> EditState {
        if self.persisting.lock().expect("persisting lock poisoned").contains(&id) {
            return EditState::Persisting;
        }
        let dirty = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .get(&id)
            .is_some_and(|changes| !changes.is_empty());
        if dirty {
            EditState::Dirty
        } else {
            EditState::Clean
        }
    }

    /// Pending (not yet persisted) edits for one goal, if any.
    pub fn pending_changes(&self, id: DbId) -> Option<GoalChanges> {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .get(&id)
            .filter(|changes| !changes.is_empty())
            .cloned()
    }

    // ---- operations ----

    /// Fetch both entity lists concurrently, replacing the cached copies.
    ///
    /// The two fetches fail independently; a goals failure does not
    /// discard freshly-loaded activities or vice versa.
    pub async fn load_all(&self) {
        let (goals_result, activities_result) =
            tokio::join!(self.api.list_goals(), self.api.list_activities());
        if self.cancel.is_cancelled() {
            return;
        }

        match goals_result {
            Ok(records) => {
                let goals: Vec<Goal> = records.into_iter().map(|r| r.into_goal()).collect();
                tracing::debug!(count = goals.len(), "loaded goals");
                let mut state = self.state.write().await;
                state.goals = goals;
                state.messages.goals = None;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to load goals");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.goals =
                    Some(error.display_message("Could not load goals."));
            }
        }

        match activities_result {
            Ok(records) => {
                let activities: Vec<Activity> =
                    records.into_iter().map(|r| r.into_activity()).collect();
                tracing::debug!(count = activities.len(), "loaded activities");
                let mut state = self.state.write().await;
                state.activities = activities;
                state.messages.activities = None;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to load activities");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.activities =
                    Some(error.display_message("Could not load activities."));
            }
        }
    }

    /// Create a goal from form state and prepend it to the cached list.
    ///
    /// A draft with an empty skill name is silently ignored.  On
    /// success the draft resets to the form defaults.
    pub async fn create_goal(&self, draft: &mut GoalDraft) {
        if draft.skill_name.trim().is_empty() {
            return;
        }
        let payload = match GoalPayload::from_draft(draft) {
            Ok(payload) => payload,
            Err(error) => {
                self.state.write().await.messages.goals = Some(error.to_string());
                return;
            }
        };

        match self.api.create_goal(&payload).await {
            Ok(record) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::info!(goal_id = record.id, "created goal");
                let mut state = self.state.write().await;
                state.goals.insert(0, record.into_goal());
                state.messages.goals = None;
                *draft = GoalDraft::default();
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to create goal");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.goals =
                    Some(error.display_message("Could not create the goal."));
            }
        }
    }

    /// Apply one field edit to the local goal and record it as pending.
    ///
    /// With `persist_immediately` the edit is also flushed right away
    /// (select-style inputs persist on change; text inputs call
    /// [`persist_goal`](Self::persist_goal) on blur instead).  Callers
    /// that want the flush off their task spawn this call.
    pub async fn update_goal_field(&self, id: DbId, edit: GoalEdit, persist_immediately: bool) {
        {
            let mut state = self.state.write().await;
            let Some(goal) = state.goals.iter_mut().find(|g| g.id == id) else {
                tracing::warn!(goal_id = id, "edit for unknown goal ignored");
                return;
            };
            edit.apply_to(goal);
        }
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .entry(id)
            .or_default()
            .record(edit);

        if persist_immediately {
            self.persist_goal(id).await;
        }
    }

    /// Drain the pending edits for one goal into a single `PATCH`.
    ///
    /// No-op when nothing is pending.  Concurrent calls for the same
    /// goal are serialized, so rapid change/blur sequences collapse
    /// into back-to-back flights rather than interleaved ones.  On
    /// failure the drained snapshot is merged back underneath any edits
    /// made while the flight was in the air.
    pub async fn persist_goal(&self, id: DbId) {
        let flight = self.flight_lock(id);
        let _flight = flight.lock().await;

        let Some(snapshot) = self.take_pending(id) else {
            return;
        };
        self.state.write().await.messages.sync = None;
        self.persisting
            .lock()
            .expect("persisting lock poisoned")
            .insert(id);

        let patch = GoalPatch::from_changes(&snapshot);
        let result = self.api.update_goal(id, &patch).await;

        self.persisting
            .lock()
            .expect("persisting lock poisoned")
            .remove(&id);

        match result {
            Ok(maybe_record) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::debug!(goal_id = id, "persisted goal edits");
                if let Some(record) = maybe_record {
                    let mut state = self.state.write().await;
                    if let Some(goal) = state.goals.iter_mut().find(|g| g.id == id) {
                        *goal = record.into_goal();
                    }
                }
            }
            Err(error) => {
                // Restore the drained edits so nothing typed is lost;
                // edits made during the flight keep their newer values.
                self.pending
                    .lock()
                    .expect("pending lock poisoned")
                    .entry(id)
                    .or_default()
                    .merge_under(snapshot);

                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::warn!(goal_id = id, error = %error, "failed to persist goal edits");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.sync =
                    Some(error.display_message("Could not save your changes."));
            }
        }
    }

    /// Delete a goal on the server, then drop it and every activity
    /// attributed to it from the cache.  On failure nothing local changes.
    pub async fn remove_goal(&self, id: DbId) {
        match self.api.delete_goal(id).await {
            Ok(()) => {
                self.pending.lock().expect("pending lock poisoned").remove(&id);
                self.persist_locks
                    .lock()
                    .expect("persist locks poisoned")
                    .remove(&id);
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::info!(goal_id = id, "removed goal");
                let mut state = self.state.write().await;
                state.goals.retain(|g| g.id != id);
                state.activities.retain(|a| a.goal_id != id);
                state.messages.goals = None;
            }
            Err(error) => {
                tracing::warn!(goal_id = id, error = %error, "failed to remove goal");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.goals =
                    Some(error.display_message("Could not delete the goal."));
            }
        }
    }

    /// Log an activity from form state and prepend it to the cached list.
    ///
    /// Drafts without a selected goal or with non-numeric hours are
    /// rejected locally; no request is made.  On success the draft's
    /// entry fields reset, keeping the selected goal and date.
    pub async fn log_activity(&self, draft: &mut ActivityDraft) {
        let payload = match ActivityPayload::from_draft(draft) {
            Ok(payload) => payload,
            Err(error) => {
                self.state.write().await.messages.activities = Some(error.to_string());
                return;
            }
        };

        match self.api.create_activity(&payload).await {
            Ok(record) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::info!(activity_id = record.id, goal_id = record.goal, "logged activity");
                let mut state = self.state.write().await;
                state.activities.insert(0, record.into_activity());
                state.messages.activities = None;
                draft.reset_entry();
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to log activity");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.activities =
                    Some(error.display_message("Could not log the activity."));
            }
        }
    }

    /// Import course metadata for a URL into the recent-imports list.
    ///
    /// The list is deduplicated by course id and capped at
    /// [`RECENT_IMPORT_LIMIT`], newest first.  A blank URL is ignored.
    pub async fn import_course(&self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }

        match self.api.import_course(url).await {
            Ok(record) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::info!(course_id = record.id, "imported course");
                let mut state = self.state.write().await;
                state.recent_imports.retain(|c| c.id != record.id);
                state.messages.course_import =
                    Some(format!("Imported \"{}\".", record.title));
                state.recent_imports.insert(0, record);
                state.recent_imports.truncate(RECENT_IMPORT_LIMIT);
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to import course");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.course_import =
                    Some(error.display_message("Could not import the course."));
            }
        }
    }

    /// Request the weekly digest and cache the result.
    pub async fn send_weekly_summary(&self) {
        match self.api.send_weekly_summary().await {
            Ok(summary) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                let mut state = self.state.write().await;
                state.messages.summary =
                    Some(if summary.email_requested && !summary.sent_to.is_empty() {
                        format!("Weekly summary sent to {}.", summary.sent_to)
                    } else {
                        "Weekly summary generated.".to_string()
                    });
                state.latest_summary = Some(summary);
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to build weekly summary");
                self.handle_auth_failure(&error).await;
                self.state.write().await.messages.summary =
                    Some(error.display_message("Could not build the weekly summary."));
            }
        }
    }

    /// Drop the held credential.  Navigation is the caller's concern.
    pub fn logout(&self) {
        self.tokens.clear();
    }

    /// Uniform handling for a rejected credential.
    ///
    /// For a 401/403: clears both tokens, publishes
    /// [`StoreEvent::SessionExpired`], and schedules a single
    /// [`StoreEvent::RedirectToLogin`] after [`REDIRECT_DELAY`] -- at
    /// most once per store lifetime, however many requests fail in the
    /// meantime.  Returns `true` in that case, `false` for any other
    /// error (which is left untouched).
    pub async fn handle_auth_failure(&self, error: &ApiError) -> bool {
        if !error.is_auth_failure() {
            return false;
        }
        let detail = error.display_message("");
        tracing::warn!("session expired, clearing credentials");
        self.tokens.clear();
        self.events.publish(StoreEvent::SessionExpired { detail });

        if !self.redirect_scheduled.swap(true, Ordering::SeqCst) {
            let events = self.events.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(REDIRECT_DELAY) => {
                        events.publish(StoreEvent::RedirectToLogin);
                    }
                }
            });
        }
        true
    }

    // ---- private helpers ----

    fn flight_lock(&self, id: DbId) -> Arc<Mutex<()>> {
        self.persist_locks
            .lock()
            .expect("persist locks poisoned")
            .entry(id)
            .or_default()
            .clone()
    }

    /// Remove and return the pending edits for a goal, if any are non-empty.
    fn take_pending(&self, id: DbId) -> Option<GoalChanges> {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .remove(&id)
            .filter(|changes| !changes.is_empty())
    }
}
