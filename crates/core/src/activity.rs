//! Logged study sessions attributed to a goal.

use chrono::NaiveDate;

use crate::goal::GoalStatus;
use crate::types::{DbId, Timestamp};

/// Denormalized goal fields embedded in activity responses for display.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSummary {
    pub id: DbId,
    pub skill_name: String,
    pub status: GoalStatus,
    pub platform: String,
}

/// A single logged study session against exactly one goal.
///
/// Activities are never edited or deleted directly; they disappear only
/// as a cascade when their goal is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: DbId,
    pub goal_id: DbId,
    /// Goal summary embedded by the server; `None` if it was omitted.
    pub goal: Option<GoalSummary>,
    pub performed_on: NaiveDate,
    pub hours: f64,
    pub notes: String,
    pub created_at: Timestamp,
}

/// Form state for logging an activity.
///
/// `hours` holds the raw input text; parsing happens at the wire
/// boundary so a non-numeric value is rejected before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub goal_id: Option<DbId>,
    pub performed_on: NaiveDate,
    pub hours: String,
    pub notes: String,
}

impl ActivityDraft {
    /// Fresh draft for the given date with the form's default of one hour.
    pub fn for_date(performed_on: NaiveDate) -> Self {
        Self {
            goal_id: None,
            performed_on,
            hours: "1".to_string(),
            notes: String::new(),
        }
    }

    /// Reset the entry fields after a successful log, keeping the
    /// selected goal and date.
    pub fn reset_entry(&mut self) {
        self.hours = "1".to_string();
        self.notes.clear();
    }
}
