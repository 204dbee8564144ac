//! Wire-format records and payload builders for the Skillstack REST API.
//!
//! The backend renders decimal fields as JSON strings, so the numeric
//! deserializers here accept both encodings.  All coercion defaults
//! (empty hours -> 0, empty difficulty -> 1, trimmed text) live in the
//! payload builders so they are applied exactly once, at the wire
//! boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use skillstack_core::activity::{Activity, ActivityDraft, GoalSummary};
use skillstack_core::error::CoreError;
use skillstack_core::goal::{
    Goal, GoalChanges, GoalDraft, GoalStatus, ResourceType, DEFAULT_DIFFICULTY, DEFAULT_PLATFORM,
    FALLBACK_DIFFICULTY,
};
use skillstack_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Tolerant numeric decoding
// ---------------------------------------------------------------------------

/// A JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal string: {s:?}"))),
        }
    }
}

fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn de_decimal_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => value.into_f64().map(Some),
        None => Ok(None),
    }
}

fn de_rating_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => {
            let n = value.into_f64::<D::Error>()?;
            Ok(Some(n as u8))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Response records
// ---------------------------------------------------------------------------

/// A goal as returned by `GET/POST /goals/` and `PATCH /goals/{id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalRecord {
    pub id: DbId,
    pub skill_name: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub platform: Option<String>,
    pub status: GoalStatus,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    pub hours_spent: Option<f64>,
    #[serde(default, deserialize_with = "de_rating_opt")]
    pub difficulty_rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl GoalRecord {
    /// Map to the local entity shape.
    ///
    /// Absent platform falls back to [`DEFAULT_PLATFORM`]; absent
    /// difficulty to [`DEFAULT_DIFFICULTY`]; absent hours stays `None`
    /// (the input renders empty).
    pub fn into_goal(self) -> Goal {
        Goal {
            id: self.id,
            skill_name: self.skill_name,
            resource_type: self.resource_type,
            platform: self
                .platform
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            status: self.status,
            hours: self.hours_spent,
            difficulty: Some(self.difficulty_rating.unwrap_or(DEFAULT_DIFFICULTY)),
            notes: self.notes.unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

/// Goal summary embedded in activity responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalDetailsRecord {
    pub id: DbId,
    pub skill_name: String,
    pub status: GoalStatus,
    #[serde(default)]
    pub platform: Option<String>,
}

/// An activity as returned by `GET/POST /activities/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub id: DbId,
    /// Owning goal id (the wire calls the foreign key `goal`).
    pub goal: DbId,
    #[serde(default)]
    pub goal_details: Option<GoalDetailsRecord>,
    pub performed_on: NaiveDate,
    #[serde(default, deserialize_with = "de_decimal")]
    pub hours_spent: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl ActivityRecord {
    /// Map to the local entity shape.
    pub fn into_activity(self) -> Activity {
        Activity {
            id: self.id,
            goal_id: self.goal,
            goal: self.goal_details.map(|d| GoalSummary {
                id: d.id,
                skill_name: d.skill_name,
                status: d.status,
                platform: d.platform.unwrap_or_default(),
            }),
            performed_on: self.performed_on,
            hours: self.hours_spent,
            notes: self.notes.unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

/// Course metadata imported from a URL (`POST /course-import/`).
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub id: DbId,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// A goal line in the weekly digest.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentGoal {
    pub skill_name: String,
    pub status: GoalStatus,
    #[serde(default)]
    pub platform: String,
}

/// Weekly digest returned by `POST /learning-summary/send-weekly/`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklySummary {
    pub generated_at: Timestamp,
    pub goals_updated: u32,
    pub activities_logged: u32,
    #[serde(default, deserialize_with = "de_decimal")]
    pub hours_logged: f64,
    #[serde(default)]
    pub sent_to: String,
    #[serde(default)]
    pub email_requested: bool,
    #[serde(default)]
    pub recent_goals: Vec<RecentGoal>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Parse raw hours input: empty means zero, anything non-numeric is a
/// validation error (never NaN on the wire).
fn parse_hours(raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .ok_or_else(|| CoreError::Validation("Enter a valid number of hours.".to_string()))
}

/// Parse raw difficulty input: empty means [`FALLBACK_DIFFICULTY`].
fn parse_difficulty(raw: &str) -> Result<u8, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(FALLBACK_DIFFICULTY);
    }
    trimmed
        .parse::<u8>()
        .map_err(|_| CoreError::Validation("Enter a difficulty between 1 and 5.".to_string()))
}

/// Full goal payload for `POST /goals/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalPayload {
    pub skill_name: String,
    pub resource_type: ResourceType,
    pub platform: String,
    pub status: GoalStatus,
    pub hours_spent: f64,
    pub difficulty_rating: u8,
    pub notes: String,
}

impl GoalPayload {
    /// Build the create payload from form state, trimming text fields
    /// and applying the documented numeric defaults.
    pub fn from_draft(draft: &GoalDraft) -> Result<Self, CoreError> {
        Ok(Self {
            skill_name: draft.skill_name.trim().to_string(),
            resource_type: draft.resource_type,
            platform: draft.platform.clone(),
            status: draft.status,
            hours_spent: parse_hours(&draft.hours)?,
            difficulty_rating: parse_difficulty(&draft.difficulty)?,
            notes: draft.notes.trim().to_string(),
        })
    }
}

/// Field-scoped partial payload for `PATCH /goals/{id}/`.
///
/// Only fields present in the pending-edit snapshot are serialized.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_spent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GoalPatch {
    /// Map a pending-edit snapshot to wire field names, with the same
    /// trimming and defaulting rules as creation (cleared hours persist
    /// as 0, cleared difficulty as [`FALLBACK_DIFFICULTY`]).
    pub fn from_changes(changes: &GoalChanges) -> Self {
        Self {
            skill_name: changes.skill_name.as_ref().map(|s| s.trim().to_string()),
            resource_type: changes.resource_type,
            platform: changes.platform.clone(),
            status: changes.status,
            hours_spent: changes.hours.map(|h| h.unwrap_or(0.0)),
            difficulty_rating: changes
                .difficulty
                .map(|d| d.unwrap_or(FALLBACK_DIFFICULTY)),
            notes: changes.notes.as_ref().map(|s| s.trim().to_string()),
        }
    }
}

/// Activity payload for `POST /activities/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityPayload {
    /// Owning goal id (the wire calls the foreign key `goal`).
    pub goal: DbId,
    pub performed_on: NaiveDate,
    pub hours_spent: f64,
    pub notes: String,
}

impl ActivityPayload {
    /// Build the create payload from form state.  Fails locally when no
    /// goal is selected or the hours text is not numeric; no network
    /// call happens in either case.
    pub fn from_draft(draft: &ActivityDraft) -> Result<Self, CoreError> {
        let goal = draft.goal_id.ok_or_else(|| {
            CoreError::Validation("Select a goal before logging an activity.".to_string())
        })?;
        Ok(Self {
            goal,
            performed_on: draft.performed_on,
            hours_spent: parse_hours(&draft.hours)?,
            notes: draft.notes.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillstack_core::goal::GoalEdit;

    #[test]
    fn test_goal_record_tolerates_decimal_strings() {
        let record: GoalRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "skill_name": "React",
            "resource_type": "video",
            "platform": "Udemy",
            "status": "started",
            "hours_spent": "12.50",
            "difficulty_rating": 4,
            "notes": null,
            "created_at": "2025-06-01T10:00:00Z"
        }))
        .unwrap();

        let goal = record.into_goal();
        assert_eq!(goal.hours, Some(12.5));
        assert_eq!(goal.difficulty, Some(4));
        assert_eq!(goal.notes, "");
    }

    #[test]
    fn test_goal_record_null_fields_map_to_defaults() {
        let record: GoalRecord = serde_json::from_value(serde_json::json!({
            "id": 2,
            "skill_name": "SQL",
            "resource_type": "course",
            "platform": null,
            "status": "in_progress",
            "hours_spent": null,
            "difficulty_rating": null,
            "created_at": "2025-06-01T10:00:00Z"
        }))
        .unwrap();

        let goal = record.into_goal();
        assert_eq!(goal.platform, DEFAULT_PLATFORM);
        assert_eq!(goal.hours, None);
        assert_eq!(goal.difficulty, Some(DEFAULT_DIFFICULTY));
    }

    #[test]
    fn test_create_payload_applies_documented_defaults() {
        // Skill "React", default type/platform/status, empty hours,
        // difficulty "3" -> the exact documented wire payload.
        let draft = GoalDraft {
            skill_name: "React".to_string(),
            ..GoalDraft::default()
        };
        let payload = GoalPayload::from_draft(&draft).unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "skill_name": "React",
                "resource_type": "video",
                "platform": "Udemy",
                "status": "started",
                "hours_spent": 0.0,
                "difficulty_rating": 3,
                "notes": ""
            })
        );
    }

    #[test]
    fn test_create_payload_rejects_non_numeric_hours() {
        let draft = GoalDraft {
            skill_name: "React".to_string(),
            hours: "abc".to_string(),
            ..GoalDraft::default()
        };
        assert!(GoalPayload::from_draft(&draft).is_err());
    }

    #[test]
    fn test_patch_serializes_only_pending_fields() {
        let mut changes = GoalChanges::default();
        changes.record(GoalEdit::Hours(Some(8.0)));

        let patch = GoalPatch::from_changes(&changes);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "hours_spent": 8.0 }));
    }

    #[test]
    fn test_patch_defaults_cleared_numeric_inputs() {
        let mut changes = GoalChanges::default();
        changes.record(GoalEdit::Hours(None));
        changes.record(GoalEdit::Difficulty(None));
        changes.record(GoalEdit::Notes("  trimmed  ".to_string()));

        let patch = GoalPatch::from_changes(&changes);
        assert_eq!(patch.hours_spent, Some(0.0));
        assert_eq!(patch.difficulty_rating, Some(FALLBACK_DIFFICULTY));
        assert_eq!(patch.notes.as_deref(), Some("trimmed"));
    }

    #[test]
    fn test_server_to_local_to_patch_round_trip() {
        // Identity fields survive the record -> local -> patch trip,
        // numeric fields survive coercion.
        let record: GoalRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "skill_name": "Rust",
            "resource_type": "article",
            "platform": "YouTube",
            "status": "completed",
            "hours_spent": "7.00",
            "difficulty_rating": "5",
            "notes": "deep dive",
            "created_at": "2025-06-01T10:00:00Z"
        }))
        .unwrap();
        let goal = record.into_goal();

        let mut changes = GoalChanges::default();
        changes.record(GoalEdit::Status(goal.status));
        changes.record(GoalEdit::ResourceType(goal.resource_type));
        changes.record(GoalEdit::Platform(goal.platform.clone()));
        changes.record(GoalEdit::Hours(goal.hours));
        changes.record(GoalEdit::Difficulty(goal.difficulty));

        let json = serde_json::to_value(GoalPatch::from_changes(&changes)).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["resource_type"], "article");
        assert_eq!(json["platform"], "YouTube");
        assert_eq!(json["hours_spent"], 7.0);
        assert_eq!(json["difficulty_rating"], 5);
    }

    #[test]
    fn test_activity_payload_requires_goal_and_numeric_hours() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let draft = ActivityDraft::for_date(date);
        assert!(ActivityPayload::from_draft(&draft).is_err());

        let mut draft = ActivityDraft::for_date(date);
        draft.goal_id = Some(1);
        draft.hours = "abc".to_string();
        assert!(ActivityPayload::from_draft(&draft).is_err());

        let mut draft = ActivityDraft::for_date(date);
        draft.goal_id = Some(1);
        draft.hours = String::new();
        draft.notes = "  note  ".to_string();
        let payload = ActivityPayload::from_draft(&draft).unwrap();
        assert_eq!(payload.hours_spent, 0.0);
        assert_eq!(payload.notes, "note");
    }

    #[test]
    fn test_activity_record_embeds_goal_summary() {
        let record: ActivityRecord = serde_json::from_value(serde_json::json!({
            "id": 10,
            "goal": 3,
            "goal_details": {
                "id": 3,
                "skill_name": "Rust",
                "status": "in_progress",
                "platform": "YouTube"
            },
            "performed_on": "2025-06-01",
            "hours_spent": "1.50",
            "notes": "ownership chapter",
            "created_at": "2025-06-01T18:00:00Z"
        }))
        .unwrap();

        let activity = record.into_activity();
        assert_eq!(activity.goal_id, 3);
        assert_eq!(activity.hours, 1.5);
        let summary = activity.goal.unwrap();
        assert_eq!(summary.skill_name, "Rust");
        assert_eq!(summary.platform, "YouTube");
    }
}
