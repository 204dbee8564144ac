//! Learning goals and the field-edit vocabulary used by the sync store.
//!
//! A [`Goal`] is the locally-cached shape of a server goal record.  User
//! edits arrive one field at a time as [`GoalEdit`] values and accumulate
//! in a [`GoalChanges`] set until the sync store persists them.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Platform choices offered by the dashboard.  The platform field is
/// free text on the wire; these seed the platform group-by and the form
/// select.
pub const PLATFORM_OPTIONS: &[&str] = &["Udemy", "YouTube", "Coursera", "Other"];

/// Platform assumed when the server record omits one.
pub const DEFAULT_PLATFORM: &str = "Other";

/// Difficulty assumed locally when the server record has none.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// Difficulty written to the wire when the user has cleared the input.
pub const FALLBACK_DIFFICULTY: u8 = 1;

/// Kind of learning resource a goal tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Video,
    Course,
    Article,
    Other,
}

impl ResourceType {
    /// All variants, in dashboard display order.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Video,
        ResourceType::Course,
        ResourceType::Article,
        ResourceType::Other,
    ];

    /// Wire value (`snake_case`, matches the serde encoding).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Video => "video",
            ResourceType::Course => "course",
            ResourceType::Article => "article",
            ResourceType::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Video => "Video",
            ResourceType::Course => "Course",
            ResourceType::Article => "Article",
            ResourceType::Other => "Other",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress status of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Started,
    InProgress,
    Completed,
}

impl GoalStatus {
    /// All variants, in dashboard display order.
    pub const ALL: [GoalStatus; 3] = [
        GoalStatus::Started,
        GoalStatus::InProgress,
        GoalStatus::Completed,
    ];

    /// Wire value (`snake_case`, matches the serde encoding).
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Started => "started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::Started => "Started",
            GoalStatus::InProgress => "In Progress",
            GoalStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locally-cached goal, mapped from a server record.
///
/// `hours` is `None` while the user has the input cleared; `difficulty`
/// is `None` in the same situation but maps from a `null` server value
/// to [`DEFAULT_DIFFICULTY`] on load.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: DbId,
    pub skill_name: String,
    pub resource_type: ResourceType,
    pub platform: String,
    pub status: GoalStatus,
    pub hours: Option<f64>,
    pub difficulty: Option<u8>,
    pub notes: String,
    pub created_at: Timestamp,
}

/// Form state for creating a goal.
///
/// Numeric fields hold the raw input text; coercion to wire numbers
/// (empty hours -> 0, empty difficulty -> 1) happens once, at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub skill_name: String,
    pub resource_type: ResourceType,
    pub platform: String,
    pub status: GoalStatus,
    pub hours: String,
    pub difficulty: String,
    pub notes: String,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self {
            skill_name: String::new(),
            resource_type: ResourceType::Video,
            platform: PLATFORM_OPTIONS[0].to_string(),
            status: GoalStatus::Started,
            hours: String::new(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            notes: String::new(),
        }
    }
}

/// A single field edit made by the user against an existing goal.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalEdit {
    SkillName(String),
    ResourceType(ResourceType),
    Platform(String),
    Status(GoalStatus),
    /// `None` means the user cleared the hours input.
    Hours(Option<f64>),
    /// `None` means the user cleared the difficulty input.
    Difficulty(Option<u8>),
    Notes(String),
}

impl GoalEdit {
    /// Apply this edit to a local goal (the optimistic half of an update).
    pub fn apply_to(&self, goal: &mut Goal) {
        match self {
            GoalEdit::SkillName(v) => goal.skill_name = v.clone(),
            GoalEdit::ResourceType(v) => goal.resource_type = *v,
            GoalEdit::Platform(v) => goal.platform = v.clone(),
            GoalEdit::Status(v) => goal.status = *v,
            GoalEdit::Hours(v) => goal.hours = *v,
            GoalEdit::Difficulty(v) => goal.difficulty = *v,
            GoalEdit::Notes(v) => goal.notes = v.clone(),
        }
    }
}

/// Accumulated not-yet-persisted field edits for one goal.
///
/// One optional slot per field, last writer wins per field.  A goal has
/// pending work exactly when `!is_empty()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    pub skill_name: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub platform: Option<String>,
    pub status: Option<GoalStatus>,
    pub hours: Option<Option<f64>>,
    pub difficulty: Option<Option<u8>>,
    pub notes: Option<String>,
}

impl GoalChanges {
    /// `true` when no field has a pending value.
    pub fn is_empty(&self) -> bool {
        self.skill_name.is_none()
            && self.resource_type.is_none()
            && self.platform.is_none()
            && self.status.is_none()
            && self.hours.is_none()
            && self.difficulty.is_none()
            && self.notes.is_none()
    }

    /// Record an edit, overwriting any earlier pending value for the
    /// same field.
    pub fn record(&mut self, edit: GoalEdit) {
        match edit {
            GoalEdit::SkillName(v) => self.skill_name = Some(v),
            GoalEdit::ResourceType(v) => self.resource_type = Some(v),
            GoalEdit::Platform(v) => self.platform = Some(v),
            GoalEdit::Status(v) => self.status = Some(v),
            GoalEdit::Hours(v) => self.hours = Some(v),
            GoalEdit::Difficulty(v) => self.difficulty = Some(v),
            GoalEdit::Notes(v) => self.notes = Some(v),
        }
    }

    /// Merge a failed persist snapshot back underneath this set.
    ///
    /// Fields already present here (edits made after the snapshot was
    /// taken) keep their newer values; only fields this set does not
    /// carry are restored from the snapshot.
    pub fn merge_under(&mut self, snapshot: GoalChanges) {
        if self.skill_name.is_none() {
            self.skill_name = snapshot.skill_name;
        }
        if self.resource_type.is_none() {
            self.resource_type = snapshot.resource_type;
        }
        if self.platform.is_none() {
            self.platform = snapshot.platform;
        }
        if self.status.is_none() {
            self.status = snapshot.status;
        }
        if self.hours.is_none() {
            self.hours = snapshot.hours;
        }
        if self.difficulty.is_none() {
            self.difficulty = snapshot.difficulty;
        }
        if self.notes.is_none() {
            self.notes = snapshot.notes;
        }
    }
}
