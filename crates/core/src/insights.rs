//! Client-side aggregates derived from the fetched goal and activity lists.
//!
//! These mirror the dashboard's "Skill Growth Insights" panel and the
//! activity timeline: simple sums, percentages, and group-bys over data
//! that is already in memory.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::activity::Activity;
use crate::goal::{Goal, GoalStatus, ResourceType, DEFAULT_PLATFORM, PLATFORM_OPTIONS};

/// Aggregate statistics over the current goal list.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalInsights {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub started: usize,
    /// Sum of hours across goals, rounded to one decimal.
    pub total_hours: f64,
    /// Mean difficulty across goals, rounded to one decimal.
    pub average_difficulty: f64,
    /// Completed goals as an integer percentage of the total.
    pub completion_rate: u32,
    /// Goal count per resource type; every known type is present.
    pub by_resource_type: HashMap<ResourceType, usize>,
    /// Goal count per platform; known platforms are pre-seeded at zero
    /// and goals without a platform count toward [`DEFAULT_PLATFORM`].
    pub by_platform: HashMap<String, usize>,
    /// Goal count per skill name; unnamed goals group under "Unnamed".
    pub by_skill: HashMap<String, usize>,
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl GoalInsights {
    /// Compute all aggregates in one pass over the goal list.
    pub fn compute(goals: &[Goal]) -> Self {
        let total = goals.len();

        let mut completed = 0;
        let mut in_progress = 0;
        let mut started = 0;
        let mut hours_sum = 0.0;
        let mut difficulty_sum = 0.0;

        let mut by_resource_type: HashMap<ResourceType, usize> =
            ResourceType::ALL.iter().map(|rt| (*rt, 0)).collect();
        let mut by_platform: HashMap<String, usize> = PLATFORM_OPTIONS
            .iter()
            .map(|p| (p.to_string(), 0))
            .collect();
        let mut by_skill: HashMap<String, usize> = HashMap::new();

        for goal in goals {
            match goal.status {
                GoalStatus::Completed => completed += 1,
                GoalStatus::InProgress => in_progress += 1,
                GoalStatus::Started => started += 1,
            }
            hours_sum += goal.hours.unwrap_or(0.0);
            difficulty_sum += goal.difficulty.unwrap_or(0) as f64;

            *by_resource_type.entry(goal.resource_type).or_insert(0) += 1;

            let platform = if goal.platform.is_empty() {
                DEFAULT_PLATFORM
            } else {
                goal.platform.as_str()
            };
            *by_platform.entry(platform.to_string()).or_insert(0) += 1;

            let skill = if goal.skill_name.is_empty() {
                "Unnamed"
            } else {
                goal.skill_name.as_str()
            };
            *by_skill.entry(skill.to_string()).or_insert(0) += 1;
        }

        let average_difficulty = if total == 0 {
            0.0
        } else {
            round1(difficulty_sum / total as f64)
        };
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            total,
            completed,
            in_progress,
            started,
            total_hours: round1(hours_sum),
            average_difficulty,
            completion_rate,
            by_resource_type,
            by_platform,
            by_skill,
        }
    }
}

/// Activities logged on one calendar date, newest session first.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineGroup {
    pub date: NaiveDate,
    pub items: Vec<Activity>,
}

/// Group activities by the date they were performed, newest date first;
/// within a date, newest created first.
pub fn timeline_groups(activities: &[Activity]) -> Vec<TimelineGroup> {
    let mut grouped: HashMap<NaiveDate, Vec<Activity>> = HashMap::new();
    for activity in activities {
        grouped
            .entry(activity.performed_on)
            .or_default()
            .push(activity.clone());
    }

    let mut groups: Vec<TimelineGroup> = grouped
        .into_iter()
        .map(|(date, mut items)| {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            TimelineGroup { date, items }
        })
        .collect();
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn goal(status: GoalStatus, hours: Option<f64>, difficulty: Option<u8>) -> Goal {
        Goal {
            id: 1,
            skill_name: "SQL".to_string(),
            resource_type: ResourceType::Course,
            platform: "Coursera".to_string(),
            status,
            hours,
            difficulty,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_list_yields_zeroes() {
        let insights = GoalInsights::compute(&[]);
        assert_eq!(insights.total, 0);
        assert_eq!(insights.total_hours, 0.0);
        assert_eq!(insights.average_difficulty, 0.0);
        assert_eq!(insights.completion_rate, 0);
        // Known options are still seeded.
        assert_eq!(insights.by_platform.get("Udemy"), Some(&0));
        assert_eq!(insights.by_resource_type.get(&ResourceType::Video), Some(&0));
    }

    #[test]
    fn test_sums_and_rates() {
        let goals = vec![
            goal(GoalStatus::Completed, Some(10.25), Some(4)),
            goal(GoalStatus::Started, Some(2.5), Some(3)),
            goal(GoalStatus::InProgress, None, None),
        ];
        let insights = GoalInsights::compute(&goals);
        assert_eq!(insights.total, 3);
        assert_eq!(insights.completed, 1);
        assert_eq!(insights.in_progress, 1);
        assert_eq!(insights.started, 1);
        assert_eq!(insights.total_hours, 12.8);
        // (4 + 3 + 0) / 3 = 2.333... -> 2.3
        assert_eq!(insights.average_difficulty, 2.3);
        assert_eq!(insights.completion_rate, 33);
        assert_eq!(insights.by_skill.get("SQL"), Some(&3));
    }

    #[test]
    fn test_missing_platform_counts_as_other() {
        let mut g = goal(GoalStatus::Started, None, None);
        g.platform = String::new();
        let insights = GoalInsights::compute(&[g]);
        assert_eq!(insights.by_platform.get(DEFAULT_PLATFORM), Some(&1));
    }

    fn activity(id: i64, date: NaiveDate, created_secs: i64) -> Activity {
        Activity {
            id,
            goal_id: 1,
            goal: None,
            performed_on: date,
            hours: 1.0,
            notes: String::new(),
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_timeline_orders_newest_first() {
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let activities = vec![
            activity(1, d1, 100),
            activity(2, d2, 200),
            activity(3, d2, 300),
        ];

        let groups = timeline_groups(&activities);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, d2);
        // Newest created first within the day.
        assert_eq!(groups[0].items[0].id, 3);
        assert_eq!(groups[0].items[1].id, 2);
        assert_eq!(groups[1].date, d1);
    }
}
