use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::CpmOptions;
use crate::model::Schedule;
use crate::solver::{self, SolveError};

// ---------------------------------------------------------------------------
// Validation result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validate implementation
// ---------------------------------------------------------------------------

/// Check whether a schedule is ready for automated change runs, returning
/// errors (a run would fail) and warnings (advisory). Errors are listed before
/// warnings.
pub fn validate(schedule: &Schedule, options: &CpmOptions) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if schedule.activities.is_empty() {
        errors.push("Schedule has no activities -- nothing to recompute or export".to_string());
        return ValidationResult { errors, warnings };
    }

    let ids: HashSet<&str> = schedule
        .activities
        .iter()
        .map(|a| a.external_id.as_str())
        .collect();

    // -----------------------------------------------------------------------
    // Error: duplicate activity IDs
    // -----------------------------------------------------------------------
    {
        let mut seen: HashMap<&str, bool> = HashMap::new();
        for a in &schedule.activities {
            if seen.insert(a.external_id.as_str(), true).is_some() {
                errors.push(format!(
                    "Duplicate activity ID '{}' -- changes could target the wrong activity",
                    a.external_id
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-activity errors
    // -----------------------------------------------------------------------
    for a in &schedule.activities {
        if a.start_date.is_none() {
            errors.push(format!("Activity '{}' has no start date", a.external_id));
        }
        if a.effective_duration().is_none() {
            errors.push(format!("Activity '{}' has no duration", a.external_id));
        }
    }

    for rel in &schedule.relationships {
        for end in [&rel.predecessor_id, &rel.successor_id] {
            if !ids.contains(end.as_str()) {
                errors.push(format!(
                    "Relationship '{}' -> '{}' references '{}' which doesn't exist",
                    rel.predecessor_id, rel.successor_id, end
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Error: circular dependencies
    // -----------------------------------------------------------------------
    if errors.is_empty() {
        if let Err(SolveError::CycleDetected { chain }) = solver::detect_cycle(schedule) {
            errors.push(format!(
                "Circular dependency: {} -- activities have a precedence cycle",
                chain.join(" -> ")
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Warnings
    // -----------------------------------------------------------------------
    if schedule.relationships.is_empty() {
        warnings.push(
            "No relationships found -- every activity is scheduled independently".to_string(),
        );
    }

    for a in &schedule.activities {
        if a.milestone && a.duration.unwrap_or(0) > 0 {
            warnings.push(format!(
                "Milestone '{}' has a duration -- it will be treated as 0 days",
                a.external_id
            ));
        }
        if a.percent_complete > 100 {
            warnings.push(format!(
                "Activity '{}' is {}% complete -- capped at 100",
                a.external_id, a.percent_complete
            ));
        }
    }

    if errors.is_empty() {
        if let Ok(solved) = solver::solve(schedule, options) {
            if solved.critical_path.is_empty() {
                warnings.push(
                    "No critical-path activities -- delays cannot be traced to the finish date"
                        .to_string(),
                );
            }
            for a in &solved.activities {
                if let (Some(ef), Some(lf)) = (a.earliest_finish, a.latest_finish) {
                    let overrun = (ef - lf).num_days();
                    if overrun > 0 {
                        warnings.push(format!(
                            "Activity '{}' finishes {} day(s) after its successors allow",
                            a.external_id, overrun
                        ));
                    }
                }
            }
        }
    }

    ValidationResult { errors, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activity, Relationship};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_schedule(activities: Vec<Activity>, rels: Vec<Relationship>) -> Schedule {
        let mut s = Schedule::new("p1", "Test", date("2024-12-01"));
        s.activities = activities;
        s.relationships = rels;
        s
    }

    #[test]
    fn test_empty_schedule_is_not_ready() {
        let result = validate(&make_schedule(vec![], vec![]), &CpmOptions::default());
        assert!(!result.is_ok());
        assert!(result.errors[0].contains("no activities"));
    }

    #[test]
    fn test_missing_dates_and_unknown_links() {
        let s = make_schedule(
            vec![
                Activity::new("A", "a").scheduled(date("2024-12-01"), 3),
                Activity::new("B", "b"),
            ],
            vec![Relationship::finish_to_start("A", "Z")],
        );
        let result = validate(&s, &CpmOptions::default());
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().any(|e| e.contains("'B' has no start date")));
        assert!(result.errors.iter().any(|e| e.contains("'Z' which doesn't exist")));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let s = make_schedule(
            vec![
                Activity::new("A", "a").scheduled(date("2024-12-01"), 1),
                Activity::new("B", "b").scheduled(date("2024-12-02"), 1),
            ],
            vec![
                Relationship::finish_to_start("A", "B"),
                Relationship::finish_to_start("B", "A"),
            ],
        );
        let result = validate(&s, &CpmOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Circular dependency"));
    }

    #[test]
    fn test_ready_schedule_warnings() {
        let s = make_schedule(
            vec![
                Activity::new("A", "a").scheduled(date("2024-12-01"), 10),
                Activity::new("B", "b").scheduled(date("2024-12-05"), 10),
            ],
            vec![Relationship::finish_to_start("A", "B")],
        );
        let result = validate(&s, &CpmOptions::default());
        assert!(result.is_ok());
        // A finishes 12-11 but B must start 12-05
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("'A' finishes 6 day(s) after")));
    }

    #[test]
    fn test_no_relationships_warning() {
        let s = make_schedule(
            vec![Activity::new("A", "a").scheduled(date("2024-12-01"), 10)],
            vec![],
        );
        let result = validate(&s, &CpmOptions::default());
        assert!(result.is_ok());
        assert!(result.warnings[0].starts_with("No relationships"));
    }
}
