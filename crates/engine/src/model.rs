use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The four standard precedence relationship types used in project scheduling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RelationshipType {
    /// Successor starts after predecessor finishes (most common).
    #[default]
    #[serde(alias = "FS")]
    FinishToStart,
    /// Successor finishes after predecessor finishes.
    #[serde(alias = "FF")]
    FinishToFinish,
    /// Successor starts after predecessor starts.
    #[serde(alias = "SS")]
    StartToStart,
    /// Successor finishes after predecessor starts.
    #[serde(alias = "SF")]
    StartToFinish,
}

impl RelationshipType {
    /// Numeric link type code used by MS Project interchange files.
    pub fn ms_project_code(self) -> u8 {
        match self {
            RelationshipType::FinishToFinish => 0,
            RelationshipType::FinishToStart => 1,
            RelationshipType::StartToStart => 2,
            RelationshipType::StartToFinish => 3,
        }
    }

    /// Short code used by Primavera XER files.
    pub fn xer_code(self) -> &'static str {
        match self {
            RelationshipType::FinishToStart => "PR_FS",
            RelationshipType::FinishToFinish => "PR_FF",
            RelationshipType::StartToStart => "PR_SS",
            RelationshipType::StartToFinish => "PR_SF",
        }
    }
}

/// Discriminant of a [`ScheduleChange`], used for counting and reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Delay,
    Acceleration,
    ResourceChange,
    ScopeChange,
    Add,
    Delete,
}

/// `date + days`, or `None` when the result leaves chrono's date range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

// ---------------------------------------------------------------------------
// Activities and relationships
// ---------------------------------------------------------------------------

/// A unit of scheduled work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    /// Stable reference used by interchange formats and change targeting.
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub wbs_code: String,

    pub start_date: Option<NaiveDate>,
    /// Whole days. Forced to 0 for milestones.
    pub duration: Option<u32>,

    // Derived, recomputed on every CPM pass.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub earliest_start: Option<NaiveDate>,
    #[serde(default)]
    pub earliest_finish: Option<NaiveDate>,
    #[serde(default)]
    pub latest_start: Option<NaiveDate>,
    #[serde(default)]
    pub latest_finish: Option<NaiveDate>,
    #[serde(default)]
    pub total_float: u32,
    #[serde(default)]
    pub is_critical: bool,

    #[serde(default)]
    pub percent_complete: u8,
    #[serde(default)]
    pub milestone: bool,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modification_reason: Option<String>,
    #[serde(default)]
    pub impact_days: i64,
}

impl Activity {
    pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
        let external_id = external_id.into();
        Activity {
            id: external_id.clone(),
            external_id,
            name: name.into(),
            description: String::new(),
            wbs_code: String::new(),
            start_date: None,
            duration: None,
            end_date: None,
            earliest_start: None,
            earliest_finish: None,
            latest_start: None,
            latest_finish: None,
            total_float: 0,
            is_critical: false,
            percent_complete: 0,
            milestone: false,
            resources: Vec::new(),
            last_modified: None,
            modification_reason: None,
            impact_days: 0,
        }
    }

    /// Builder-style helper that sets start date and duration together.
    pub fn scheduled(mut self, start: NaiveDate, duration: u32) -> Self {
        self.start_date = Some(start);
        self.duration = Some(duration);
        self.normalize();
        self
    }

    /// Effective duration: milestones always take zero days.
    pub fn effective_duration(&self) -> Option<u32> {
        if self.milestone {
            Some(0)
        } else {
            self.duration
        }
    }

    /// Re-establish the model invariants: milestones have zero duration,
    /// percent complete stays within 0..=100 and `end_date` is
    /// `start_date + duration`.
    pub fn normalize(&mut self) {
        if self.milestone {
            self.duration = Some(0);
        }
        self.percent_complete = self.percent_complete.min(100);
        self.end_date = match (self.start_date, self.effective_duration()) {
            (Some(start), Some(dur)) => add_days(start, dur as i64),
            _ => None,
        };
    }

    /// Replace the resource list, dropping duplicates but keeping first-seen order.
    pub fn set_resources<I, S>(&mut self, resources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.clear();
        for r in resources {
            let r = r.into();
            if !self.resources.contains(&r) {
                self.resources.push(r);
            }
        }
    }

    /// Lower-cased `name + description`, the text triggers are matched against.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description).to_lowercase()
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.iter().any(|r| r == name)
    }
}

/// A precedence edge between two activities, referenced by external id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub predecessor_id: String,
    pub successor_id: String,
    #[serde(rename = "type", default)]
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub lag: i64,
}

impl Relationship {
    pub fn finish_to_start(pred: impl Into<String>, succ: impl Into<String>) -> Self {
        Relationship {
            predecessor_id: pred.into(),
            successor_id: succ.into(),
            relationship_type: RelationshipType::FinishToStart,
            lag: 0,
        }
    }

    pub fn touches(&self, external_id: &str) -> bool {
        self.predecessor_id == external_id || self.successor_id == external_id
    }
}

// ---------------------------------------------------------------------------
// Schedule aggregate
// ---------------------------------------------------------------------------

/// A project schedule: activities, the precedence graph between them and the
/// project-level values derived by the CPM scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub project_id: String,
    pub name: String,
    /// Schedule anchor date.
    pub start_date: NaiveDate,
    /// Max of all `earliest_finish`. Derived.
    #[serde(default)]
    pub project_finish: Option<NaiveDate>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// External ids of critical activities, in activity order. Derived.
    #[serde(default)]
    pub critical_path: Vec<String>,
}

impl Schedule {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>, start: NaiveDate) -> Self {
        Schedule {
            project_id: project_id.into(),
            name: name.into(),
            start_date: start,
            project_finish: None,
            activities: Vec::new(),
            relationships: Vec::new(),
            critical_path: Vec::new(),
        }
    }

    pub fn activity(&self, external_id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.external_id == external_id)
    }

    pub fn activity_mut(&mut self, external_id: &str) -> Option<&mut Activity> {
        self.activities
            .iter_mut()
            .find(|a| a.external_id == external_id)
    }

    /// Remove an activity together with every relationship that touches it.
    /// Returns the removed activity, if any.
    pub fn remove_activity(&mut self, external_id: &str) -> Option<Activity> {
        let pos = self
            .activities
            .iter()
            .position(|a| a.external_id == external_id)?;
        self.relationships.retain(|r| !r.touches(external_id));
        Some(self.activities.remove(pos))
    }

    pub fn critical_activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| a.is_critical)
    }
}

// ---------------------------------------------------------------------------
// Schedule changes
// ---------------------------------------------------------------------------

/// The edit carried by a [`ScheduleChange`]. The variant is the change type;
/// `old_value`/`new_value` are typed to match it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "changeType", rename_all = "snake_case")]
pub enum ChangeEdit {
    /// Move the activity's end date; start follows so duration is kept.
    #[serde(rename_all = "camelCase")]
    Delay {
        old_value: Option<NaiveDate>,
        new_value: NaiveDate,
    },
    /// Change the duration in days; end follows from the current start.
    #[serde(rename_all = "camelCase")]
    Acceleration { old_value: u32, new_value: u32 },
    #[serde(rename_all = "camelCase")]
    ResourceChange {
        old_value: Vec<String>,
        new_value: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    ScopeChange { old_value: String, new_value: String },
    #[serde(rename_all = "camelCase")]
    Add { new_value: Box<Activity> },
    Delete,
}

impl ChangeEdit {
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeEdit::Delay { .. } => ChangeType::Delay,
            ChangeEdit::Acceleration { .. } => ChangeType::Acceleration,
            ChangeEdit::ResourceChange { .. } => ChangeType::ResourceChange,
            ChangeEdit::ScopeChange { .. } => ChangeType::ScopeChange,
            ChangeEdit::Add { .. } => ChangeType::Add,
            ChangeEdit::Delete => ChangeType::Delete,
        }
    }
}

/// A single proposed or applied edit to one activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleChange {
    /// Target activity's external id.
    pub activity_id: String,
    #[serde(flatten)]
    pub edit: ChangeEdit,
    pub reason: String,
    pub impact_days: i64,
    /// Whether the target was critical before the change was applied.
    #[serde(default)]
    pub affects_critical_path: bool,
    #[serde(default)]
    pub source_reference: Option<String>,
}

impl ScheduleChange {
    pub fn change_type(&self) -> ChangeType {
        self.edit.change_type()
    }
}

// ---------------------------------------------------------------------------
// Persisted timing record
// ---------------------------------------------------------------------------

/// The per-activity fields written back to storage after a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTiming {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub earliest_start: Option<NaiveDate>,
    pub earliest_finish: Option<NaiveDate>,
    pub latest_start: Option<NaiveDate>,
    pub latest_finish: Option<NaiveDate>,
    pub total_float: u32,
    pub is_critical: bool,
    pub description: String,
    pub resources: Vec<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub modification_reason: Option<String>,
    pub impact_days: i64,
}

impl From<&Activity> for ActivityTiming {
    fn from(a: &Activity) -> Self {
        ActivityTiming {
            start_date: a.start_date,
            end_date: a.end_date,
            duration: a.duration,
            earliest_start: a.earliest_start,
            earliest_finish: a.earliest_finish,
            latest_start: a.latest_start,
            latest_finish: a.latest_finish,
            total_float: a.total_float,
            is_critical: a.is_critical,
            description: a.description.clone(),
            resources: a.resources.clone(),
            last_modified: a.last_modified,
            modification_reason: a.modification_reason.clone(),
            impact_days: a.impact_days,
        }
    }
}

impl ActivityTiming {
    /// Copy the persisted fields onto an activity.
    pub fn apply_to(&self, a: &mut Activity) {
        a.start_date = self.start_date;
        a.end_date = self.end_date;
        a.duration = self.duration;
        a.earliest_start = self.earliest_start;
        a.earliest_finish = self.earliest_finish;
        a.latest_start = self.latest_start;
        a.latest_finish = self.latest_finish;
        a.total_float = self.total_float;
        a.is_critical = self.is_critical;
        a.description = self.description.clone();
        a.resources = self.resources.clone();
        a.last_modified = self.last_modified;
        a.modification_reason = self.modification_reason.clone();
        a.impact_days = self.impact_days;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_end_date_follows_start_and_duration() {
        let a = Activity::new("A1", "Foundation").scheduled(date("2024-12-01"), 14);
        assert_eq!(a.end_date, Some(date("2024-12-15")));
    }

    #[test]
    fn test_milestone_forces_zero_duration() {
        let mut a = Activity::new("M1", "Handover");
        a.milestone = true;
        a.start_date = Some(date("2025-03-01"));
        a.duration = Some(5);
        a.normalize();
        assert_eq!(a.duration, Some(0));
        assert_eq!(a.end_date, a.start_date);
    }

    #[test]
    fn test_out_of_range_end_date_is_none() {
        assert_eq!(add_days(date("2024-12-01"), -1), Some(date("2024-11-30")));
        assert_eq!(add_days(date("2024-12-01"), 200_000_000), None);
        assert_eq!(add_days(date("2024-12-01"), i64::MAX), None);

        let a = Activity::new("A1", "Foundation").scheduled(date("2024-12-01"), u32::MAX);
        assert_eq!(a.end_date, None);
    }

    #[test]
    fn test_set_resources_dedups_in_order() {
        let mut a = Activity::new("A1", "Pour slab");
        a.set_resources(["Crane-1", "Pump", "Crane-1", "Crew"]);
        assert_eq!(a.resources, vec!["Crane-1", "Pump", "Crew"]);
    }

    #[test]
    fn test_remove_activity_drops_relationships() {
        let mut s = Schedule::new("p1", "Test", date("2024-12-01"));
        s.activities.push(Activity::new("A", "a"));
        s.activities.push(Activity::new("B", "b"));
        s.activities.push(Activity::new("C", "c"));
        s.relationships.push(Relationship::finish_to_start("A", "B"));
        s.relationships.push(Relationship::finish_to_start("B", "C"));
        s.relationships.push(Relationship::finish_to_start("A", "C"));

        let removed = s.remove_activity("B").unwrap();
        assert_eq!(removed.external_id, "B");
        assert_eq!(s.activities.len(), 2);
        assert_eq!(s.relationships, vec![Relationship::finish_to_start("A", "C")]);
    }

    #[test]
    fn test_change_json_shape() {
        let change = ScheduleChange {
            activity_id: "A1".to_string(),
            edit: ChangeEdit::Acceleration {
                old_value: 20,
                new_value: 16,
            },
            reason: "Risk RN-1".to_string(),
            impact_days: -4,
            affects_critical_path: true,
            source_reference: Some("RN-1".to_string()),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["changeType"], "acceleration");
        assert_eq!(json["oldValue"], 20);
        assert_eq!(json["newValue"], 16);
        assert_eq!(json["impactDays"], -4);

        let back: ScheduleChange = serde_json::from_value(json).unwrap();
        assert_eq!(back, change);
    }

    #[test]
    fn test_relationship_type_accepts_short_codes() {
        let r: Relationship = serde_json::from_str(
            r#"{"predecessorId":"A","successorId":"B","type":"SS","lag":2}"#,
        )
        .unwrap();
        assert_eq!(r.relationship_type, RelationshipType::StartToStart);
        assert_eq!(r.relationship_type.ms_project_code(), 2);
    }
}
