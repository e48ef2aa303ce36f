//! Translates triggers into proposed [`ScheduleChange`]s.
//!
//! Activity selection is heuristic substring matching of trigger terms against
//! activity names and descriptions. It sits behind [`ActivityMatcher`] so it
//! can be replaced without touching the trigger rules.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::model::{add_days, Activity, ChangeEdit, Schedule, ScheduleChange};
use crate::triggers::{
    ExternalDelay, ResourceChange, ResourceChangeKind, RiskNotice, Trigger, TriggerBundle,
    Variation, VariationCategory,
};

// ---------------------------------------------------------------------------
// Pluggable policies
// ---------------------------------------------------------------------------

/// Decides whether an activity is affected by a trigger.
pub trait ActivityMatcher: Send + Sync {
    /// `terms` are the trigger's keywords and work areas; `activity_text` is
    /// the activity's lower-cased name and description.
    fn is_affected(&self, terms: &[String], activity_text: &str) -> bool;
}

/// Default matcher: any non-empty term appearing as a case-insensitive
/// substring of the activity text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl ActivityMatcher for KeywordMatcher {
    fn is_affected(&self, terms: &[String], activity_text: &str) -> bool {
        terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .any(|t| activity_text.contains(&t))
    }
}

/// Estimates the schedule impact of a variation, in days.
pub trait ImpactEstimator: Send + Sync {
    fn estimate_days(&self, variation: &Variation) -> i64;
}

/// One day of impact per `value_per_day` of estimated value, rounded up,
/// never less than one day.
#[derive(Debug, Clone, Copy)]
pub struct ProportionalImpact {
    pub value_per_day: f64,
}

impl ImpactEstimator for ProportionalImpact {
    fn estimate_days(&self, variation: &Variation) -> i64 {
        if self.value_per_day <= 0.0 || variation.estimated_value <= 0.0 {
            return 1;
        }
        ((variation.estimated_value / self.value_per_day).ceil() as i64).max(1)
    }
}

// ---------------------------------------------------------------------------
// Risk classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Accelerate,
    AddResources,
    Monitor,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RiskAssessment {
    pub urgency: Urgency,
    pub action: RecommendedAction,
}

const CRITICAL_TERMS: &[&str] = &["critical", "urgent", "severe"];
const HIGH_TERMS: &[&str] = &["high", "major", "significant"];
const DELAY_TERMS: &[&str] = &["delay", "late", "behind", "slippage"];
const RESOURCE_TERMS: &[&str] = &["resource", "shortage", "labour", "labor", "equipment"];

const COMPLIANCE_RESOURCES: &[&str] = &["Compliance Officer", "Regulatory Inspector"];

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Classify a risk notice by keyword presence in its title and description.
pub fn assess_risk(notice: &RiskNotice) -> RiskAssessment {
    let text = format!("{} {}", notice.title, notice.description).to_lowercase();

    let urgency = if contains_any(&text, CRITICAL_TERMS) {
        Urgency::Critical
    } else if contains_any(&text, HIGH_TERMS) {
        Urgency::High
    } else {
        Urgency::Normal
    };

    let action = if contains_any(&text, DELAY_TERMS) {
        RecommendedAction::Accelerate
    } else if contains_any(&text, RESOURCE_TERMS) {
        RecommendedAction::AddResources
    } else {
        RecommendedAction::Monitor
    };

    RiskAssessment { urgency, action }
}

/// Resource set added for a risk, chosen by its category keywords.
fn mitigation_resources(notice: &RiskNotice) -> &'static [&'static str] {
    let text = format!("{} {}", notice.title, notice.description).to_lowercase();
    if contains_any(&text, &["weather", "rain", "storm", "flood"]) {
        &["Weather Protection", "Site Supervisor"]
    } else if contains_any(&text, &["quality", "defect"]) {
        &["Quality Inspector", "Testing Equipment"]
    } else if contains_any(&text, &["safety", "hazard", "injury"]) {
        &["Safety Officer", "PPE"]
    } else if contains_any(&text, &["delivery", "supply", "supplier"]) {
        &["Logistics Coordinator", "Alternate Supplier"]
    } else {
        &["Additional Labour"]
    }
}

// ---------------------------------------------------------------------------
// Change builders
// ---------------------------------------------------------------------------

fn change(
    activity: &Activity,
    edit: ChangeEdit,
    reason: String,
    impact_days: i64,
    source: &str,
) -> ScheduleChange {
    ScheduleChange {
        activity_id: activity.external_id.clone(),
        edit,
        reason,
        impact_days,
        affects_critical_path: activity.is_critical,
        source_reference: (!source.is_empty()).then(|| source.to_string()),
    }
}

fn current_end(activity: &Activity) -> Option<chrono::NaiveDate> {
    add_days(activity.start_date?, activity.effective_duration()? as i64)
}

fn delay_change(activity: &Activity, days: i64, reason: String, source: &str) -> Option<ScheduleChange> {
    if days <= 0 {
        return None;
    }
    let Some(old_end) = current_end(activity) else {
        debug!(activity = %activity.external_id, "no start date or duration, delay not proposed");
        return None;
    };
    let Some(new_end) = add_days(old_end, days) else {
        warn!(
            activity = %activity.external_id,
            days,
            "delayed end date out of range, delay not proposed"
        );
        return None;
    };
    let edit = ChangeEdit::Delay {
        old_value: Some(old_end),
        new_value: new_end,
    };
    Some(change(activity, edit, reason, days, source))
}

fn acceleration_change(
    activity: &Activity,
    fraction: f64,
    reason: String,
    source: &str,
) -> Option<ScheduleChange> {
    let old = activity.effective_duration()?;
    let new = (old as f64 * (1.0 - fraction)).round().max(0.0) as u32;
    if new == old {
        return None;
    }
    let edit = ChangeEdit::Acceleration {
        old_value: old,
        new_value: new,
    };
    Some(change(activity, edit, reason, new as i64 - old as i64, source))
}

fn add_resources_change(
    activity: &Activity,
    extra: &[&str],
    reason: String,
    source: &str,
) -> Option<ScheduleChange> {
    let mut new_value = activity.resources.clone();
    for r in extra {
        if !new_value.iter().any(|x| x == r) {
            new_value.push(r.to_string());
        }
    }
    if new_value == activity.resources {
        return None;
    }
    let edit = ChangeEdit::ResourceChange {
        old_value: activity.resources.clone(),
        new_value,
    };
    Some(change(activity, edit, reason, 0, source))
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

pub struct TriggerAnalyzer {
    config: AnalyzerConfig,
    matcher: Box<dyn ActivityMatcher>,
    estimator: Box<dyn ImpactEstimator>,
}

impl TriggerAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let estimator = ProportionalImpact {
            value_per_day: config.value_per_impact_day,
        };
        TriggerAnalyzer {
            config,
            matcher: Box::new(KeywordMatcher),
            estimator: Box::new(estimator),
        }
    }

    pub fn with_matcher(mut self, matcher: impl ActivityMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_estimator(mut self, estimator: impl ImpactEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// Produce changes for every trigger in the bundle, in bundle order.
    pub fn analyze(&self, schedule: &Schedule, bundle: &TriggerBundle) -> Vec<ScheduleChange> {
        let mut changes = Vec::new();
        for trigger in bundle.triggers() {
            let produced = self.analyze_trigger(schedule, &trigger);
            debug!(
                trigger = trigger.reference(),
                changes = produced.len(),
                "trigger analyzed"
            );
            changes.extend(produced);
        }
        changes
    }

    pub fn analyze_trigger(&self, schedule: &Schedule, trigger: &Trigger) -> Vec<ScheduleChange> {
        match trigger {
            Trigger::Variation(v) => self.variation_changes(schedule, v),
            Trigger::RiskNotice(r) => self.risk_changes(schedule, r),
            Trigger::ResourceChange(r) => self.resource_changes(schedule, r),
            Trigger::ExternalDelay(d) => self.external_delay_changes(schedule, d),
        }
    }

    /// Vocabulary terms that occur in `text`.
    fn vocabulary_terms(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        self.config
            .work_area_vocabulary
            .iter()
            .filter(|term| text.contains(term.to_lowercase().as_str()))
            .cloned()
            .collect()
    }

    fn affected<'a>(&self, schedule: &'a Schedule, terms: &[String]) -> Vec<&'a Activity> {
        if terms.is_empty() {
            return Vec::new();
        }
        schedule
            .activities
            .iter()
            .filter(|a| self.matcher.is_affected(terms, &a.search_text()))
            .collect()
    }

    pub fn variation_affects_schedule(&self, v: &Variation) -> bool {
        v.category != VariationCategory::Other
            || v.estimated_value > self.config.variation_value_threshold
    }

    fn variation_changes(&self, schedule: &Schedule, v: &Variation) -> Vec<ScheduleChange> {
        if !self.variation_affects_schedule(v) {
            debug!(variation = %v.reference, "variation has no schedule effect");
            return Vec::new();
        }
        let impact = self.estimator.estimate_days(v);

        let mut terms = v.work_areas.clone();
        for term in self.vocabulary_terms(&format!("{} {}", v.title, v.description)) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        let reason = format!("Variation {}: {}", v.reference, v.title);
        self.affected(schedule, &terms)
            .into_iter()
            .filter_map(|a| match v.category {
                VariationCategory::ScopeChange => {
                    let note = format!("[{}] {}", v.reference, v.title);
                    let new_value = if a.description.is_empty() {
                        note
                    } else {
                        format!("{}\n{}", a.description, note)
                    };
                    let edit = ChangeEdit::ScopeChange {
                        old_value: a.description.clone(),
                        new_value,
                    };
                    Some(change(a, edit, reason.clone(), impact, &v.reference))
                }
                VariationCategory::UnforeseenConditions | VariationCategory::Other => {
                    delay_change(a, impact, reason.clone(), &v.reference)
                }
                VariationCategory::ComplianceChange => {
                    add_resources_change(a, COMPLIANCE_RESOURCES, reason.clone(), &v.reference)
                }
            })
            .collect()
    }

    fn risk_changes(&self, schedule: &Schedule, notice: &RiskNotice) -> Vec<ScheduleChange> {
        let assessment = assess_risk(notice);
        if assessment.action == RecommendedAction::Monitor {
            debug!(risk = %notice.reference, "risk notice needs monitoring only");
            return Vec::new();
        }

        let mut terms = notice.affected_areas.clone();
        for term in self.vocabulary_terms(&format!("{} {}", notice.title, notice.description)) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        let urgency = match assessment.urgency {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Normal => "normal",
        };
        let reason = format!("Risk notice {} ({}): {}", notice.reference, urgency, notice.title);

        self.affected(schedule, &terms)
            .into_iter()
            .filter_map(|a| match assessment.action {
                RecommendedAction::Accelerate => acceleration_change(
                    a,
                    self.config.risk_acceleration_fraction,
                    reason.clone(),
                    &notice.reference,
                ),
                RecommendedAction::AddResources => add_resources_change(
                    a,
                    mitigation_resources(notice),
                    reason.clone(),
                    &notice.reference,
                ),
                RecommendedAction::Monitor => None,
            })
            .collect()
    }

    fn resource_changes(&self, schedule: &Schedule, rc: &ResourceChange) -> Vec<ScheduleChange> {
        let users = schedule
            .activities
            .iter()
            .filter(|a| a.has_resource(&rc.resource_name));

        match rc.change_type {
            ResourceChangeKind::Unavailable => {
                let reason = format!("Resource {} unavailable ({})", rc.resource_name, rc.reference);
                users
                    .filter_map(|a| delay_change(a, rc.delay_days, reason.clone(), &rc.reference))
                    .collect()
            }
            ResourceChangeKind::Upgrade => {
                let reason = format!("Resource {} upgraded ({})", rc.resource_name, rc.reference);
                users
                    .filter_map(|a| {
                        acceleration_change(
                            a,
                            self.config.upgrade_acceleration_fraction,
                            reason.clone(),
                            &rc.reference,
                        )
                    })
                    .collect()
            }
            ResourceChangeKind::Added => Vec::new(),
        }
    }

    fn external_delay_changes(&self, schedule: &Schedule, d: &ExternalDelay) -> Vec<ScheduleChange> {
        let terms: Vec<String> = d.keywords.iter().chain(&d.work_areas).cloned().collect();
        let reason = if d.description.is_empty() {
            format!("External delay {}", d.reference)
        } else {
            format!("External delay {}: {}", d.reference, d.description)
        };
        self.affected(schedule, &terms)
            .into_iter()
            .filter_map(|a| delay_change(a, d.delay_days, reason.clone(), &d.reference))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeType;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_activity(id: &str, name: &str, dur: u32, resources: &[&str]) -> Activity {
        let mut a = Activity::new(id, name).scheduled(date("2024-12-01"), dur);
        a.set_resources(resources.iter().copied());
        a
    }

    fn make_schedule(activities: Vec<Activity>) -> Schedule {
        let mut s = Schedule::new("p1", "Test", date("2024-12-01"));
        s.activities = activities;
        s
    }

    fn analyzer() -> TriggerAnalyzer {
        TriggerAnalyzer::new(AnalyzerConfig::default())
    }

    fn variation(category: VariationCategory, value: f64, title: &str) -> Variation {
        Variation {
            reference: "VAR-1".into(),
            title: title.into(),
            description: String::new(),
            category,
            estimated_value: value,
            work_areas: vec![],
        }
    }

    fn risk(title: &str, description: &str, areas: &[&str]) -> RiskNotice {
        RiskNotice {
            reference: "RN-1".into(),
            title: title.into(),
            description: description.into(),
            affected_areas: areas.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_external_delay_on_foundation() {
        let schedule = make_schedule(vec![make_activity("A1", "Foundation", 14, &[])]);
        let bundle = TriggerBundle {
            external_delays: vec![ExternalDelay {
                reference: "ED-1".into(),
                description: "Utility diversion".into(),
                delay_days: 10,
                keywords: vec!["foundation".into()],
                work_areas: vec![],
            }],
            ..Default::default()
        };
        let changes = analyzer().analyze(&schedule, &bundle);
        assert_eq!(changes.len(), 1);
        let c = &changes[0];
        assert_eq!(c.change_type(), ChangeType::Delay);
        assert_eq!(c.impact_days, 10);
        assert_eq!(
            c.edit,
            ChangeEdit::Delay {
                old_value: Some(date("2024-12-15")),
                new_value: date("2024-12-25"),
            }
        );
        assert_eq!(c.source_reference.as_deref(), Some("ED-1"));
    }

    #[test]
    fn test_risk_with_delay_language_accelerates() {
        let schedule = make_schedule(vec![make_activity("A1", "Concrete pour level 2", 20, &[])]);
        let notice = risk("Pour programme", "Expected delay to concrete works", &[]);
        assert_eq!(assess_risk(&notice).action, RecommendedAction::Accelerate);

        let changes = analyzer().analyze_trigger(&schedule, &Trigger::RiskNotice(notice));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].edit,
            ChangeEdit::Acceleration {
                old_value: 20,
                new_value: 16
            }
        );
        assert_eq!(changes[0].impact_days, -4);
    }

    #[test]
    fn test_risk_action_keywords() {
        let behind = risk("Steelwork running behind", "", &[]);
        assert_eq!(assess_risk(&behind).action, RecommendedAction::Accelerate);
        let late = risk("Late rebar", "", &[]);
        assert_eq!(assess_risk(&late).action, RecommendedAction::Accelerate);
        let plant = risk("Plant", "equipment breakdown", &[]);
        assert_eq!(assess_risk(&plant).action, RecommendedAction::AddResources);
        let manpower = risk("Manpower", "", &[]);
        assert_eq!(assess_risk(&manpower).action, RecommendedAction::Monitor);
        let immediate = risk("Immediate attention", "", &[]);
        assert_eq!(assess_risk(&immediate).urgency, Urgency::Normal);
    }

    #[test]
    fn test_out_of_range_delay_is_not_proposed() {
        let schedule = make_schedule(vec![make_activity("A1", "Foundation", 14, &[])]);
        let bundle = TriggerBundle {
            external_delays: vec![ExternalDelay {
                reference: "ED-9".into(),
                description: String::new(),
                delay_days: 200_000_000,
                keywords: vec!["foundation".into()],
                work_areas: vec![],
            }],
            variations: vec![variation(
                VariationCategory::UnforeseenConditions,
                1e13,
                "Foundation redesign",
            )],
            ..Default::default()
        };
        assert!(analyzer().analyze(&schedule, &bundle).is_empty());
    }

    #[test]
    fn test_risk_urgency_escalates_on_critical() {
        let notice = risk("Critical labour shortage", "", &[]);
        let assessment = assess_risk(&notice);
        assert_eq!(assessment.urgency, Urgency::Critical);
        assert_eq!(assessment.action, RecommendedAction::AddResources);

        let calm = risk("Minor note", "keep an eye on it", &[]);
        assert_eq!(assess_risk(&calm).urgency, Urgency::Normal);
        assert_eq!(assess_risk(&calm).action, RecommendedAction::Monitor);
    }

    #[test]
    fn test_risk_add_resources_by_category() {
        let schedule = make_schedule(vec![make_activity("A1", "Roofing", 10, &["Crew A"])]);
        let notice = risk("Weather resource cover", "Storm season", &["roofing"]);
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::RiskNotice(notice));
        assert_eq!(changes.len(), 1);
        match &changes[0].edit {
            ChangeEdit::ResourceChange { old_value, new_value } => {
                assert_eq!(old_value, &vec!["Crew A".to_string()]);
                assert_eq!(new_value, &vec!["Crew A", "Weather Protection", "Site Supervisor"]);
            }
            other => panic!("unexpected edit {:?}", other),
        }
        assert_eq!(changes[0].impact_days, 0);
    }

    #[test]
    fn test_resource_unavailable_hits_only_users() {
        let schedule = make_schedule(vec![
            make_activity("A1", "Lift steel", 5, &["Crane-1"]),
            make_activity("A2", "Lift precast", 4, &["Crane-1", "Rigger"]),
            make_activity("A3", "Paint", 3, &["Painter"]),
        ]);
        let rc = ResourceChange {
            reference: "RC-1".into(),
            resource_name: "Crane-1".into(),
            change_type: ResourceChangeKind::Unavailable,
            delay_days: 5,
        };
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::ResourceChange(rc));
        let ids: Vec<&str> = changes.iter().map(|c| c.activity_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2"]);
        assert!(changes
            .iter()
            .all(|c| c.change_type() == ChangeType::Delay && c.impact_days == 5));
    }

    #[test]
    fn test_resource_upgrade_accelerates_ten_percent() {
        let schedule = make_schedule(vec![make_activity("A1", "Excavation", 30, &["Excavator"])]);
        let rc = ResourceChange {
            reference: "RC-2".into(),
            resource_name: "Excavator".into(),
            change_type: ResourceChangeKind::Upgrade,
            delay_days: 0,
        };
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::ResourceChange(rc));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].impact_days, -3);
    }

    #[test]
    fn test_variation_below_threshold_is_ignored() {
        let schedule = make_schedule(vec![make_activity("A1", "Foundation", 14, &[])]);
        let v = variation(VariationCategory::Other, 5_000.0, "Foundation tweak");
        assert!(analyzer()
            .analyze_trigger(&schedule, &Trigger::Variation(v))
            .is_empty());
    }

    #[test]
    fn test_variation_unforeseen_conditions_delays_by_value() {
        let schedule = make_schedule(vec![
            make_activity("A1", "Excavation zone B", 10, &[]),
            make_activity("A2", "Electrical first fix", 10, &[]),
        ]);
        let v = variation(
            VariationCategory::UnforeseenConditions,
            45_000.0,
            "Rock encountered during excavation",
        );
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::Variation(v));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].activity_id, "A1");
        assert_eq!(changes[0].change_type(), ChangeType::Delay);
        assert_eq!(changes[0].impact_days, 5);
        assert!(changes[0].reason.contains("VAR-1"));
    }

    #[test]
    fn test_variation_scope_and_compliance_mapping() {
        let schedule = make_schedule(vec![make_activity("A1", "Concrete slab", 10, &[])]);

        let scope = variation(VariationCategory::ScopeChange, 0.0, "Thicker concrete slab");
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::Variation(scope));
        assert_eq!(changes[0].change_type(), ChangeType::ScopeChange);

        let compliance = variation(VariationCategory::ComplianceChange, 0.0, "New concrete standard");
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::Variation(compliance));
        match &changes[0].edit {
            ChangeEdit::ResourceChange { new_value, .. } => {
                assert!(new_value.contains(&"Compliance Officer".to_string()))
            }
            other => panic!("unexpected edit {:?}", other),
        }
    }

    #[test]
    fn test_changes_follow_group_order() {
        let schedule = make_schedule(vec![make_activity("A1", "Foundation", 20, &["Crane-1"])]);
        let bundle = TriggerBundle {
            external_delays: vec![ExternalDelay {
                reference: "ED-1".into(),
                description: String::new(),
                delay_days: 2,
                keywords: vec!["foundation".into()],
                work_areas: vec![],
            }],
            resource_changes: vec![ResourceChange {
                reference: "RC-1".into(),
                resource_name: "Crane-1".into(),
                change_type: ResourceChangeKind::Unavailable,
                delay_days: 1,
            }],
            risk_notices: vec![risk("Delay risk", "", &["foundation"])],
            variations: vec![variation(
                VariationCategory::UnforeseenConditions,
                10_000.0,
                "Foundation soft spot",
            )],
        };
        let refs: Vec<String> = analyzer()
            .analyze(&schedule, &bundle)
            .into_iter()
            .filter_map(|c| c.source_reference)
            .collect();
        assert_eq!(refs, vec!["VAR-1", "RN-1", "RC-1", "ED-1"]);
    }

    struct ExactName;

    impl ActivityMatcher for ExactName {
        fn is_affected(&self, terms: &[String], activity_text: &str) -> bool {
            terms.iter().any(|t| activity_text.trim() == t.as_str())
        }
    }

    struct FlatImpact(i64);

    impl ImpactEstimator for FlatImpact {
        fn estimate_days(&self, _variation: &Variation) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_pluggable_matcher_and_estimator() {
        let mut a1 = make_activity("A1", "foundation", 10, &[]);
        a1.description.clear();
        let a2 = make_activity("A2", "foundation repairs", 10, &[]);
        let schedule = make_schedule(vec![a1, a2]);

        let analyzer = analyzer().with_matcher(ExactName).with_estimator(FlatImpact(7));
        let v = variation(VariationCategory::UnforeseenConditions, 1.0, "foundation");
        let changes = analyzer.analyze_trigger(&schedule, &Trigger::Variation(v));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].activity_id, "A1");
        assert_eq!(changes[0].impact_days, 7);
    }

    #[test]
    fn test_affects_critical_path_copied_from_activity() {
        let mut a = make_activity("A1", "Foundation", 14, &[]);
        a.is_critical = true;
        let schedule = make_schedule(vec![a]);
        let d = ExternalDelay {
            reference: "ED-1".into(),
            description: String::new(),
            delay_days: 1,
            keywords: vec!["FOUNDATION".into()],
            work_areas: vec![],
        };
        let changes = analyzer().analyze_trigger(&schedule, &Trigger::ExternalDelay(d));
        assert!(changes[0].affects_critical_path);
    }
}
