use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{add_days, Activity, ChangeEdit, Schedule, ScheduleChange};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The change targets an activity that is not in the schedule.
    ChangeTargetMissing,
    /// An `add` change whose activity id is already present.
    DuplicateActivity,
    /// A delay whose dates fall outside the representable calendar.
    DateOutOfRange,
}

/// A change that was not applied, kept for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedChange {
    pub change: ScheduleChange,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub schedule: Schedule,
    pub applied: Vec<ScheduleChange>,
    pub skipped: Vec<SkippedChange>,
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply `changes` in order to a copy of `schedule`.
///
/// Later changes to the same activity overwrite earlier date and duration
/// edits. Missing targets are skipped, never fatal. `applied_at` stamps
/// `last_modified` on every touched activity.
pub fn apply_changes(
    schedule: &Schedule,
    changes: &[ScheduleChange],
    applied_at: DateTime<Utc>,
) -> ApplyOutcome {
    let mut working = schedule.clone();
    let mut applied = Vec::with_capacity(changes.len());
    let mut skipped = Vec::new();

    for change in changes {
        match apply_one(&mut working, change, applied_at) {
            Ok(()) => {
                debug!(
                    activity = %change.activity_id,
                    change_type = ?change.change_type(),
                    impact_days = change.impact_days,
                    "change applied"
                );
                applied.push(change.clone());
            }
            Err(reason) => {
                warn!(activity = %change.activity_id, ?reason, "change skipped");
                skipped.push(SkippedChange {
                    change: change.clone(),
                    reason,
                });
            }
        }
    }

    ApplyOutcome {
        schedule: working,
        applied,
        skipped,
    }
}

fn apply_one(
    schedule: &mut Schedule,
    change: &ScheduleChange,
    applied_at: DateTime<Utc>,
) -> Result<(), SkipReason> {
    match &change.edit {
        ChangeEdit::Add { new_value } => {
            if schedule.activity(&change.activity_id).is_some() {
                return Err(SkipReason::DuplicateActivity);
            }
            let mut activity = (**new_value).clone();
            activity.external_id = change.activity_id.clone();
            if activity.id.is_empty() {
                activity.id = change.activity_id.clone();
            }
            activity.normalize();
            stamp(&mut activity, change, applied_at);
            schedule.activities.push(activity);
            return Ok(());
        }
        ChangeEdit::Delete => {
            return schedule
                .remove_activity(&change.activity_id)
                .map(|_| ())
                .ok_or(SkipReason::ChangeTargetMissing);
        }
        _ => {}
    }

    let activity = schedule
        .activity_mut(&change.activity_id)
        .ok_or(SkipReason::ChangeTargetMissing)?;

    match &change.edit {
        ChangeEdit::Delay { new_value, .. } => {
            let dur = activity.effective_duration().unwrap_or(0);
            let start = add_days(*new_value, -(dur as i64)).ok_or(SkipReason::DateOutOfRange)?;
            activity.start_date = Some(start);
            activity.normalize();
        }
        ChangeEdit::Acceleration { new_value, .. } => {
            if !activity.milestone {
                activity.duration = Some(*new_value);
            }
            activity.normalize();
        }
        ChangeEdit::ResourceChange { new_value, .. } => {
            activity.set_resources(new_value.iter().cloned());
        }
        ChangeEdit::ScopeChange { new_value, .. } => {
            activity.description = new_value.clone();
        }
        ChangeEdit::Add { .. } | ChangeEdit::Delete => {}
    }
    stamp(activity, change, applied_at);
    Ok(())
}

fn stamp(activity: &mut Activity, change: &ScheduleChange, at: DateTime<Utc>) {
    activity.last_modified = Some(at);
    activity.modification_reason = Some(change.reason.clone());
    activity.impact_days = change.impact_days;
}
