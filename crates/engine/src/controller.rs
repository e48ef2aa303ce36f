//! Change-run orchestration: load, analyze, apply, recompute, export, persist.
//!
//! Runs for the same project are serialized through a per-project mutex owned
//! by the controller; runs for different projects proceed in parallel.
//!
//! A run is computed entirely in memory before the first storage write. If a
//! write then fails or the run times out, timings already written are restored
//! from the loaded snapshot and export files are not written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{error, info, warn};

use crate::analyzer::TriggerAnalyzer;
use crate::applicator::{apply_changes, SkippedChange};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::export::{self, ExportFailure, ExportFormat, ExportedFile, FormatInfo};
use crate::model::{ActivityTiming, ChangeType, Schedule, ScheduleChange};
use crate::solver;
use crate::store::{NotificationSink, ScheduleStore};
use crate::triggers::TriggerBundle;
use crate::validator::{self, ValidationResult};

pub const CHANGES_APPLIED_EVENT: &str = "schedule.changes_applied";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_changes: usize,
    pub critical_path_impacts: usize,
    pub resource_changes: usize,
    pub skipped_changes: usize,
    pub previous_finish: Option<NaiveDate>,
    pub new_finish: Option<NaiveDate>,
    /// New project finish minus previous project finish, in days.
    pub completion_date_change_days: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub changes: Vec<ScheduleChange>,
    pub skipped: Vec<SkippedChange>,
    pub updated_schedule: Schedule,
    pub export_paths: Vec<ExportedFile>,
    pub export_failures: Vec<ExportFailure>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub export_paths: Vec<ExportedFile>,
    pub export_failures: Vec<ExportFailure>,
}

/// State carried through a single run.
#[derive(Debug, Clone)]
struct RunContext {
    project_id: String,
    started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct TimingUpdate {
    activity_id: String,
    before: ActivityTiming,
    after: ActivityTiming,
}

/// A run computed in memory and ready to commit.
#[derive(Debug)]
struct PreparedRun {
    baseline: Schedule,
    updated: Schedule,
    applied: Vec<ScheduleChange>,
    skipped: Vec<SkippedChange>,
    timings: Vec<TimingUpdate>,
    report: export::ExportReport,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct ChangeRunController {
    store: Arc<dyn ScheduleStore>,
    notifier: Arc<dyn NotificationSink>,
    analyzer: TriggerAnalyzer,
    config: EngineConfig,
    project_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChangeRunController {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn ScheduleStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        ChangeRunController {
            store,
            notifier,
            analyzer: TriggerAnalyzer::new(config.analyzer.clone()),
            config,
            project_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the default analyzer, e.g. with a custom matcher or estimator.
    pub fn with_analyzer(mut self, analyzer: TriggerAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn project_lock(&self, project_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .project_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Run with the configured default export formats.
    pub async fn run(
        &self,
        project_id: &str,
        triggers: &TriggerBundle,
    ) -> Result<RunResult, EngineError> {
        let formats = self.config.export.default_formats.clone();
        self.run_with_formats(project_id, triggers, &formats).await
    }

    pub async fn run_with_formats(
        &self,
        project_id: &str,
        triggers: &TriggerBundle,
        formats: &[ExportFormat],
    ) -> Result<RunResult, EngineError> {
        let lock = self.project_lock(project_id);
        let result = {
            let _guard = lock.lock().await;
            let ctx = RunContext {
                project_id: project_id.to_string(),
                started_at: Utc::now(),
            };
            self.run_locked(&ctx, triggers, formats).await
        };
        drop(lock);
        self.release_project_lock(project_id);
        result
    }

    /// Drop the registry entry once no run holds or awaits it.
    fn release_project_lock(&self, project_id: &str) {
        let mut locks = self
            .project_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(project_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(project_id);
        }
    }

    fn timed_out(&self, ctx: &RunContext) -> EngineError {
        let timeout = self.config.run_timeout();
        error!(
            project = %ctx.project_id,
            timeout_secs = timeout.as_secs(),
            "change run timed out"
        );
        EngineError::RunTimedOut {
            project_id: ctx.project_id.clone(),
            timeout_secs: timeout.as_secs(),
        }
    }

    async fn load(&self, project_id: &str) -> Result<Schedule, EngineError> {
        self.store
            .load_schedule(project_id)
            .await?
            .ok_or_else(|| EngineError::ScheduleNotFound(project_id.to_string()))
    }

    async fn run_locked(
        &self,
        ctx: &RunContext,
        triggers: &TriggerBundle,
        formats: &[ExportFormat],
    ) -> Result<RunResult, EngineError> {
        let deadline = Instant::now() + self.config.run_timeout();

        let prepared = match timeout_at(deadline, self.prepare(ctx, triggers, formats)).await {
            Ok(prepared) => prepared?,
            Err(_) => return Err(self.timed_out(ctx)),
        };

        let mut written = Vec::new();
        let committed = timeout_at(deadline, self.commit(ctx, &prepared, &mut written)).await;
        let failure = match committed {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(_) => Some(self.timed_out(ctx)),
        };
        if let Some(e) = failure {
            self.roll_back(ctx, &written).await;
            return Err(e);
        }

        Ok(self.publish(ctx, prepared).await)
    }

    /// Everything that can fail before storage is touched: load, recompute,
    /// analyze, apply, recompute and render exports.
    async fn prepare(
        &self,
        ctx: &RunContext,
        triggers: &TriggerBundle,
        formats: &[ExportFormat],
    ) -> Result<PreparedRun, EngineError> {
        info!(project = %ctx.project_id, triggers = triggers.len(), "change run started");

        let snapshot = self.load(&ctx.project_id).await?;
        let baseline = solver::solve(&snapshot, &self.config.cpm)?;

        let proposed = self.analyzer.analyze(&baseline, triggers);
        info!(project = %ctx.project_id, proposed = proposed.len(), "triggers analyzed");

        let outcome = apply_changes(&baseline, &proposed, ctx.started_at);
        let updated = solver::solve(&outcome.schedule, &self.config.cpm)?;
        let report = export::export(&updated, formats, ctx.started_at);

        let mut timings = Vec::new();
        for activity in &updated.activities {
            let Some(before) = snapshot.activity(&activity.external_id) else {
                warn!(
                    project = %ctx.project_id,
                    activity = %activity.external_id,
                    "added activity kept in change history only"
                );
                continue;
            };
            let after = ActivityTiming::from(activity);
            let before = ActivityTiming::from(before);
            if after != before {
                timings.push(TimingUpdate {
                    activity_id: activity.external_id.clone(),
                    before,
                    after,
                });
            }
        }

        Ok(PreparedRun {
            baseline,
            updated,
            applied: outcome.applied,
            skipped: outcome.skipped,
            timings,
            report,
        })
    }

    /// Write the changed timings, then the history. `written` collects every
    /// update that may have reached the store, for rollback.
    async fn commit<'a>(
        &self,
        ctx: &RunContext,
        prepared: &'a PreparedRun,
        written: &mut Vec<&'a TimingUpdate>,
    ) -> Result<(), EngineError> {
        for update in &prepared.timings {
            written.push(update);
            self.store
                .save_activity_timing(&ctx.project_id, &update.activity_id, &update.after)
                .await?;
        }
        info!(project = %ctx.project_id, writes = written.len(), "activity timings persisted");

        if !prepared.applied.is_empty() {
            self.store
                .append_change_history(&ctx.project_id, &prepared.applied)
                .await?;
        }
        Ok(())
    }

    /// Restore the snapshot timing of every activity written by a failed commit.
    async fn roll_back(&self, ctx: &RunContext, written: &[&TimingUpdate]) {
        if written.is_empty() {
            return;
        }
        warn!(project = %ctx.project_id, writes = written.len(), "rolling back activity timings");
        let restore = async {
            for update in written.iter().rev() {
                if let Err(e) = self
                    .store
                    .save_activity_timing(&ctx.project_id, &update.activity_id, &update.before)
                    .await
                {
                    error!(
                        project = %ctx.project_id,
                        activity = %update.activity_id,
                        error = %e,
                        "rollback write failed"
                    );
                }
            }
        };
        if timeout(self.config.run_timeout(), restore).await.is_err() {
            error!(project = %ctx.project_id, "rollback timed out; storage needs manual repair");
        }
    }

    /// Write export files, notify and build the result of a committed run.
    async fn publish(&self, ctx: &RunContext, prepared: PreparedRun) -> RunResult {
        let PreparedRun {
            baseline,
            updated,
            applied,
            skipped,
            report,
            ..
        } = prepared;

        let (export_paths, write_failures) =
            export::write_artifacts(&self.config.export.directory, &ctx.project_id, &report.artifacts);
        let mut export_failures = report.failures;
        export_failures.extend(write_failures);

        let summary = summarize(&baseline, &updated, &applied, skipped.len());
        self.notifier
            .emit(
                CHANGES_APPLIED_EVENT,
                json!({
                    "projectId": ctx.project_id,
                    "totalChanges": summary.total_changes,
                    "criticalPathChanges": summary.critical_path_impacts,
                    "resourceChanges": summary.resource_changes,
                    "skippedChanges": summary.skipped_changes,
                    "completionDateChangeDays": summary.completion_date_change_days,
                }),
            )
            .await;

        info!(
            project = %ctx.project_id,
            applied = summary.total_changes,
            skipped = summary.skipped_changes,
            finish_shift_days = summary.completion_date_change_days,
            "change run complete"
        );

        RunResult {
            changes: applied,
            skipped,
            updated_schedule: updated,
            export_paths,
            export_failures,
            summary,
        }
    }

    // -----------------------------------------------------------------------
    // Endpoint surface
    // -----------------------------------------------------------------------

    pub fn available_formats(&self) -> Vec<FormatInfo> {
        export::available_formats()
    }

    /// Recompute and export the stored schedule without applying changes.
    pub async fn export_current(
        &self,
        project_id: &str,
        formats: &[ExportFormat],
    ) -> Result<ExportOutcome, EngineError> {
        let schedule = self.load(project_id).await?;
        let solved = solver::solve(&schedule, &self.config.cpm)?;
        let report = export::export(&solved, formats, Utc::now());
        let (export_paths, write_failures) =
            export::write_artifacts(&self.config.export.directory, project_id, &report.artifacts);
        let mut export_failures = report.failures;
        export_failures.extend(write_failures);
        Ok(ExportOutcome {
            export_paths,
            export_failures,
        })
    }

    pub async fn change_history(&self, project_id: &str) -> Result<Vec<ScheduleChange>, EngineError> {
        Ok(self.store.change_history(project_id).await?)
    }

    /// Automation-readiness report for the stored schedule.
    pub async fn validate(&self, project_id: &str) -> Result<ValidationResult, EngineError> {
        let schedule = self.load(project_id).await?;
        Ok(validator::validate(&schedule, &self.config.cpm))
    }
}

fn summarize(
    baseline: &Schedule,
    updated: &Schedule,
    applied: &[ScheduleChange],
    skipped: usize,
) -> RunSummary {
    let completion_date_change_days = match (baseline.project_finish, updated.project_finish) {
        (Some(before), Some(after)) => (after - before).num_days(),
        _ => 0,
    };
    RunSummary {
        total_changes: applied.len(),
        critical_path_impacts: applied.iter().filter(|c| c.affects_critical_path).count(),
        resource_changes: applied
            .iter()
            .filter(|c| c.change_type() == ChangeType::ResourceChange)
            .count(),
        skipped_changes: skipped,
        previous_finish: baseline.project_finish,
        new_finish: updated.project_finish,
        completion_date_change_days,
    }
}
