//! Storage and notification collaborators of the change-run controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::model::{ActivityTiming, Schedule, ScheduleChange};

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Activity '{activity_id}' not found in project '{project_id}'")]
    ActivityNotFound {
        project_id: String,
        activity_id: String,
    },
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Persistence for schedules and their change history.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn load_schedule(&self, project_id: &str) -> Result<Option<Schedule>, StoreError>;

    async fn save_activity_timing(
        &self,
        project_id: &str,
        activity_id: &str,
        timing: &ActivityTiming,
    ) -> Result<(), StoreError>;

    async fn append_change_history(
        &self,
        project_id: &str,
        changes: &[ScheduleChange],
    ) -> Result<(), StoreError>;

    async fn change_history(&self, project_id: &str) -> Result<Vec<ScheduleChange>, StoreError>;
}

/// Fire-and-forget event sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn emit(&self, event: &str, payload: Value);
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    schedules: HashMap<String, Schedule>,
    history: HashMap<String, Vec<ScheduleChange>>,
    timing_writes: usize,
}

/// Schedules kept in process memory. Used by the CLI and tests.
#[derive(Clone, Default)]
pub struct InMemoryScheduleStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(format!("store lock poisoned: {}", e)))
    }

    pub fn insert(&self, schedule: Schedule) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.schedules.insert(schedule.project_id.clone(), schedule);
        Ok(())
    }

    pub fn get(&self, project_id: &str) -> Result<Option<Schedule>, StoreError> {
        Ok(self.lock()?.schedules.get(project_id).cloned())
    }

    /// Number of `save_activity_timing` calls served so far.
    pub fn timing_writes(&self) -> usize {
        self.lock().map(|s| s.timing_writes).unwrap_or(0)
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn load_schedule(&self, project_id: &str) -> Result<Option<Schedule>, StoreError> {
        self.get(project_id)
    }

    async fn save_activity_timing(
        &self,
        project_id: &str,
        activity_id: &str,
        timing: &ActivityTiming,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let schedule = state
            .schedules
            .get_mut(project_id)
            .ok_or_else(|| StoreError::Backend(format!("unknown project '{}'", project_id)))?;
        let activity = schedule.activity_mut(activity_id).ok_or_else(|| {
            StoreError::ActivityNotFound {
                project_id: project_id.to_string(),
                activity_id: activity_id.to_string(),
            }
        })?;
        timing.apply_to(activity);
        state.timing_writes += 1;
        Ok(())
    }

    async fn append_change_history(
        &self,
        project_id: &str,
        changes: &[ScheduleChange],
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .history
            .entry(project_id.to_string())
            .or_default()
            .extend_from_slice(changes);
        Ok(())
    }

    async fn change_history(&self, project_id: &str) -> Result<Vec<ScheduleChange>, StoreError> {
        Ok(self
            .lock()?
            .history
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Notification sinks
// ---------------------------------------------------------------------------

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn emit(&self, event: &str, payload: Value) {
        info!(event, %payload, "notification");
    }
}

/// Keeps emitted events in memory for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn emit(&self, event: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.to_string(), payload));
        }
    }
}
