use thiserror::Error;

use crate::solver::SolveError;
use crate::store::StoreError;

/// Fatal errors of a change run. Anything returned here aborts the run before
/// storage is written.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No schedule found for project '{0}'")]
    ScheduleNotFound(String),

    #[error("Schedule validation failed: {message} (activities: {})", .activity_ids.join(", "))]
    Validation {
        message: String,
        activity_ids: Vec<String>,
    },

    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Change run for project '{project_id}' exceeded {timeout_secs}s and was abandoned; operator attention required")]
    RunTimedOut { project_id: String, timeout_secs: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<SolveError> for EngineError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::Validation {
                message,
                activity_ids,
            } => EngineError::Validation {
                message,
                activity_ids,
            },
            SolveError::UnknownActivity {
                predecessor,
                successor,
            } => EngineError::Validation {
                message: "relationship references an unknown activity".to_string(),
                activity_ids: vec![predecessor, successor],
            },
            SolveError::CycleDetected { chain } => EngineError::CycleDetected { chain },
        }
    }
}
