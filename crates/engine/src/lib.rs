//! Programme scheduling and change-propagation engine.
//!
//! Turns contract triggers (variations, risk notices, resource changes,
//! external delays) into schedule changes, applies them, recomputes the
//! critical path and exports the result for scheduling tools.

pub mod analyzer;
pub mod applicator;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod solver;
pub mod store;
pub mod triggers;
pub mod validator;

pub use config::EngineConfig;
pub use controller::{ChangeRunController, RunResult, RunSummary};
pub use error::EngineError;
pub use model::{Activity, Relationship, Schedule, ScheduleChange};
pub use triggers::TriggerBundle;
