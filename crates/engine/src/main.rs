use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use programme_engine::analyzer::TriggerAnalyzer;
use programme_engine::applicator::apply_changes;
use programme_engine::export::{self, ExportFormat};
use programme_engine::model::{Schedule, ScheduleChange};
use programme_engine::store::{InMemoryScheduleStore, TracingNotifier};
use programme_engine::{logging, solver, validator};
use programme_engine::{ChangeRunController, EngineConfig, TriggerBundle};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum Request {
    /// Propose changes for a trigger bundle without applying them.
    Analyze {
        schedule: Schedule,
        #[serde(default)]
        triggers: TriggerBundle,
    },
    #[serde(rename_all = "camelCase")]
    Apply {
        schedule: Schedule,
        changes: Vec<ScheduleChange>,
        applied_at: Option<DateTime<Utc>>,
    },
    Solve {
        schedule: Schedule,
    },
    Validate {
        schedule: Schedule,
    },
    #[serde(rename_all = "camelCase")]
    Export {
        schedule: Schedule,
        formats: Option<Vec<ExportFormat>>,
        generated_at: Option<DateTime<Utc>>,
    },
    Formats,
    /// Full change run against an in-memory copy of the schedule.
    #[serde(rename_all = "camelCase")]
    Run {
        schedule: Schedule,
        #[serde(default)]
        triggers: TriggerBundle,
        formats: Option<Vec<ExportFormat>>,
        export_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse { ok: true, data };
    let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
        format!("{{\"ok\":false,\"error\":\"serialization error: {}\"}}", e)
    });
    println!("{}", json);
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        ok: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp).unwrap_or_else(|_| {
        "{\"ok\":false,\"error\":\"double serialization error\"}".to_string()
    });
    println!("{}", json);
    let _ = io::stdout().flush();
    std::process::exit(1);
}

fn run(
    config: EngineConfig,
    schedule: Schedule,
    triggers: TriggerBundle,
    formats: Vec<ExportFormat>,
) -> Result<programme_engine::RunResult, programme_engine::EngineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| programme_engine::EngineError::Config(format!("runtime: {}", e)))?;

    let project_id = schedule.project_id.clone();
    let store = InMemoryScheduleStore::new();
    store.insert(schedule)?;
    let controller = ChangeRunController::new(config, Arc::new(store), Arc::new(TracingNotifier));

    runtime.block_on(controller.run_with_formats(&project_id, &triggers, &formats))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    logging::init();

    let mut config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => write_err(e),
    };

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("Failed to read stdin: {}", e));
    }

    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("Invalid JSON input: {}", e)),
    };

    match request {
        Request::Analyze { schedule, triggers } => {
            // Critical flags on the proposed changes come from a fresh CPM pass.
            let schedule = match solver::solve(&schedule, &config.cpm) {
                Ok(solved) => solved,
                Err(e) => write_err(e),
            };
            let analyzer = TriggerAnalyzer::new(config.analyzer.clone());
            write_ok(analyzer.analyze(&schedule, &triggers));
        }
        Request::Apply {
            schedule,
            changes,
            applied_at,
        } => {
            let outcome = apply_changes(&schedule, &changes, applied_at.unwrap_or_else(Utc::now));
            write_ok(outcome);
        }
        Request::Solve { schedule } => match solver::solve(&schedule, &config.cpm) {
            Ok(solved) => write_ok(solved),
            Err(e) => write_err(e),
        },
        Request::Validate { schedule } => {
            write_ok(validator::validate(&schedule, &config.cpm));
        }
        Request::Export {
            schedule,
            formats,
            generated_at,
        } => {
            let formats = formats.unwrap_or_else(|| config.export.default_formats.clone());
            let report = export::export(&schedule, &formats, generated_at.unwrap_or_else(Utc::now));
            write_ok(report);
        }
        Request::Formats => write_ok(export::available_formats()),
        Request::Run {
            schedule,
            triggers,
            formats,
            export_dir,
        } => {
            if let Some(dir) = export_dir {
                config.export.directory = dir;
            }
            let formats = formats.unwrap_or_else(|| config.export.default_formats.clone());
            match run(config, schedule, triggers, formats) {
                Ok(result) => write_ok(result),
                Err(e) => write_err(e),
            }
        }
    }
}
