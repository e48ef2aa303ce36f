//! Interchange exports of a solved schedule.
//!
//! XML follows the MS Project XML (MSPDI) element names, XER follows the
//! Primavera table layout (`%T` table, `%F` fields, `%R` rows). The native
//! `.mpp` format needs a third-party converter and is only represented by a
//! placeholder artifact.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{Activity, Schedule};

const MSPDI_NAMESPACE: &str = "http://schemas.microsoft.com/project";
const HOURS_PER_DAY: i64 = 8;
/// MSPDI `LinkLag` is expressed in tenths of a minute.
const LAG_UNITS_PER_DAY: i64 = HOURS_PER_DAY * 60 * 10;
/// MSPDI duration/lag format code for days.
const FORMAT_DAYS: u8 = 7;

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xml,
    Xer,
    Mpp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Xer => "xer",
            ExportFormat::Mpp => "mpp.placeholder.txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Xer => "xer",
            ExportFormat::Mpp => "mpp",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(ExportFormat::Xml),
            "xer" => Ok(ExportFormat::Xer),
            "mpp" => Ok(ExportFormat::Mpp),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub format: ExportFormat,
    pub extension: &'static str,
    pub description: &'static str,
    /// False when the artifact is only a stand-in for an external conversion.
    pub supported: bool,
}

pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            format: ExportFormat::Xml,
            extension: ExportFormat::Xml.extension(),
            description: "MS Project XML interchange (MSPDI)",
            supported: true,
        },
        FormatInfo {
            format: ExportFormat::Xer,
            extension: ExportFormat::Xer.extension(),
            description: "Primavera P6 XER text export",
            supported: true,
        },
        FormatInfo {
            format: ExportFormat::Mpp,
            extension: ExportFormat::Mpp.extension(),
            description: "Native MS Project file; placeholder only, convert from the XML export",
            supported: false,
        },
    ]
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Schedule '{0}' has no activities to export")]
    EmptySchedule(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Could not write {path}: {message}")]
    Io { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub content: String,
}

/// A format that could not be produced; the other formats are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportFailure {
    pub format: ExportFormat,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub artifacts: Vec<ExportArtifact>,
    pub failures: Vec<ExportFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn timestamp(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn xer_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.and_time(NaiveTime::MIN).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// XER fields are tab separated, one record per line.
fn xer_text(s: &str) -> String {
    s.replace(['\t', '\r', '\n'], " ")
}

fn project_finish(schedule: &Schedule) -> NaiveDate {
    schedule
        .project_finish
        .or_else(|| schedule.activities.iter().filter_map(|a| a.end_date).max())
        .unwrap_or(schedule.start_date)
}

/// External id → 1-based task UID, in activity order.
fn task_uids(schedule: &Schedule) -> HashMap<&str, usize> {
    schedule
        .activities
        .iter()
        .enumerate()
        .map(|(i, a)| (a.external_id.as_str(), i + 1))
        .collect()
}

/// Reduce `raw` to ASCII alphanumerics and `-`, everything else becoming `_`.
fn safe_component(raw: &str, fallback: &str) -> String {
    let safe: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if safe.is_empty() {
        fallback.to_string()
    } else {
        safe
    }
}

fn start_of(a: &Activity) -> Option<NaiveDate> {
    a.earliest_start.or(a.start_date)
}

fn finish_of(a: &Activity) -> Option<NaiveDate> {
    a.earliest_finish.or(a.end_date)
}

/// `<name>_<YYYYmmdd_HHMMSS>.<ext>` with the name reduced to safe characters.
pub fn artifact_file_name(
    schedule: &Schedule,
    format: ExportFormat,
    generated_at: DateTime<Utc>,
) -> String {
    let stem = safe_component(&schedule.name, "schedule");
    format!(
        "{}_{}.{}",
        stem,
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

// ---------------------------------------------------------------------------
// MS Project XML
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename = "Project")]
struct MsProjectDocument<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "CreationDate")]
    creation_date: String,
    #[serde(rename = "LastSaved")]
    last_saved: String,
    #[serde(rename = "ScheduleFromStart")]
    schedule_from_start: u8,
    #[serde(rename = "StartDate")]
    start_date: String,
    #[serde(rename = "FinishDate")]
    finish_date: String,
    #[serde(rename = "Tasks")]
    tasks: MsProjectTasks<'a>,
}

#[derive(Serialize)]
struct MsProjectTasks<'a> {
    #[serde(rename = "Task")]
    task: Vec<MsProjectTask<'a>>,
}

#[derive(Serialize)]
struct MsProjectTask<'a> {
    #[serde(rename = "UID")]
    uid: usize,
    #[serde(rename = "ID")]
    id: usize,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "WBS")]
    wbs: &'a str,
    #[serde(rename = "Start", skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(rename = "Finish", skip_serializing_if = "Option::is_none")]
    finish: Option<String>,
    #[serde(rename = "Duration")]
    duration: String,
    #[serde(rename = "DurationFormat")]
    duration_format: u8,
    #[serde(rename = "PercentComplete")]
    percent_complete: u8,
    #[serde(rename = "Critical")]
    critical: u8,
    #[serde(rename = "Milestone")]
    milestone: u8,
    #[serde(rename = "TotalSlack")]
    total_slack: u32,
    #[serde(rename = "Text1")]
    external_id: &'a str,
    #[serde(rename = "PredecessorLink")]
    predecessor_links: Vec<MsPredecessorLink>,
}

#[derive(Serialize)]
struct MsPredecessorLink {
    #[serde(rename = "PredecessorUID")]
    predecessor_uid: usize,
    #[serde(rename = "SuccessorUID")]
    successor_uid: usize,
    #[serde(rename = "Type")]
    link_type: u8,
    #[serde(rename = "LinkLag")]
    link_lag: i64,
    #[serde(rename = "LagFormat")]
    lag_format: u8,
}

/// Serialize to MS Project XML. `generated_at` fills the creation and save
/// timestamps, so equal inputs give byte-identical output.
pub fn to_ms_project_xml(
    schedule: &Schedule,
    generated_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    if schedule.activities.is_empty() {
        return Err(ExportError::EmptySchedule(schedule.name.clone()));
    }

    let stamp = generated_at.format("%Y-%m-%dT%H:%M:%S").to_string();

    let uids = task_uids(schedule);
    let mut links: HashMap<usize, Vec<MsPredecessorLink>> = HashMap::new();
    for r in &schedule.relationships {
        if let (Some(&pred), Some(&succ)) = (
            uids.get(r.predecessor_id.as_str()),
            uids.get(r.successor_id.as_str()),
        ) {
            links.entry(succ).or_default().push(MsPredecessorLink {
                predecessor_uid: pred,
                successor_uid: succ,
                link_type: r.relationship_type.ms_project_code(),
                link_lag: r.lag.saturating_mul(LAG_UNITS_PER_DAY),
                lag_format: FORMAT_DAYS,
            });
        }
    }

    let mut tasks = Vec::with_capacity(schedule.activities.len());
    for (i, a) in schedule.activities.iter().enumerate() {
        let uid = i + 1;
        let predecessor_links = links.remove(&uid).unwrap_or_default();

        let days = a.effective_duration().unwrap_or(0) as i64;
        tasks.push(MsProjectTask {
            uid,
            id: uid,
            name: &a.name,
            wbs: &a.wbs_code,
            start: start_of(a).map(timestamp),
            finish: finish_of(a).map(timestamp),
            duration: format!("PT{}H0M0S", days * HOURS_PER_DAY),
            duration_format: FORMAT_DAYS,
            percent_complete: a.percent_complete.min(100),
            critical: a.is_critical as u8,
            milestone: a.milestone as u8,
            total_slack: a.total_float,
            external_id: &a.external_id,
            predecessor_links,
        });
    }

    let doc = MsProjectDocument {
        xmlns: MSPDI_NAMESPACE,
        name: &schedule.name,
        title: &schedule.name,
        creation_date: stamp.clone(),
        last_saved: stamp,
        schedule_from_start: 1,
        start_date: timestamp(schedule.start_date),
        finish_date: timestamp(project_finish(schedule)),
        tasks: MsProjectTasks { task: tasks },
    };

    let mut body = String::new();
    let mut ser = quick_xml::se::Serializer::new(&mut body);
    ser.indent(' ', 2);
    doc.serialize(ser)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n{}\n",
        body
    ))
}

// ---------------------------------------------------------------------------
// Primavera XER
// ---------------------------------------------------------------------------

/// Serialize to a Primavera-style XER file: header, one PROJECT row, one TASK
/// row per activity, one TASKPRED row per relationship.
pub fn to_xer(schedule: &Schedule, generated_at: DateTime<Utc>) -> Result<String, ExportError> {
    if schedule.activities.is_empty() {
        return Err(ExportError::EmptySchedule(schedule.name.clone()));
    }

    let proj_id = xer_text(&schedule.project_id);
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "ERMHDR\t8.0\t{}\tProject\tprogramme-engine\tDays",
        generated_at.format("%Y-%m-%d")
    ));

    lines.push("%T\tPROJECT".to_string());
    lines.push("%F\tproj_id\tproj_short_name\tplan_start_date\tscd_end_date".to_string());
    lines.push(format!(
        "%R\t{}\t{}\t{}\t{}",
        proj_id,
        xer_text(&schedule.name),
        xer_date(Some(schedule.start_date)),
        xer_date(Some(project_finish(schedule)))
    ));

    lines.push("%T\tTASK".to_string());
    lines.push(
        "%F\ttask_id\tproj_id\twbs_id\ttask_code\ttask_name\ttask_type\ttarget_drtn_hr_cnt\ttotal_float_hr_cnt\tphys_complete_pct\ttarget_start_date\ttarget_end_date\tdriving_path_flag"
            .to_string(),
    );
    for (i, a) in schedule.activities.iter().enumerate() {
        let days = a.effective_duration().unwrap_or(0) as i64;
        lines.push(format!(
            "%R\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            proj_id,
            xer_text(&a.wbs_code),
            xer_text(&a.external_id),
            xer_text(&a.name),
            if a.milestone { "TT_Mile" } else { "TT_Task" },
            days * HOURS_PER_DAY,
            a.total_float as i64 * HOURS_PER_DAY,
            a.percent_complete.min(100),
            xer_date(start_of(a)),
            xer_date(finish_of(a)),
            if a.is_critical { "Y" } else { "N" },
        ));
    }

    lines.push("%T\tTASKPRED".to_string());
    lines.push("%F\ttask_pred_id\ttask_id\tpred_task_id\tproj_id\tpred_type\tlag_hr_cnt".to_string());
    let uids = task_uids(schedule);
    let mut pred_id = 0;
    for r in &schedule.relationships {
        let (Some(succ), Some(pred)) = (
            uids.get(r.successor_id.as_str()),
            uids.get(r.predecessor_id.as_str()),
        ) else {
            continue;
        };
        pred_id += 1;
        lines.push(format!(
            "%R\t{}\t{}\t{}\t{}\t{}\t{}",
            pred_id,
            succ,
            pred,
            proj_id,
            r.relationship_type.xer_code(),
            r.lag.saturating_mul(HOURS_PER_DAY)
        ));
    }

    lines.push("%E".to_string());
    Ok(lines.join("\n") + "\n")
}

// ---------------------------------------------------------------------------
// MPP placeholder
// ---------------------------------------------------------------------------

pub fn mpp_placeholder(schedule: &Schedule, generated_at: DateTime<Utc>) -> String {
    format!(
        "Native .mpp output is not generated by this engine.\n\
         Project: {} ({})\n\
         Activities: {}\n\
         Generated: {}\n\
         Import the XML export into MS Project to obtain an .mpp file.\n",
        schedule.name,
        schedule.project_id,
        schedule.activities.len(),
        generated_at.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serialize `schedule` once per requested format. A failing format is
/// reported in `failures` and does not stop the others.
pub fn export(
    schedule: &Schedule,
    formats: &[ExportFormat],
    generated_at: DateTime<Utc>,
) -> ExportReport {
    let mut report = ExportReport::default();

    for &format in formats {
        let content = match format {
            ExportFormat::Xml => to_ms_project_xml(schedule, generated_at),
            ExportFormat::Xer => to_xer(schedule, generated_at),
            ExportFormat::Mpp => Ok(mpp_placeholder(schedule, generated_at)),
        };
        match content {
            Ok(content) => report.artifacts.push(ExportArtifact {
                format,
                file_name: artifact_file_name(schedule, format, generated_at),
                content,
            }),
            Err(e) => {
                warn!(project = %schedule.project_id, %format, error = %e, "export failed");
                report.failures.push(ExportFailure {
                    format,
                    message: e.to_string(),
                });
            }
        }
    }
    report
}

/// Write artifacts to `<root>/<project_id>/`, the id reduced to safe
/// characters so the directory always stays under `root`. Files that cannot
/// be written become failures; the rest are still written.
pub fn write_artifacts(
    root: &Path,
    project_id: &str,
    artifacts: &[ExportArtifact],
) -> (Vec<ExportedFile>, Vec<ExportFailure>) {
    let dir = root.join(safe_component(project_id, "project"));
    let mut written = Vec::new();
    let mut failures = Vec::new();
    if artifacts.is_empty() {
        return (written, failures);
    }

    if let Err(e) = std::fs::create_dir_all(&dir) {
        let err = ExportError::Io {
            path: dir.clone(),
            message: e.to_string(),
        };
        for a in artifacts {
            failures.push(ExportFailure {
                format: a.format,
                message: err.to_string(),
            });
        }
        return (written, failures);
    }

    for a in artifacts {
        let path = dir.join(&a.file_name);
        match std::fs::write(&path, &a.content) {
            Ok(()) => {
                info!(path = %path.display(), format = %a.format, "export written");
                written.push(ExportedFile {
                    format: a.format,
                    path,
                });
            }
            Err(e) => {
                let err = ExportError::Io {
                    path,
                    message: e.to_string(),
                };
                failures.push(ExportFailure {
                    format: a.format,
                    message: err.to_string(),
                });
            }
        }
    }
    (written, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relationship, RelationshipType};
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 14, 5, 6).unwrap()
    }

    fn make_schedule() -> Schedule {
        let mut s = Schedule::new("p-42", "Depot Upgrade", date("2024-12-01"));
        let mut a = Activity::new("A1", "Foundation").scheduled(date("2024-12-01"), 14);
        a.wbs_code = "1.1".into();
        a.is_critical = true;
        let b = Activity::new("A2", "Framing").scheduled(date("2024-12-15"), 10);
        let mut m = Activity::new("M1", "Handover");
        m.milestone = true;
        let m = m.scheduled(date("2024-12-25"), 0);
        s.activities = vec![a, b, m];
        s.relationships = vec![
            Relationship::finish_to_start("A1", "A2"),
            Relationship {
                predecessor_id: "A2".into(),
                successor_id: "M1".into(),
                relationship_type: RelationshipType::FinishToFinish,
                lag: 1,
            },
        ];
        s
    }

    #[test]
    fn test_xml_has_one_task_per_activity() {
        let s = make_schedule();
        let xml = to_ms_project_xml(&s, generated()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert_eq!(xml.matches("<Task>").count(), s.activities.len());
        assert_eq!(xml.matches("<PredecessorLink>").count(), s.relationships.len());
        assert!(xml.contains("<Name>Depot Upgrade</Name>"));
        assert!(xml.contains("<Duration>PT112H0M0S</Duration>"));
        assert!(xml.contains("<Start>2024-12-01T00:00:00</Start>"));
        assert!(xml.contains("<Critical>1</Critical>"));
        assert!(xml.contains("<WBS>1.1</WBS>"));
        assert!(xml.contains("<Type>1</Type>"));
        assert!(xml.contains("<Type>0</Type>"));
        assert!(xml.contains("<LinkLag>4800</LinkLag>"));
        assert!(xml.contains("<CreationDate>2025-02-03T14:05:06</CreationDate>"));
    }

    #[test]
    fn test_xml_links_point_at_task_uids() {
        let s = make_schedule();
        let xml = to_ms_project_xml(&s, generated()).unwrap();
        let flat: String = xml.split_whitespace().collect();
        assert!(flat.contains("<PredecessorUID>1</PredecessorUID><SuccessorUID>2</SuccessorUID>"));
        assert!(flat.contains("<PredecessorUID>2</PredecessorUID><SuccessorUID>3</SuccessorUID>"));
        // links sit under their successor task
        let framing = flat.find("<Name>Framing</Name>").unwrap();
        let handover = flat.find("<Name>Handover</Name>").unwrap();
        let first_link = flat.find("<PredecessorUID>1</PredecessorUID>").unwrap();
        assert!(framing < first_link && first_link < handover);
    }

    #[test]
    fn test_xml_is_reproducible() {
        let s = make_schedule();
        let before = s.clone();
        let first = to_ms_project_xml(&s, generated()).unwrap();
        let second = to_ms_project_xml(&s, generated()).unwrap();
        assert_eq!(first, second);
        assert_eq!(s, before);
    }

    #[test]
    fn test_empty_schedule_xml_fails() {
        let s = Schedule::new("p-0", "Empty", date("2024-12-01"));
        assert!(matches!(
            to_ms_project_xml(&s, generated()),
            Err(ExportError::EmptySchedule(_))
        ));
    }

    #[test]
    fn test_xer_rows_per_table() {
        let s = make_schedule();
        let xer = to_xer(&s, generated()).unwrap();
        assert!(xer.starts_with("ERMHDR\t"));
        assert!(xer.trim_end().ends_with("%E"));

        let mut table = "";
        let mut rows: std::collections::HashMap<&str, usize> = Default::default();
        for line in xer.lines() {
            if let Some(name) = line.strip_prefix("%T\t") {
                table = name;
            } else if line.starts_with("%R\t") {
                *rows.entry(table).or_default() += 1;
            }
        }
        assert_eq!(rows["PROJECT"], 1);
        assert_eq!(rows["TASK"], s.activities.len());
        assert_eq!(rows["TASKPRED"], s.relationships.len());
        assert!(xer.contains("\tA1\tFoundation\tTT_Task\t112\t"));
        assert!(xer.contains("\tM1\tHandover\tTT_Mile\t0\t"));
        assert!(xer.contains("\t2024-12-01 00:00\t2024-12-15 00:00\tY\n"));
        assert!(xer.contains("\tp-42\tPR_FF\t8\n"));
    }

    #[test]
    fn test_export_keeps_going_after_failure() {
        let empty = Schedule::new("p-0", "Empty", date("2024-12-01"));
        let report = export(
            &empty,
            &[ExportFormat::Xml, ExportFormat::Mpp],
            generated(),
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].format, ExportFormat::Xml);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.artifacts[0].format, ExportFormat::Mpp);
    }

    #[test]
    fn test_file_names_and_writing() {
        let s = make_schedule();
        let report = export(&s, &[ExportFormat::Xml, ExportFormat::Xer], generated());
        assert_eq!(
            report.artifacts[0].file_name,
            "Depot_Upgrade_20250203_140506.xml"
        );

        let dir = tempfile::tempdir().unwrap();
        let (written, failures) = write_artifacts(dir.path(), &s.project_id, &report.artifacts);
        assert!(failures.is_empty());
        assert_eq!(written.len(), 2);
        for f in &written {
            assert!(f.path.starts_with(dir.path().join("p-42")));
            assert!(f.path.exists());
        }
    }

    #[test]
    fn test_project_dir_stays_under_root() {
        let s = make_schedule();
        let report = export(&s, &[ExportFormat::Mpp], generated());
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("exports");

        for id in ["../escaped", "/tmp/abs", "..", ""] {
            let (written, failures) = write_artifacts(&root, id, &report.artifacts);
            assert!(failures.is_empty(), "{}: {:?}", id, failures);
            let path = &written[0].path;
            assert_eq!(path.parent().unwrap().parent().unwrap(), root.as_path());
        }
        assert!(!dir.path().join("escaped").exists());
        assert!(root.join("___escaped").is_dir());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("XML".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(available_formats().len(), 3);
        assert!(!available_formats()[2].supported);
    }
}
