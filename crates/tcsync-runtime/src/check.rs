use crate::report::ReportWriter;
use crate::session::{CheckSession, Stage};
use crate::sources::{ClientError, ClientResult, DataSources, EventCategory};
use crate::validator::ConfigValidator;
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tcsync_core::ConfigSettings;

/// Probe labels in execution order. Grouped by data source so a failing
/// line points straight at the sync stage it would break.
pub const PROBES: [&str; 9] = [
    "ControlIQ dashboard summary",
    "ControlIQ therapy timeline",
    "WS2 basal-IQ status",
    "WS2 therapy timeline CSV",
    "Android user profile",
    "Android last uploaded event",
    "Android therapy events",
    "Nightscout status",
    "Nightscout last uploaded entries",
];

const SEPARATOR: &str = "-----";

pub const SUMMARY_OK: &str = "No API errors returned!";
pub const SUMMARY_FAILED: &str = "API errors occurred. Please check the errors above.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub errors: usize,
    pub report_path: PathBuf,
    pub config_loaded: bool,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Run a full check and write the report.
///
/// `loaded` is the result of loading configuration. When it failed, the
/// failure is logged and counted, validation and probes are skipped, and
/// the summary and report are still produced. `connect` builds the data
/// sources from the loaded settings and is only called when they exist.
///
/// The only error returned is a failure to write the report.
pub fn run_check<S, F>(
    session: &mut CheckSession,
    loaded: tcsync_core::Result<ConfigSettings>,
    connect: F,
    writer: &ReportWriter,
) -> Result<CheckOutcome>
where
    S: DataSources,
    F: FnOnce(&ConfigSettings) -> S,
{
    log_environment(session);

    session.log("Loading secrets...");
    let config_loaded = match loaded {
        Ok(settings) => {
            ConfigValidator::check(session, &settings);
            session.advance(Stage::ConfigChecked);
            session.log(SEPARATOR);

            let sources = connect(&settings);
            probe_sources(session, &settings, &sources);
            true
        }
        Err(err) => {
            session.log(
                "Error: Unable to load config file. Please check your config file or environment variables",
            );
            session.log(err.to_string());
            session.record_error();
            session.advance(Stage::ConfigChecked);
            session.log("Skipping API checks: no configuration available.");
            session.log(SEPARATOR);
            false
        }
    };

    summarize(session);

    let report_path = writer.write(session.transcript().records())?;
    session.advance(Stage::Written);

    for line in ReportWriter::guidance(&report_path) {
        session.notice(&line);
    }
    session.advance(Stage::Done);

    Ok(CheckOutcome {
        errors: session.errors(),
        report_path,
        config_loaded,
    })
}

fn log_environment(session: &mut CheckSession) {
    session.log(format!("tcsync version {}", env!("CARGO_PKG_VERSION")));
    session.log(format!(
        "System platform {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));
    session.log(format!("Running checks with time range {}", session.range()));
    session.log(format!("Current time: {}", session.started_at()));
    session.log(format!(
        "TZ: {}",
        std::env::var("TZ").unwrap_or_else(|_| "(unset)".to_string())
    ));
}

fn probe_sources(session: &mut CheckSession, settings: &ConfigSettings, sources: &dyn DataSources) {
    let range = session.range();

    session.log("Logging in to t:connect ControlIQ API...");
    session.probe(PROBES[0], || sources.controliq().dashboard_summary(&range));
    session.probe(PROBES[1], || sources.controliq().therapy_timeline(&range));
    session.log(SEPARATOR);

    session.log("Logging in to t:connect WS2 API...");
    session.probe(PROBES[2], || sources.ws2().basaliq_tech(&range));
    session.probe(PROBES[3], || sources.ws2().therapy_timeline_csv(&range));
    session.log(SEPARATOR);

    session.log("Logging in to t:connect Android API...");
    session.probe(PROBES[4], || sources.android().user_profile());
    session.probe(PROBES[5], || {
        sources
            .android()
            .last_event_uploaded(&settings.pump_serial_number)
    });
    session.probe(PROBES[6], || sources.android().therapy_events(&range));
    session.log(SEPARATOR);

    session.log("Logging in to Nightscout...");
    session.probe(PROBES[7], || sources.nightscout().api_status());
    session.probe(PROBES[8], || last_uploads(sources));
    session.log(SEPARATOR);
}

fn summarize(session: &mut CheckSession) {
    if session.errors() == 0 {
        session.log(SUMMARY_OK);
    } else {
        session.log(SUMMARY_FAILED);
    }
    session.advance(Stage::Summarized);
}

/// Latest synchronizer uploads per category, as reported by Nightscout.
struct LastUploads {
    entries: Vec<(EventCategory, Option<Value>)>,
}

/// Look up every category even when an earlier one fails. Failures are
/// folded into one error so the whole lookup counts once.
fn last_uploads(sources: &dyn DataSources) -> ClientResult<LastUploads> {
    let nightscout = sources.nightscout();
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for category in EventCategory::ALL {
        match nightscout.last_uploaded_entry(category) {
            Ok(entry) => entries.push((category, entry)),
            Err(e) => failures.push(format!("{}: {}", category.label(), e)),
        }
    }

    if !failures.is_empty() {
        return Err(ClientError::Other(failures.join("; ")));
    }
    Ok(LastUploads { entries })
}

impl fmt::Display for LastUploads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (category, entry)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match entry {
                Some(value) => write!(f, "{}={}", category.label(), value)?,
                None => write!(f, "{}=none", category.label())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_uploads_display() {
        let uploads = LastUploads {
            entries: vec![
                (EventCategory::Basal, Some(serde_json::json!({"rate": 0.8}))),
                (EventCategory::Bolus, None),
            ],
        };
        assert_eq!(uploads.to_string(), r#"basal={"rate":0.8}, bolus=none"#);
    }

    #[test]
    fn test_probe_labels_are_unique() {
        for (i, label) in PROBES.iter().enumerate() {
            assert!(!PROBES[i + 1..].contains(label), "duplicate label {}", label);
        }
    }
}
