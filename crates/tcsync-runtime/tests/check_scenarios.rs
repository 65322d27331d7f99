use std::cell::Cell;
use std::path::PathBuf;
use tcsync_core::{ConfigSettings, Error as ConfigError, Setting};
use tcsync_runtime::check::{SUMMARY_FAILED, SUMMARY_OK};
use tcsync_runtime::{
    CheckOutcome, CheckSession, ClientError, PROBES, REPORT_FILE_NAME, ReportWriter, Stage,
    Visibility, run_check,
};
use tcsync_testing::{Call, ScriptedSources, configured_settings, new_session};
use tempfile::TempDir;

fn run(
    session: &mut CheckSession,
    settings: ConfigSettings,
    sources: &ScriptedSources,
    dir: &TempDir,
) -> CheckOutcome {
    run_check(
        session,
        Ok(settings),
        |_| sources,
        &ReportWriter::new(dir.path()),
    )
    .expect("report should be written")
}

fn lines(session: &CheckSession) -> Vec<String> {
    session
        .transcript()
        .records()
        .iter()
        .map(|r| r.text.clone())
        .collect()
}

fn with_placeholder(mut settings: ConfigSettings, setting: Setting) -> ConfigSettings {
    settings.apply_overrides(|name| {
        (name == setting.name()).then(|| setting.placeholder().to_string())
    });
    settings
}

/// Position of the line reporting on `label`, success or failure.
fn probe_line(lines: &[String], label: &str) -> Option<usize> {
    let success = format!("{}: ", label);
    let failure = format!("Error occurred querying {}: ", label);
    lines
        .iter()
        .position(|l| l.starts_with(&success) || l.starts_with(&failure))
}

#[test]
fn test_all_healthy_reports_no_errors() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);

    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.errors, 0);
    assert!(outcome.passed());
    assert!(outcome.config_loaded);
    assert_eq!(sources.calls(), Call::ALL.to_vec());
    assert!(lines(&session).contains(&SUMMARY_OK.to_string()));
    assert_eq!(session.stage(), Stage::Done);
    assert_eq!(session.probes_run(), PROBES.len());
}

#[test]
fn test_placeholder_email_is_the_only_error() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);
    let settings = with_placeholder(configured_settings(), Setting::TconnectEmail);

    let outcome = run(&mut session, settings, &sources, &dir);

    assert_eq!(outcome.errors, 1);
    let lines = lines(&session);
    assert!(lines.contains(&"Error: You have not specified a TCONNECT_EMAIL".to_string()));
    assert!(lines.contains(&SUMMARY_FAILED.to_string()));
    assert!(!lines.contains(&SUMMARY_OK.to_string()));
}

#[test]
fn test_dashboard_failure_does_not_stop_later_probes() {
    let dir = TempDir::new().unwrap();
    let sources =
        ScriptedSources::healthy().failing(Call::DashboardSummary, "502 Bad Gateway from tdcservices");
    let (mut session, _echo) = new_session(false);

    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.errors, 1);
    assert_eq!(sources.calls(), Call::ALL.to_vec());

    let lines = lines(&session);
    assert!(lines.contains(
        &"Error occurred querying ControlIQ dashboard summary: 502 Bad Gateway from tdcservices"
            .to_string()
    ));

    let positions: Vec<usize> = PROBES
        .iter()
        .map(|label| probe_line(&lines, label).unwrap_or_else(|| panic!("{} missing", label)))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "probe results must appear in call order");
}

#[test]
fn test_config_load_failure_still_writes_report() {
    let dir = TempDir::new().unwrap();
    let connected = Cell::new(false);
    let sources = ScriptedSources::healthy();
    let (mut session, echo) = new_session(false);

    let outcome = run_check(
        &mut session,
        Err(ConfigError::ConfigNotFound(PathBuf::from("/etc/tcsync/config.toml"))),
        |_| {
            connected.set(true);
            &sources
        },
        &ReportWriter::new(dir.path()),
    )
    .unwrap();

    assert!(!connected.get(), "sources need loaded settings");
    assert!(sources.calls().is_empty());
    assert!(!outcome.config_loaded);
    assert_eq!(outcome.errors, 1);
    assert_eq!(session.stage(), Stage::Done);

    let report = std::fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("Error: Unable to load config file"));
    assert!(report.contains("Configuration file not found: /etc/tcsync/config.toml"));
    assert!(report.contains(SUMMARY_FAILED));
    assert!(echo.contains("Created file"));
}

#[test]
fn test_each_probe_failure_counts_exactly_once() {
    for call in Call::ALL {
        let dir = TempDir::new().unwrap();
        let message = format!("scripted failure for {:?}", call);
        let sources = ScriptedSources::healthy().failing(call, &message);
        let (mut session, _echo) = new_session(false);

        let outcome = run(&mut session, configured_settings(), &sources, &dir);

        assert_eq!(outcome.errors, 1, "{:?}", call);
        let label = PROBES[call.probe_index()];
        let detail = match call {
            Call::LastUploadedBasal => format!("basal: {}", message),
            Call::LastUploadedBolus => format!("bolus: {}", message),
            _ => message.clone(),
        };
        let expected = format!("Error occurred querying {}: {}", label, detail);
        let record = session
            .transcript()
            .records()
            .iter()
            .find(|r| r.text == expected)
            .unwrap_or_else(|| panic!("missing failure line for {:?}", call));
        assert_eq!(record.visibility, Visibility::Always);

        // Every probe after the failing one still ran.
        assert!(sources.calls().contains(&Call::ApiStatus));
        assert!(sources.calls().contains(&Call::LastUploadedBasal));
    }
}

#[test]
fn test_successful_probes_are_verbose_only() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);

    run(&mut session, configured_settings(), &sources, &dir);

    for label in PROBES {
        let prefix = format!("{}: ", label);
        let record = session
            .transcript()
            .records()
            .iter()
            .find(|r| r.text.starts_with(&prefix))
            .unwrap_or_else(|| panic!("no success line for {}", label));
        assert_eq!(record.visibility, Visibility::Verbose, "{}", label);
    }
}

#[test]
fn test_error_count_is_violations_plus_failed_probes() {
    let fault_sets: [&[Call]; 4] = [
        &[],
        &[Call::TherapyTimelineCsv],
        &[Call::DashboardSummary, Call::UserProfile, Call::ApiStatus],
        // Both lookups share one probe and count once together.
        &[Call::LastUploadedBasal, Call::LastUploadedBolus],
    ];
    let failed_probes = [0, 1, 3, 1];

    for mask in 0u32..32 {
        for (faults, expected_failures) in fault_sets.iter().zip(failed_probes) {
            let mut settings = configured_settings();
            for (bit, setting) in Setting::REQUIRED.into_iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    settings = with_placeholder(settings, setting);
                }
            }

            let mut sources = ScriptedSources::healthy();
            for call in faults.iter() {
                sources = sources.failing(*call, "down");
            }

            let dir = TempDir::new().unwrap();
            let (mut session, _echo) = new_session(false);
            let outcome = run(&mut session, settings, &sources, &dir);

            assert_eq!(
                outcome.errors,
                mask.count_ones() as usize + expected_failures,
                "mask {:05b}, faults {:?}",
                mask,
                faults
            );
        }
    }
}

#[test]
fn test_report_is_independent_of_verbosity() {
    let quiet_dir = TempDir::new().unwrap();
    let verbose_dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy().failing(Call::TherapyEvents, "HTTP 500");

    let (mut quiet, quiet_echo) = new_session(false);
    let (mut verbose, verbose_echo) = new_session(true);
    let quiet_outcome = run(&mut quiet, configured_settings(), &sources, &quiet_dir);
    let verbose_outcome = run(&mut verbose, configured_settings(), &sources, &verbose_dir);

    let quiet_report = std::fs::read_to_string(quiet_outcome.report_path).unwrap();
    let verbose_report = std::fs::read_to_string(verbose_outcome.report_path).unwrap();
    assert_eq!(quiet_report, verbose_report);
    assert_eq!(quiet_report, quiet.transcript().render());
    assert!(quiet_report.contains("Nightscout status: "));

    assert!(!quiet_echo.contains("Nightscout status: "));
    assert!(quiet_echo.lines().len() < verbose_echo.lines().len());
    assert!(verbose_echo.contains("Nightscout status: "));
    assert!(quiet_echo.contains("Error occurred querying Android therapy events: HTTP 500"));
}

#[test]
fn test_report_file_is_replaced_each_run() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join(REPORT_FILE_NAME);
    std::fs::write(&report, "stale content from a previous run\n").unwrap();

    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);
    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.report_path, report);
    let content = std::fs::read_to_string(report).unwrap();
    assert!(!content.contains("stale content"));
    assert!(content.starts_with("tcsync version "));
}

#[test]
fn test_panicking_source_is_contained() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy().panicking(Call::ApiStatus, "status decoder bug");
    let (mut session, _echo) = new_session(false);

    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.errors, 1);
    assert!(
        lines(&session)
            .iter()
            .any(|l| l.starts_with("Error occurred querying Nightscout status: panicked:"))
    );
    assert!(sources.calls().contains(&Call::LastUploadedBolus));
}

#[test]
fn test_basal_failure_still_looks_up_bolus() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy()
        .failing(Call::LastUploadedBasal, "basal lookup timed out");
    let (mut session, _echo) = new_session(false);

    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.errors, 1);
    assert!(sources.calls().contains(&Call::LastUploadedBolus));
    assert!(lines(&session).contains(
        &"Error occurred querying Nightscout last uploaded entries: basal: basal lookup timed out"
            .to_string()
    ));
}

#[test]
fn test_both_lookup_failures_are_one_error() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy()
        .failing(Call::LastUploadedBasal, "HTTP 500")
        .failing(Call::LastUploadedBolus, "HTTP 502");
    let (mut session, _echo) = new_session(false);

    let outcome = run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(outcome.errors, 1);
    assert!(lines(&session).contains(
        &"Error occurred querying Nightscout last uploaded entries: basal: HTTP 500; bolus: HTTP 502"
            .to_string()
    ));
}

#[test]
fn test_typed_client_errors_are_rendered() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy().failing_with(
        Call::UserProfile,
        ClientError::Status {
            status: 401,
            body: "invalid_grant".to_string(),
        },
    );
    let (mut session, _echo) = new_session(false);

    run(&mut session, configured_settings(), &sources, &dir);

    assert!(
        lines(&session)
            .contains(&"Error occurred querying Android user profile: HTTP 401: invalid_grant".to_string())
    );
}

#[test]
fn test_pump_serial_is_passed_to_last_event_lookup() {
    let dir = TempDir::new().unwrap();
    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);

    run(&mut session, configured_settings(), &sources, &dir);

    assert_eq!(sources.serials(), vec!["90551234".to_string()]);
}

#[test]
fn test_unwritable_report_is_fatal() {
    let sources = ScriptedSources::healthy();
    let (mut session, _echo) = new_session(false);

    let result = run_check(
        &mut session,
        Ok(configured_settings()),
        |_| &sources,
        &ReportWriter::new("/nonexistent/tcsync"),
    );

    assert!(result.is_err());
    assert_eq!(session.stage(), Stage::Summarized);
}
