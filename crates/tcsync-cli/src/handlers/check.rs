use crate::args::CheckArgs;
use crate::clients::HttpSources;
use crate::ui::ConsoleEcho;
use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use tcsync_core::{ConfigSettings, TimeRange};
use tcsync_runtime::{CheckSession, ReportWriter, run_check};

pub fn handle(config_path: Option<&str>, args: &CheckArgs) -> Result<()> {
    let now = Local::now().naive_local();
    let range = resolve_range(now, args.days, args.start, args.end)?;

    let loaded = ConfigSettings::load(config_path);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "configuration could not be loaded");
    }

    let mut session = CheckSession::new(range, now, args.verbose, Box::new(ConsoleEcho::new()));
    let writer = ReportWriter::new(&args.output_dir);

    let outcome = run_check(&mut session, loaded, HttpSources::connect, &writer)
        .context("Unable to save the diagnostic report")?;

    if !outcome.passed() {
        anyhow::bail!(
            "{} check(s) failed; details are in {}",
            outcome.errors,
            outcome.report_path.display()
        );
    }

    Ok(())
}

/// Explicit dates win over `--days`. `--end` alone anchors the `--days`
/// window on that day.
fn resolve_range(
    now: NaiveDateTime,
    days: u32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<TimeRange> {
    let range = match (start, end) {
        (Some(start), end) => TimeRange::from_dates(start, end.unwrap_or(now.date()))?,
        (None, Some(end)) => {
            let start = end
                .checked_sub_days(Days::new(u64::from(days)))
                .context("--days reaches before the earliest supported date")?;
            TimeRange::from_dates(start, end)?
        }
        (None, None) => TimeRange::last_days(now, days)?,
    };
    Ok(range)
}
