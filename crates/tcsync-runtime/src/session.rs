use crate::probe::{self, ProbeOutcome, ProbeResult};
use crate::transcript::{Echo, Transcript};
use chrono::NaiveDateTime;
use std::fmt::Display;
use tcsync_core::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Attempting,
    Succeeded,
    Failed,
}

/// Where a run currently is. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    ConfigChecked,
    Probing { index: usize, state: ProbeState },
    Summarized,
    Written,
    Done,
}

/// State of a single check run: inputs, the error tally and the transcript.
#[derive(Debug)]
pub struct CheckSession {
    range: TimeRange,
    started_at: NaiveDateTime,
    errors: usize,
    probes_run: usize,
    stage: Stage,
    transcript: Transcript,
}

impl CheckSession {
    pub fn new(
        range: TimeRange,
        started_at: NaiveDateTime,
        verbose: bool,
        echo: Box<dyn Echo>,
    ) -> Self {
        Self {
            range,
            started_at,
            errors: 0,
            probes_run: 0,
            stage: Stage::Started,
            transcript: Transcript::new(verbose, echo),
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn probes_run(&self) -> usize {
        self.probes_run
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.transcript.log(text);
    }

    pub fn debug(&mut self, text: impl Into<String>) {
        self.transcript.debug(text);
    }

    pub fn notice(&mut self, text: &str) {
        self.transcript.notice(text);
    }

    /// Count one configuration violation or probe failure.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub(crate) fn advance(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "check stage");
        self.stage = next;
    }

    /// Invoke one capability behind its own fault boundary and record the
    /// outcome. Returns whether it succeeded.
    pub fn probe<T, E, F>(&mut self, label: &str, operation: F) -> bool
    where
        T: Display,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let index = self.probes_run;
        self.probes_run += 1;

        self.log(format!("Querying {}...", label));
        self.advance(Stage::Probing {
            index,
            state: ProbeState::Attempting,
        });

        let result = probe::invoke(label, operation);
        let succeeded = result.succeeded();
        self.record_probe(result);

        let state = if succeeded {
            ProbeState::Succeeded
        } else {
            ProbeState::Failed
        };
        self.advance(Stage::Probing { index, state });
        succeeded
    }

    /// Log a probe outcome: payloads are verbose-only, failures are always
    /// shown and counted.
    pub fn record_probe(&mut self, result: ProbeResult) {
        match result.outcome {
            ProbeOutcome::Succeeded { payload } => {
                self.debug(format!("{}: {}", result.source, payload));
            }
            ProbeOutcome::Failed { message } => {
                tracing::debug!(source = %result.source, %message, "probe failed");
                self.log(format!(
                    "Error occurred querying {}: {}",
                    result.source, message
                ));
                self.record_error();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{NoEcho, Visibility};
    use chrono::NaiveDate;

    fn session() -> CheckSession {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let range = TimeRange::from_dates(day, day).unwrap();
        CheckSession::new(range, range.end, false, Box::new(NoEcho))
    }

    #[test]
    fn test_successful_probe_logs_verbose_payload() {
        let mut session = session();
        let ok = session.probe("Nightscout status", || Ok::<_, String>("up"));

        assert!(ok);
        assert_eq!(session.errors(), 0);
        let last = session.transcript().records().last().unwrap();
        assert_eq!(last.text, "Nightscout status: up");
        assert_eq!(last.visibility, Visibility::Verbose);
    }

    #[test]
    fn test_failed_probe_counts_once_and_is_always_visible() {
        let mut session = session();
        let ok = session.probe("Nightscout status", || Err::<String, _>("HTTP 401"));

        assert!(!ok);
        assert_eq!(session.errors(), 1);
        let last = session.transcript().records().last().unwrap();
        assert_eq!(last.text, "Error occurred querying Nightscout status: HTTP 401");
        assert_eq!(last.visibility, Visibility::Always);
        assert_eq!(
            session.stage(),
            Stage::Probing {
                index: 0,
                state: ProbeState::Failed
            }
        );
    }

    #[test]
    fn test_probe_indexes_advance() {
        let mut session = session();
        session.probe("a", || Ok::<_, String>(1));
        session.probe("b", || Ok::<_, String>(2));

        assert_eq!(session.probes_run(), 2);
        assert_eq!(
            session.stage(),
            Stage::Probing {
                index: 1,
                state: ProbeState::Succeeded
            }
        );
    }
}
