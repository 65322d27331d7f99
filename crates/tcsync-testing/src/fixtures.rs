//! Ready-made inputs for check runs.

use chrono::NaiveDate;
use std::cell::RefCell;
use std::rc::Rc;
use tcsync_core::{ConfigSettings, TimeRange};
use tcsync_runtime::{CheckSession, Echo};

/// Console echo that keeps every line for later inspection. Clones share
/// the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedEcho {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CapturedEcho {
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }
}

impl Echo for CapturedEcho {
    fn line(&mut self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

/// Settings with every required value filled in.
pub fn configured_settings() -> ConfigSettings {
    ConfigSettings {
        tconnect_email: "operator@example.org".to_string(),
        tconnect_password: "correct-horse".to_string(),
        pump_serial_number: "90551234".to_string(),
        ns_url: "https://ns.example.org/".to_string(),
        ns_secret: "0123456789abcdef".to_string(),
        timezone_name: "America/Chicago".to_string(),
    }
}

/// 2024-05-01 00:00:00 through 2024-05-02 23:59:59.
pub fn fixed_range() -> TimeRange {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date");
    TimeRange::from_dates(start, end).expect("ordered range")
}

/// A session over [`fixed_range`] whose console output is captured.
pub fn new_session(verbose: bool) -> (CheckSession, CapturedEcho) {
    let echo = CapturedEcho::default();
    let range = fixed_range();
    let session = CheckSession::new(range, range.end, verbose, Box::new(echo.clone()));
    (session, echo)
}
