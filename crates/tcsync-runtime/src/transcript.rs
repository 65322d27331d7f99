//! Ordered two-sink log.
//!
//! Every record lands in the buffer. The console echo receives `Always`
//! records, plus `Verbose` records when verbosity is on. The buffer is the
//! transcript written to the report file, so verbosity never changes it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    Verbose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub text: String,
    pub visibility: Visibility,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Console side of the transcript.
pub trait Echo {
    fn line(&mut self, text: &str);
}

/// Drops everything. Used when nothing should reach the console.
pub struct NoEcho;

impl Echo for NoEcho {
    fn line(&mut self, _text: &str) {}
}

pub struct Transcript {
    records: Vec<LogRecord>,
    verbose: bool,
    echo: Box<dyn Echo>,
}

impl Transcript {
    pub fn new(verbose: bool, echo: Box<dyn Echo>) -> Self {
        Self {
            records: Vec::new(),
            verbose,
            echo,
        }
    }

    /// Record and always echo.
    pub fn log(&mut self, text: impl Into<String>) {
        self.push(text.into(), Visibility::Always);
    }

    /// Record, echoing only in verbose mode.
    pub fn debug(&mut self, text: impl Into<String>) {
        self.push(text.into(), Visibility::Verbose);
    }

    /// Echo without recording. For console-only guidance.
    pub fn notice(&mut self, text: &str) {
        self.echo.line(text);
    }

    fn push(&mut self, text: String, visibility: Visibility) {
        if visibility == Visibility::Always || self.verbose {
            self.echo.line(&text);
        }
        self.records.push(LogRecord { text, visibility });
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// The buffer as it is written to disk: one line per record.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.text);
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("records", &self.records.len())
            .field("verbose", &self.verbose)
            .finish()
    }
}
