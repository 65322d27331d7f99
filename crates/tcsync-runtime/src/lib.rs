// NOTE: Check Runner Rationale
//
// Why keep probing after a failure?
// - A missing credential or a dead endpoint rarely explains every symptom
// - The operator needs the state of *all* sources in a single transcript
// - Each probe is therefore its own fault boundary and never short-circuits the run
//
// Why write the transcript unconditionally?
// - The file is what gets attached to a support request
// - Verbose records always land in the file; the flag only gates console echo

pub mod check;
pub mod error;
pub mod probe;
pub mod report;
pub mod session;
pub mod sources;
pub mod transcript;
pub mod validator;

pub use check::{CheckOutcome, PROBES, run_check};
pub use error::{Error, Result};
pub use probe::{ProbeOutcome, ProbeResult, invoke};
pub use report::{REPORT_FILE_NAME, ReportWriter, SUPPORT_URL};
pub use session::{CheckSession, ProbeState, Stage};
pub use sources::{
    AndroidApi, ClientError, ClientResult, ControlIqApi, DataSources, EventCategory,
    NightscoutApi, Ws2Api,
};
pub use transcript::{Echo, LogRecord, NoEcho, Transcript, Visibility};
pub use validator::ConfigValidator;
