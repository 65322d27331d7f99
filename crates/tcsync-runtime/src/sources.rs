//! Capabilities the check consumes from each remote service.
//!
//! The runner only sees these traits. The CLI provides HTTP-backed
//! implementations; tests provide scripted ones.

use serde_json::Value;
use std::fmt;
use tcsync_core::TimeRange;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Any failure raised by a data-source call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection, TLS or other transport failure
    Http(String),

    /// The service answered with a non-success status
    Status { status: u16, body: String },

    /// The response body could not be decoded
    Decode(String),

    /// Login was rejected or no session could be established
    Auth(String),

    Other(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(msg) => write!(f, "HTTP error: {}", msg),
            ClientError::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP {}", status)
            }
            ClientError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            ClientError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ClientError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            ClientError::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Treatment categories whose most recent upload is looked up in Nightscout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Basal,
    Bolus,
}

impl EventCategory {
    pub const ALL: [EventCategory; 2] = [EventCategory::Basal, EventCategory::Bolus];

    /// Nightscout `eventType` used when uploading this category.
    pub fn event_type(self) -> &'static str {
        match self {
            EventCategory::Basal => "Temp Basal",
            EventCategory::Bolus => "Combo Bolus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Basal => "basal",
            EventCategory::Bolus => "bolus",
        }
    }
}

/// t:connect ControlIQ web API.
pub trait ControlIqApi {
    fn dashboard_summary(&self, range: &TimeRange) -> ClientResult<Value>;
    fn therapy_timeline(&self, range: &TimeRange) -> ClientResult<Value>;
}

/// t:connect WS2 API.
pub trait Ws2Api {
    fn basaliq_tech(&self, range: &TimeRange) -> ClientResult<Value>;

    /// Raw CSV body of the therapy timeline export.
    fn therapy_timeline_csv(&self, range: &TimeRange) -> ClientResult<String>;
}

/// t:connect mobile (Android) API.
pub trait AndroidApi {
    fn user_profile(&self) -> ClientResult<Value>;
    fn last_event_uploaded(&self, serial_number: &str) -> ClientResult<Value>;
    fn therapy_events(&self, range: &TimeRange) -> ClientResult<Value>;
}

/// Nightscout, the service synchronized data is uploaded to.
pub trait NightscoutApi {
    fn api_status(&self) -> ClientResult<Value>;

    /// Most recent treatment of `category` uploaded by the synchronizer,
    /// or `None` when nothing has been uploaded yet.
    fn last_uploaded_entry(&self, category: EventCategory) -> ClientResult<Option<Value>>;
}

/// The full set of sources a check run probes.
pub trait DataSources {
    fn controliq(&self) -> &dyn ControlIqApi;
    fn ws2(&self) -> &dyn Ws2Api;
    fn android(&self) -> &dyn AndroidApi;
    fn nightscout(&self) -> &dyn NightscoutApi;
}
