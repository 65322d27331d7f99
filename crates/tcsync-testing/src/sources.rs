//! Scripted implementations of every data-source trait.

use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use tcsync_core::TimeRange;
use tcsync_runtime::{
    AndroidApi, ClientError, ClientResult, ControlIqApi, DataSources, EventCategory,
    NightscoutApi, Ws2Api,
};

/// One capability call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    DashboardSummary,
    TherapyTimeline,
    BasaliqTech,
    TherapyTimelineCsv,
    UserProfile,
    LastEventUploaded,
    TherapyEvents,
    ApiStatus,
    LastUploadedBasal,
    LastUploadedBolus,
}

impl Call {
    /// Calls a full check makes, in order.
    pub const ALL: [Call; 10] = [
        Call::DashboardSummary,
        Call::TherapyTimeline,
        Call::BasaliqTech,
        Call::TherapyTimelineCsv,
        Call::UserProfile,
        Call::LastEventUploaded,
        Call::TherapyEvents,
        Call::ApiStatus,
        Call::LastUploadedBasal,
        Call::LastUploadedBolus,
    ];

    /// Index of the probe this call belongs to. Both Nightscout
    /// last-upload lookups share the final probe.
    pub fn probe_index(self) -> usize {
        match self {
            Call::LastUploadedBolus => 8,
            other => Call::ALL
                .iter()
                .position(|c| *c == other)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Fault {
    Error(ClientError),
    Panic(String),
}

/// Data sources that answer every call with canned payloads unless told
/// to fail. Every call is recorded, including failing ones.
#[derive(Debug, Default)]
pub struct ScriptedSources {
    faults: HashMap<Call, Fault>,
    calls: RefCell<Vec<Call>>,
    serials: RefCell<Vec<String>>,
}

impl ScriptedSources {
    pub fn healthy() -> Self {
        Self::default()
    }

    /// Make `call` return a [`ClientError::Other`] carrying `message`.
    pub fn failing(mut self, call: Call, message: &str) -> Self {
        self.faults
            .insert(call, Fault::Error(ClientError::Other(message.to_string())));
        self
    }

    pub fn failing_with(mut self, call: Call, error: ClientError) -> Self {
        self.faults.insert(call, Fault::Error(error));
        self
    }

    /// Make `call` panic with `message`.
    pub fn panicking(mut self, call: Call, message: &str) -> Self {
        self.faults.insert(call, Fault::Panic(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Serial numbers passed to `last_event_uploaded`.
    pub fn serials(&self) -> Vec<String> {
        self.serials.borrow().clone()
    }

    fn answer<T>(&self, call: Call, payload: T) -> ClientResult<T> {
        self.calls.borrow_mut().push(call);
        match self.faults.get(&call) {
            None => Ok(payload),
            Some(Fault::Error(err)) => Err(err.clone()),
            Some(Fault::Panic(message)) => panic!("{}", message),
        }
    }
}

impl ControlIqApi for ScriptedSources {
    fn dashboard_summary(&self, range: &TimeRange) -> ClientResult<Value> {
        self.answer(
            Call::DashboardSummary,
            json!({"averageReading": 142, "timeInUsePercent": 98, "start": range.start_date().to_string()}),
        )
    }

    fn therapy_timeline(&self, _range: &TimeRange) -> ClientResult<Value> {
        self.answer(Call::TherapyTimeline, json!({"events": []}))
    }
}

impl Ws2Api for ScriptedSources {
    fn basaliq_tech(&self, _range: &TimeRange) -> ClientResult<Value> {
        self.answer(Call::BasaliqTech, json!({"softwareUpdateAvailable": false}))
    }

    fn therapy_timeline_csv(&self, _range: &TimeRange) -> ClientResult<String> {
        self.answer(
            Call::TherapyTimelineCsv,
            "Type,EventDateTime,BG\nEGV,2024-05-01T08:00:00,120".to_string(),
        )
    }
}

impl AndroidApi for ScriptedSources {
    fn user_profile(&self) -> ClientResult<Value> {
        self.answer(Call::UserProfile, json!({"firstName": "Test"}))
    }

    fn last_event_uploaded(&self, serial_number: &str) -> ClientResult<Value> {
        self.serials.borrow_mut().push(serial_number.to_string());
        self.answer(Call::LastEventUploaded, json!({"maxPumpEventIndex": 4242}))
    }

    fn therapy_events(&self, _range: &TimeRange) -> ClientResult<Value> {
        self.answer(Call::TherapyEvents, json!({"event": []}))
    }
}

impl NightscoutApi for ScriptedSources {
    fn api_status(&self) -> ClientResult<Value> {
        self.answer(Call::ApiStatus, json!({"status": "ok", "version": "15.0.2"}))
    }

    fn last_uploaded_entry(&self, category: EventCategory) -> ClientResult<Option<Value>> {
        let call = match category {
            EventCategory::Basal => Call::LastUploadedBasal,
            EventCategory::Bolus => Call::LastUploadedBolus,
        };
        self.answer(
            call,
            Some(json!({"eventType": category.event_type(), "created_at": "2024-05-01T07:55:00Z"})),
        )
    }
}

impl DataSources for ScriptedSources {
    fn controliq(&self) -> &dyn ControlIqApi {
        self
    }

    fn ws2(&self) -> &dyn Ws2Api {
        self
    }

    fn android(&self) -> &dyn AndroidApi {
        self
    }

    fn nightscout(&self) -> &dyn NightscoutApi {
        self
    }
}

/// Lets a test keep ownership of the scripted sources while the runner
/// borrows them.
impl DataSources for &ScriptedSources {
    fn controliq(&self) -> &dyn ControlIqApi {
        *self
    }

    fn ws2(&self) -> &dyn Ws2Api {
        *self
    }

    fn android(&self) -> &dyn AndroidApi {
        *self
    }

    fn nightscout(&self) -> &dyn NightscoutApi {
        *self
    }
}
