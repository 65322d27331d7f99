//! Blocking HTTP implementations of the data-source traits.

mod nightscout;
mod tconnect;

pub use nightscout::NightscoutClient;
pub use tconnect::TconnectClient;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use tcsync_core::ConfigSettings;
use tcsync_runtime::{
    AndroidApi, ClientError, ClientResult, ControlIqApi, DataSources, NightscoutApi, Ws2Api,
};

/// Longest error body kept in a failure message.
const MAX_ERROR_BODY: usize = 300;

/// Shared HTTP client. Construction failures are kept and reported by the
/// first request instead of aborting the run.
#[derive(Clone)]
pub(crate) struct Http {
    client: Result<Client, String>,
}

impl Http {
    pub(crate) fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("tcsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| error_chain(&e));
        Self { client }
    }

    pub(crate) fn client(&self) -> ClientResult<&Client> {
        self.client
            .as_ref()
            .map_err(|msg| ClientError::Http(msg.clone()))
    }
}

/// Send a request and reject non-success statuses.
pub(crate) fn send(request: RequestBuilder) -> ClientResult<Response> {
    let response = request
        .send()
        .map_err(|e| ClientError::Http(error_chain(&e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: truncate(body.trim(), MAX_ERROR_BODY),
        });
    }

    tracing::debug!(url = %response.url(), %status, "response");
    Ok(response)
}

pub(crate) fn send_json(request: RequestBuilder) -> ClientResult<Value> {
    send(request)?
        .json::<Value>()
        .map_err(|e| ClientError::Decode(error_chain(&e)))
}

pub(crate) fn send_text(request: RequestBuilder) -> ClientResult<String> {
    send(request)?
        .text()
        .map_err(|e| ClientError::Decode(error_chain(&e)))
}

/// Render an error followed by every cause beneath it, `outer: inner: root`.
/// Causes whose text the outer message already carries are skipped.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// The HTTP-backed sources used by `tcsync check`.
pub struct HttpSources {
    tconnect: TconnectClient,
    nightscout: NightscoutClient,
}

impl HttpSources {
    pub fn connect(settings: &ConfigSettings) -> Self {
        let http = Http::new();
        Self {
            tconnect: TconnectClient::new(
                http.clone(),
                &settings.tconnect_email,
                &settings.tconnect_password,
            ),
            nightscout: NightscoutClient::new(http, &settings.ns_url, &settings.ns_secret),
        }
    }
}

impl DataSources for HttpSources {
    fn controliq(&self) -> &dyn ControlIqApi {
        &self.tconnect
    }

    fn ws2(&self) -> &dyn Ws2Api {
        &self.tconnect
    }

    fn android(&self) -> &dyn AndroidApi {
        &self.tconnect
    }

    fn nightscout(&self) -> &dyn NightscoutApi {
        &self.nightscout
    }
}
