use super::{Http, send_json};
use serde_json::Value;
use sha1::{Digest, Sha1};
use tcsync_runtime::{ClientError, ClientResult, EventCategory, NightscoutApi};

/// `enteredBy` value the synchronizer stamps on every treatment it uploads.
pub const ENTERED_BY: &str = "Pump (tconnectsync)";

/// Nightscout REST v1 client.
pub struct NightscoutClient {
    http: Http,
    base_url: String,
    api_secret: String,
}

impl NightscoutClient {
    pub(crate) fn new(http: Http, url: &str, secret: &str) -> Self {
        Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            api_secret: hash_secret(secret),
        }
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "nightscout request");

        let request = self
            .http
            .client()?
            .get(url)
            .header("api-secret", &self.api_secret)
            .header("Accept", "application/json")
            .query(query);
        send_json(request)
    }
}

/// Nightscout expects the hex SHA-1 of API_SECRET, not the secret itself.
fn hash_secret(secret: &str) -> String {
    hex::encode(Sha1::digest(secret.as_bytes()))
}

impl NightscoutApi for NightscoutClient {
    fn api_status(&self) -> ClientResult<Value> {
        self.get("/api/v1/status.json", &[])
    }

    fn last_uploaded_entry(&self, category: EventCategory) -> ClientResult<Option<Value>> {
        let treatments = self.get(
            "/api/v1/treatments",
            &[
                ("count", "1"),
                ("find[enteredBy]", ENTERED_BY),
                ("find[eventType]", category.event_type()),
            ],
        )?;

        match treatments {
            Value::Array(items) => Ok(items.into_iter().next()),
            other => Err(ClientError::Decode(format!(
                "expected a list of treatments, got {}",
                other
            ))),
        }
    }
}
