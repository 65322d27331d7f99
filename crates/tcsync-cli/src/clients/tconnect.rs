use super::{Http, send_json, send_text};
use chrono::NaiveDate;
use serde_json::Value;
use std::cell::OnceCell;
use tcsync_core::TimeRange;
use tcsync_runtime::{AndroidApi, ClientError, ClientResult, ControlIqApi, Ws2Api};

const TDC_BASE_URL: &str = "https://tdcservices.tandemdiabetes.com";
const CONTROLIQ_API: &str = "/tconnect/controliq/api";
const WS2_BASE_URL: &str = "https://tconnectws2.tandemdiabetes.com";
const TOKEN_PATH: &str = "/cloud/oauth2/token";
const TOKEN_SCOPE: &str = "cloud.account cloud.upload cloud.accountswrite cloud.email";

/// Credentials obtained from the login call.
#[derive(Debug, Clone)]
struct Login {
    access_token: String,
    user_guid: String,
}

/// Client for the three t:connect APIs. Logs in on first use and reuses the
/// token for every later call. A failed login is not cached, so each probe
/// reports its own authentication failure.
pub struct TconnectClient {
    http: Http,
    email: String,
    password: String,
    login: OnceCell<Login>,
}

impl TconnectClient {
    pub(crate) fn new(http: Http, email: &str, password: &str) -> Self {
        Self {
            http,
            email: email.to_string(),
            password: password.to_string(),
            login: OnceCell::new(),
        }
    }

    fn login(&self) -> ClientResult<&Login> {
        if let Some(login) = self.login.get() {
            return Ok(login);
        }

        tracing::debug!(email = %self.email, "t:connect login");
        let request = self
            .http
            .client()?
            .post(format!("{}{}", TDC_BASE_URL, TOKEN_PATH))
            .form(&[
                ("grant_type", "password"),
                ("username", self.email.as_str()),
                ("password", self.password.as_str()),
                ("scope", TOKEN_SCOPE),
            ]);
        let response = send_json(request).map_err(|e| match e {
            ClientError::Status { status, body } => {
                ClientError::Auth(format!("login rejected (HTTP {}): {}", status, body))
            }
            other => other,
        })?;

        let login = parse_login(&response).ok_or_else(|| {
            ClientError::Auth("login response carried no access token".to_string())
        })?;
        Ok(self.login.get_or_init(|| login))
    }

    fn get_json(&self, url: String, query: &[(&str, String)]) -> ClientResult<Value> {
        let login = self.login()?;
        let request = self
            .http
            .client()?
            .get(url)
            .bearer_auth(&login.access_token)
            .query(query);
        send_json(request)
    }
}

fn parse_login(response: &Value) -> Option<Login> {
    let access_token = response.get("access_token")?.as_str()?.to_string();
    let user_guid = response
        .get("user_guid")
        .or_else(|| response.pointer("/user/id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Login {
        access_token,
        user_guid,
    })
}

/// t:connect web APIs take dates as MM-DD-YYYY.
fn api_date(date: NaiveDate) -> String {
    date.format("%m-%d-%Y").to_string()
}

fn date_query(range: &TimeRange) -> [(&'static str, String); 2] {
    [
        ("startDate", api_date(range.start_date())),
        ("endDate", api_date(range.end_date())),
    ]
}

impl ControlIqApi for TconnectClient {
    fn dashboard_summary(&self, range: &TimeRange) -> ClientResult<Value> {
        let guid = self.login()?.user_guid.clone();
        self.get_json(
            format!("{}{}/summary/users/{}", TDC_BASE_URL, CONTROLIQ_API, guid),
            &date_query(range),
        )
    }

    fn therapy_timeline(&self, range: &TimeRange) -> ClientResult<Value> {
        let guid = self.login()?.user_guid.clone();
        self.get_json(
            format!("{}{}/therapytimeline/users/{}", TDC_BASE_URL, CONTROLIQ_API, guid),
            &date_query(range),
        )
    }
}

impl Ws2Api for TconnectClient {
    fn basaliq_tech(&self, range: &TimeRange) -> ClientResult<Value> {
        let guid = self.login()?.user_guid.clone();
        self.get_json(
            format!(
                "{}/basaliqtech/{}/{}/{}",
                WS2_BASE_URL,
                guid,
                api_date(range.start_date()),
                api_date(range.end_date())
            ),
            &[],
        )
    }

    fn therapy_timeline_csv(&self, range: &TimeRange) -> ClientResult<String> {
        let login = self.login()?;
        let url = format!(
            "{}/therapytimeline2csv/{}/{}/{}",
            WS2_BASE_URL,
            login.user_guid,
            api_date(range.start_date()),
            api_date(range.end_date())
        );
        let request = self
            .http
            .client()?
            .get(url)
            .bearer_auth(&login.access_token)
            .query(&[("format", "csv")]);
        send_text(request)
    }
}

impl AndroidApi for TconnectClient {
    fn user_profile(&self) -> ClientResult<Value> {
        self.get_json(
            format!("{}/cloud/usersettings/api/UserProfile", TDC_BASE_URL),
            &[],
        )
    }

    fn last_event_uploaded(&self, serial_number: &str) -> ClientResult<Value> {
        self.get_json(
            format!("{}/cloud/upload/getlasteventuploaded", TDC_BASE_URL),
            &[("sn", serial_number.to_string())],
        )
    }

    fn therapy_events(&self, range: &TimeRange) -> ClientResult<Value> {
        let guid = self.login()?.user_guid.clone();
        self.get_json(
            format!(
                "{}/cloud/therapyevents/api/TherapyEvents/{}/{}/false",
                TDC_BASE_URL,
                range.start_date(),
                range.end_date()
            ),
            &[("userId", guid)],
        )
    }
}
