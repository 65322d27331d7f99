use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "TCSYNC_CONFIG";

/// Timezone used when neither the config file nor the environment sets one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// The required settings, each with the example value shipped in the
/// sample configuration. A setting still holding that value was never
/// filled in by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    TconnectEmail,
    TconnectPassword,
    PumpSerialNumber,
    NsUrl,
    NsSecret,
}

impl Setting {
    /// Validation order.
    pub const REQUIRED: [Setting; 5] = [
        Setting::TconnectEmail,
        Setting::TconnectPassword,
        Setting::PumpSerialNumber,
        Setting::NsUrl,
        Setting::NsSecret,
    ];

    /// Name used in the environment and in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Setting::TconnectEmail => "TCONNECT_EMAIL",
            Setting::TconnectPassword => "TCONNECT_PASSWORD",
            Setting::PumpSerialNumber => "PUMP_SERIAL_NUMBER",
            Setting::NsUrl => "NS_URL",
            Setting::NsSecret => "NS_SECRET",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Setting::TconnectEmail => "email@email.com",
            Setting::TconnectPassword => "password",
            Setting::PumpSerialNumber => "11111111",
            Setting::NsUrl => "https://yournightscouturl/",
            Setting::NsSecret => "apisecret",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSettings {
    pub tconnect_email: String,
    pub tconnect_password: String,
    pub pump_serial_number: String,
    pub ns_url: String,
    pub ns_secret: String,
    pub timezone_name: String,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            tconnect_email: Setting::TconnectEmail.placeholder().to_string(),
            tconnect_password: Setting::TconnectPassword.placeholder().to_string(),
            pump_serial_number: Setting::PumpSerialNumber.placeholder().to_string(),
            ns_url: Setting::NsUrl.placeholder().to_string(),
            ns_secret: Setting::NsSecret.placeholder().to_string(),
            timezone_name: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl ConfigSettings {
    /// Load settings the way the CLI does: resolve the file, read it if
    /// present, then apply environment overrides.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        Self::load_with_env(explicit_path, |name| std::env::var(name).ok())
    }

    /// [`ConfigSettings::load`] with the environment supplied by `env`.
    /// `TCSYNC_CONFIG` is consulted only when no explicit path is given.
    pub fn load_with_env<F>(explicit_path: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = env(CONFIG_PATH_ENV);
        let requested = explicit_path.or(env_path.as_deref());
        let path = resolve_config_path(requested)?;

        if requested.is_some() && !path.exists() {
            return Err(Error::ConfigNotFound(path));
        }

        let mut settings = Self::load_from(&path)?;
        settings.apply_overrides(env);
        Ok(settings)
    }

    /// Read a TOML file. A missing file yields the placeholder defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: ConfigSettings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Overlay values found through `lookup`, keyed by the setting name
    /// (`TCONNECT_EMAIL`, ..., `TIMEZONE_NAME`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for setting in Setting::REQUIRED {
            if let Some(value) = lookup(setting.name()) {
                *self.value_mut(setting) = value;
            }
        }
        if let Some(tz) = lookup("TIMEZONE_NAME") {
            self.timezone_name = tz;
        }
    }

    pub fn value(&self, setting: Setting) -> &str {
        match setting {
            Setting::TconnectEmail => &self.tconnect_email,
            Setting::TconnectPassword => &self.tconnect_password,
            Setting::PumpSerialNumber => &self.pump_serial_number,
            Setting::NsUrl => &self.ns_url,
            Setting::NsSecret => &self.ns_secret,
        }
    }

    fn value_mut(&mut self, setting: Setting) -> &mut String {
        match setting {
            Setting::TconnectEmail => &mut self.tconnect_email,
            Setting::TconnectPassword => &mut self.tconnect_password,
            Setting::PumpSerialNumber => &mut self.pump_serial_number,
            Setting::NsUrl => &mut self.ns_url,
            Setting::NsSecret => &mut self.ns_secret,
        }
    }

    /// True when the setting is empty or still equals its placeholder.
    pub fn is_unset(&self, setting: Setting) -> bool {
        let value = self.value(setting);
        value.is_empty() || value == setting.placeholder()
    }

    /// Required settings that still need to be configured, in validation order.
    pub fn unset_settings(&self) -> Vec<Setting> {
        Setting::REQUIRED
            .into_iter()
            .filter(|setting| self.is_unset(*setting))
            .collect()
    }
}

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. Platform config directory (`<config_dir>/tcsync/config.toml`)
/// 3. ~/.tcsync/config.toml (fallback for systems without one)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("tcsync").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".tcsync").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or config directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}
