use crate::session::CheckSession;
use tcsync_core::{ConfigSettings, Setting};

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check every required setting, logging and counting each one that is
    /// empty or still holds its placeholder. Never stops early; returns the
    /// number of violations found.
    pub fn check(session: &mut CheckSession, settings: &ConfigSettings) -> usize {
        let mut violations = 0;

        for setting in Setting::REQUIRED {
            if settings.is_unset(setting) {
                session.log(format!("Error: You have not specified a {}", setting));
                session.record_error();
                violations += 1;
            }
        }

        session.log(format!("TIMEZONE_NAME: {}", settings.timezone_name));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::NoEcho;
    use chrono::NaiveDate;
    use tcsync_core::TimeRange;

    fn session() -> CheckSession {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let range = TimeRange::from_dates(day, day).unwrap();
        CheckSession::new(range, range.end, false, Box::new(NoEcho))
    }

    fn configured() -> ConfigSettings {
        ConfigSettings {
            tconnect_email: "me@example.org".to_string(),
            tconnect_password: "s3cret".to_string(),
            pump_serial_number: "90551234".to_string(),
            ns_url: "https://ns.example.org/".to_string(),
            ns_secret: "0123456789ab".to_string(),
            timezone_name: "Europe/Berlin".to_string(),
        }
    }

    fn lines(session: &CheckSession) -> Vec<String> {
        session
            .transcript()
            .records()
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    #[test]
    fn test_configured_settings_pass() {
        let mut session = session();
        let violations = ConfigValidator::check(&mut session, &configured());

        assert_eq!(violations, 0);
        assert_eq!(session.errors(), 0);
        assert_eq!(lines(&session), vec!["TIMEZONE_NAME: Europe/Berlin"]);
    }

    #[test]
    fn test_each_placeholder_is_reported_once() {
        for setting in Setting::REQUIRED {
            let mut settings = configured();
            settings.apply_overrides(|name| {
                (name == setting.name()).then(|| setting.placeholder().to_string())
            });

            let mut session = session();
            ConfigValidator::check(&mut session, &settings);

            assert_eq!(session.errors(), 1, "{} placeholder", setting);
            assert!(
                lines(&session)
                    .contains(&format!("Error: You have not specified a {}", setting)),
                "{} should be named",
                setting
            );
        }
    }

    #[test]
    fn test_each_empty_value_is_reported_once() {
        for setting in Setting::REQUIRED {
            let mut settings = configured();
            settings.apply_overrides(|name| (name == setting.name()).then(String::new));

            let mut session = session();
            ConfigValidator::check(&mut session, &settings);

            assert_eq!(session.errors(), 1, "{} empty", setting);
        }
    }

    #[test]
    fn test_all_checks_run_after_a_violation() {
        let mut session = session();
        let violations = ConfigValidator::check(&mut session, &ConfigSettings::default());

        assert_eq!(violations, 5);
        assert_eq!(session.errors(), 5);
        assert_eq!(
            lines(&session),
            vec![
                "Error: You have not specified a TCONNECT_EMAIL",
                "Error: You have not specified a TCONNECT_PASSWORD",
                "Error: You have not specified a PUMP_SERIAL_NUMBER",
                "Error: You have not specified a NS_URL",
                "Error: You have not specified a NS_SECRET",
                "TIMEZONE_NAME: America/New_York",
            ]
        );
    }
}
