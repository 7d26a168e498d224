pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod scan;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use scan::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_loading() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scanner.warning_days, 90);
    }

    #[test]
    fn test_environment_overrides() {
        let vars: ::config::Map<String, String> = [
            ("SHELFWATCH__SCANNER__EXCLUDE_SHEETS", "Archive,Template"),
            ("SHELFWATCH__SCANNER__WARNING_DAYS", "60"),
            ("SHELFWATCH__SERVER__PORT", "9090"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            AppConfig::load_with_env(::config::Environment::with_prefix("SHELFWATCH").source(Some(vars))).unwrap();
        assert_eq!(config.scanner.exclude_sheets, vec!["Archive", "Template"]);
        assert_eq!(config.scanner.warning_days, 60);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.email.smtp_port, 587);
    }

    #[test]
    fn test_error_handling() {
        let error = ShelfwatchError::validation("test_field", "test message");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);

        let error = ShelfwatchError::mail_send("relay refused");
        assert_eq!(error.http_status_code(), 502);
        assert_eq!(error.user_message(), "relay refused");
    }
}
