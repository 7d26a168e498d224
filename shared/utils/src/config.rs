use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use shelfwatch_models::{DateOrder, ScanOptions};
use std::env;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scanner: ScannerConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

/// Defaults for every scan; a request may override them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScannerConfig {
    #[validate(range(min = 30, max = 180))]
    pub warning_days: u32,
    #[validate(range(min = 1))]
    pub critical_days: u32,
    pub urgent_days: u32,
    pub exclude_sheets: Vec<String>,
    #[validate(range(min = 1, max = 1000))]
    pub sample_size: usize,
    pub date_order: DateOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    #[validate(email)]
    pub from_address: String,
    pub from_name: String,
    #[validate(email)]
    pub default_recipient: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub metrics_enabled: bool,
    pub prometheus_namespace: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::load_with_env(Environment::with_prefix("SHELFWATCH"))
    }

    /// Layered load where `environment` supplies the final overrides.
    pub fn load_with_env(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Built-in defaults so partial files are enough
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                environment
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scanner.exclude_sheets")
                    .try_parsing(true),
            );

        config.build()?.try_deserialize()
    }
}

impl ScannerConfig {
    /// Request options seeded from the configured defaults.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            warning_days: self.warning_days,
            critical_days: self.critical_days,
            urgent_days: self.urgent_days,
            exclude_sheets: self.exclude_sheets.clone(),
            sample_size: self.sample_size,
            date_order: self.date_order,
            date_order_fixed: false,
            reference_date: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let scan_defaults = ScanOptions::default();
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 16 * 1024 * 1024, // 16MB
                timeout_seconds: 30,
            },
            scanner: ScannerConfig {
                warning_days: scan_defaults.warning_days,
                critical_days: scan_defaults.critical_days,
                urgent_days: scan_defaults.urgent_days,
                exclude_sheets: Vec::new(),
                sample_size: scan_defaults.sample_size,
                date_order: scan_defaults.date_order,
            },
            email: EmailConfig {
                smtp_host: "smtp.gmail.com".to_string(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_address: "noreply@shelfwatch.local".to_string(),
                from_name: "Shelfwatch Expiry Monitor".to_string(),
                default_recipient: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
            monitoring: MonitoringConfig {
                metrics_enabled: true,
                prometheus_namespace: "shelfwatch".to_string(),
            },
        }
    }
}
