//! Suite configuration.
//!
//! Loaded from the JSON file named by the `CONFIG` environment variable:
//!
//! ```json
//! {
//!   "api": "api.bosh-lite.com",
//!   "apps_domain": "bosh-lite.com",
//!   "skip_ssl_validation": true,
//!   "first_broker_service_label": "fake-service",
//!   "first_broker_plan_name": "fake-plan",
//!   "second_broker_service_label": "fake-service-2",
//!   "second_broker_plan_name": "fake-plan-2"
//! }
//! ```
//!
//! A handful of settings can be overridden from the environment without
//! editing the file: `CATS_CF_BINARY`, `CATS_CONCURRENCY`, `CATS_LOG_LEVEL`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatsConfig {
    /// CF API endpoint, with or without scheme.
    pub api: String,

    /// Shared domain pushed apps are routed under.
    pub apps_domain: String,

    /// Reach apps over plain HTTP.
    pub use_http: bool,

    pub skip_ssl_validation: bool,

    /// Path of the `cf` CLI.
    pub cf_binary: String,

    /// Path of the `curl` binary used for package uploads.
    pub curl_binary: String,

    /// Prefix of every generated resource name.
    pub name_prefix: String,

    pub default_timeout_secs: u64,
    pub cf_push_timeout_secs: u64,
    pub long_curl_timeout_secs: u64,
    pub poll_interval_millis: u64,

    /// Per-test-case run deadline; teardown runs after it regardless.
    pub test_deadline_secs: u64,

    /// Budget for deleting one resource during teardown.
    pub teardown_timeout_secs: u64,

    /// How long the output-volume test lets the platform react to log spew.
    pub log_settle_secs: u64,

    /// Directory holding the sample apps (`dora`, `lattice-app`, `service_broker`).
    pub assets_dir: PathBuf,

    pub go_buildpack_name: String,

    /// Space used for route creation and v3 app creation.
    pub space: Option<String>,

    pub include_apps: bool,
    pub include_routing: bool,
    pub include_services: bool,
    pub include_tasks: bool,

    pub broker_username: String,
    pub broker_password: String,
    pub first_broker_service_label: String,
    pub first_broker_plan_name: String,
    pub second_broker_service_label: String,
    pub second_broker_plan_name: String,

    /// Maximum number of test cases running at once.
    pub concurrency: usize,

    pub log_level: String,

    /// Text of the file this config was loaded from, unparsed. Apps that
    /// read the suite config themselves get this, unknown keys included.
    #[serde(skip)]
    pub source: Option<String>,
}

impl Default for CatsConfig {
    fn default() -> Self {
        Self {
            api: String::new(),
            apps_domain: String::new(),
            use_http: false,
            skip_ssl_validation: false,
            cf_binary: "cf".to_string(),
            curl_binary: "curl".to_string(),
            name_prefix: "cats".to_string(),
            default_timeout_secs: 30,
            cf_push_timeout_secs: 120,
            long_curl_timeout_secs: 120,
            poll_interval_millis: 1000,
            test_deadline_secs: 600,
            teardown_timeout_secs: 60,
            log_settle_secs: 10,
            assets_dir: PathBuf::from("assets"),
            go_buildpack_name: "go_buildpack".to_string(),
            space: None,
            include_apps: true,
            include_routing: true,
            include_services: true,
            include_tasks: true,
            broker_username: "username".to_string(),
            broker_password: "password".to_string(),
            first_broker_service_label: String::new(),
            first_broker_plan_name: String::new(),
            second_broker_service_label: String::new(),
            second_broker_plan_name: String::new(),
            concurrency: 4,
            log_level: "info".to_string(),
            source: None,
        }
    }
}

impl CatsConfig {
    /// Loads the file named by `CONFIG`, then applies environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).map_err(|_| ConfigError::MissingEnv(CONFIG_ENV))?;
        let mut config = Self::load(&path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without validating it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.source = Some(contents);
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(binary) = std::env::var("CATS_CF_BINARY") {
            self.cf_binary = binary;
        }
        if let Ok(concurrency) = std::env::var("CATS_CONCURRENCY") {
            self.concurrency = concurrency
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("CATS_CONCURRENCY={concurrency} is not a number")))?;
        }
        if let Ok(level) = std::env::var("CATS_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.trim().is_empty() {
            return Err(ConfigError::Invalid("api must be set".to_string()));
        }
        if self.apps_domain.trim().is_empty() {
            return Err(ConfigError::Invalid("apps_domain must be set".to_string()));
        }
        for (field, value) in [
            ("default_timeout_secs", self.default_timeout_secs),
            ("cf_push_timeout_secs", self.cf_push_timeout_secs),
            ("long_curl_timeout_secs", self.long_curl_timeout_secs),
            ("poll_interval_millis", self.poll_interval_millis),
            ("test_deadline_secs", self.test_deadline_secs),
            ("teardown_timeout_secs", self.teardown_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
            }
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.include_services {
            for (field, value) in [
                ("first_broker_service_label", &self.first_broker_service_label),
                ("first_broker_plan_name", &self.first_broker_plan_name),
                ("second_broker_service_label", &self.second_broker_service_label),
                ("second_broker_plan_name", &self.second_broker_plan_name),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{field} is required when include_services is enabled"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn cf_push_timeout(&self) -> Duration {
        Duration::from_secs(self.cf_push_timeout_secs)
    }

    pub fn long_curl_timeout(&self) -> Duration {
        Duration::from_secs(self.long_curl_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn test_deadline(&self) -> Duration {
        Duration::from_secs(self.test_deadline_secs)
    }

    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_secs(self.teardown_timeout_secs)
    }

    pub fn log_settle(&self) -> Duration {
        Duration::from_secs(self.log_settle_secs)
    }

    /// Scheme used to reach pushed apps.
    pub fn app_scheme(&self) -> &'static str {
        if self.use_http {
            "http"
        } else {
            "https"
        }
    }

    /// Full URL of a pushed app's route, e.g. `https://my-app.example.com/id`.
    pub fn app_uri(&self, host: &str, path: &str) -> String {
        format!("{}://{}.{}{}", self.app_scheme(), host, self.apps_domain, path)
    }

    /// API endpoint with a scheme, for `cf api`.
    pub fn api_url(&self) -> String {
        if self.api.starts_with("http://") || self.api.starts_with("https://") {
            self.api.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.api.trim_end_matches('/'))
        }
    }

    pub fn asset(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }
}
