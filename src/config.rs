use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub search: SearchSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub application_name: String,
    pub api_key: String,
    #[serde(default)]
    pub database_mode: DatabaseMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    /// Basic-auth password: the API key with its `|mode` suffix.
    ///
    /// Keys that already carry a suffix are passed through untouched.
    pub fn password(&self) -> String {
        if self.api_key.contains('|') {
            self.api_key.clone()
        } else {
            format!("{}|{}", self.api_key, self.database_mode.suffix())
        }
    }
}

/// Which database the API key addresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseMode {
    #[default]
    VoterFile,
    MyCampaign,
}

impl DatabaseMode {
    pub fn suffix(self) -> u8 {
        match self {
            DatabaseMode::VoterFile => 0,
            DatabaseMode::MyCampaign => 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Position of the ward district in a person's `districts` list.
    /// Differs between deployments; there is deliberately no default.
    pub ward_district_index: usize,
    #[serde(default)]
    pub default_city: Option<String>,
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetrySettings {
    /// No retries, for tests against mock servers
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_base_url() -> String { "https://api.securevan.com/v4".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_search_delay_ms() -> u64 { 200 }
fn default_page_delay_ms() -> u64 { 100 }
fn default_page_size() -> u32 { 50 }
fn default_max_pages() -> usize { 1000 }
fn default_max_retries() -> u32 { 3 }
fn default_base_backoff_ms() -> u64 { 500 }
fn default_max_backoff_ms() -> u64 { 8000 }
fn default_output_directory() -> PathBuf { PathBuf::from(".") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VAN__)
    /// 5. The well-known `VAN_API_KEY`, `VAN_APPLICATION_NAME` and `VAN_CITY` variables
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VAN__SEARCH__WARD_DISTRICT_INDEX -> search.ward_district_index
            .add_source(
                Environment::with_prefix("VAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

/// Apply the short environment names for credentials and the city filter
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("VAN_API_KEY", "api.api_key"),
        ("VAN_APPLICATION_NAME", "api.application_name"),
        ("VAN_CITY", "search.default_city"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
