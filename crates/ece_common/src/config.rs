//! Configuration
//!
//! Two sources:
//! - credentials, per environment and service, from the process environment
//!   (optionally seeded from a dotenv file)
//! - tool settings from an optional TOML file, `~/.config/ecectl/config.toml`
//!   by default
//!
//! Credential variables are `{ES|KB}_{PRD|NP|SBX}_{USERNAME|PASSWORD|ENV_URL}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Variable naming the dotenv file to load
pub const ENV_PATH_VAR: &str = "ELASTIC_ENV_PATH";

const CONFIG_DIR: &str = "ecectl";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVariable(String),

    #[error("cannot load env file {path}: {message}")]
    EnvFile { path: PathBuf, message: String },

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid environment '{0}' (expected prd, np or sbx)")]
    UnknownEnvironment(String),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

/// Target environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    NonProduction,
    Sandbox,
}

impl Environment {
    /// Short code used in variable names
    pub fn code(&self) -> &'static str {
        match self {
            Environment::Production => "PRD",
            Environment::NonProduction => "NP",
            Environment::Sandbox => "SBX",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_lowercase())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prd" => Ok(Environment::Production),
            "np" => Ok(Environment::NonProduction),
            "sbx" => Ok(Environment::Sandbox),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Which API a set of credentials addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// ECE control plane and Elasticsearch security API
    Elasticsearch,
    Kibana,
}

impl Service {
    fn prefix(&self) -> &'static str {
        match self {
            Service::Elasticsearch => "ES",
            Service::Kibana => "KB",
        }
    }
}

/// Basic-auth credentials and base URL for one service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub base_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env(environment: Environment, service: Service) -> Result<Self, ConfigError> {
        Self::from_lookup(environment, service, |key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(
        environment: Environment,
        service: Service,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |field: &str| {
            let key = format!("{}_{}_{}", service.prefix(), environment.code(), field);
            lookup(&key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVariable(key))
        };

        Ok(Self {
            username: var("USERNAME")?,
            password: var("PASSWORD")?,
            base_url: var("ENV_URL")?.trim_end_matches('/').to_string(),
        })
    }
}

/// Load a dotenv file into the process environment.
///
/// Uses `explicit` if given, else `$ELASTIC_ENV_PATH`. Returns the file that
/// was loaded, or `None` when neither is set. Variables already present in
/// the environment are not overridden.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(ENV_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None => return Ok(None),
        },
    };

    dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        message: e.to_string(),
    })?;
    debug!("Loaded credentials from {}", path.display());
    Ok(Some(path))
}

/// Tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub shutdown: ShutdownSettings,

    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub spaces: SpaceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept self-signed certificates (ECE installs often use them)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

/// How long to wait for a deployment to stop before deleting it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_shutdown_timeout_secs() -> u64 {
    900
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Index patterns cleaned up per Kibana space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceSettings {
    /// Created in every space as `{type}-{organization}-*`
    #[serde(default = "default_index_pattern_types")]
    pub index_pattern_types: Vec<String>,

    /// Read-only pattern shared by every space
    #[serde(default = "default_common_index_pattern")]
    pub common_index_pattern: String,

    /// Patterns that only exist in one dedicated space
    #[serde(default = "default_custom_index_patterns")]
    pub custom_index_patterns: Vec<CustomIndexPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomIndexPattern {
    pub pattern: String,
    pub space: String,
}

fn default_index_pattern_types() -> Vec<String> {
    ["metrics", "uptime", "logs", "winlogs", "analytics", "apm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_common_index_pattern() -> String {
    "platform_services_glb-*".to_string()
}

fn default_custom_index_patterns() -> Vec<CustomIndexPattern> {
    [
        ("logs-gcp-gsuite-*", "gcp_network"),
        ("logs-gcp-vpcflow-*", "gcp_network"),
        ("logs-gcp-firewall-*", "gcp_network"),
        ("logs-pcf-foundation-*", "pcf_admin"),
        ("metrics-pcf-foundation-*", "pcf_admin"),
        ("logs-gcp-audit-activity-*", "gcp_audit"),
        ("logs-gcp-audit-policy-*", "gcp_audit"),
        ("logs-gcp-audit-system_event-*", "gcp_audit"),
        ("logs-gcp-audit-data_access-*", "gcp_audit"),
    ]
    .iter()
    .map(|(pattern, space)| CustomIndexPattern {
        pattern: pattern.to_string(),
        space: space.to_string(),
    })
    .collect()
}

impl Default for SpaceSettings {
    fn default() -> Self {
        Self {
            index_pattern_types: default_index_pattern_types(),
            common_index_pattern: default_common_index_pattern(),
            custom_index_patterns: default_custom_index_patterns(),
        }
    }
}

impl ToolConfig {
    /// Default location: `$XDG_CONFIG_HOME/ecectl/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prd".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("NP".parse::<Environment>().unwrap(), Environment::NonProduction);
        assert_eq!("sbx".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert!(matches!(
            "dev".parse::<Environment>(),
            Err(ConfigError::UnknownEnvironment(_))
        ));
        assert_eq!(Environment::Sandbox.to_string(), "sbx");
    }

    #[test]
    fn test_credentials_from_lookup() {
        let vars = lookup(&[
            ("KB_NP_USERNAME", "kibana-admin"),
            ("KB_NP_PASSWORD", "secret"),
            ("KB_NP_ENV_URL", "https://kibana.np.example.com/"),
            ("ES_NP_USERNAME", "ece-admin"),
        ]);

        let creds =
            Credentials::from_lookup(Environment::NonProduction, Service::Kibana, &vars).unwrap();
        assert_eq!(creds.username, "kibana-admin");
        assert_eq!(creds.base_url, "https://kibana.np.example.com");
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let vars = lookup(&[("ES_PRD_USERNAME", "admin"), ("ES_PRD_PASSWORD", "")]);

        let err = Credentials::from_lookup(Environment::Production, Service::Elasticsearch, vars)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing environment variable ES_PRD_PASSWORD");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
            base_url: "https://ece".into(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn test_tool_config_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert!(!config.http.accept_invalid_certs);
        assert_eq!(config.shutdown.poll_interval_secs, 10);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.spaces.index_pattern_types.len(), 6);
        assert_eq!(config.spaces.custom_index_patterns.len(), 9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ToolConfig::parse(
            r#"
            [http]
            timeout_secs = 5

            [shutdown]
            poll_interval_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.shutdown.poll_interval_secs, 2);
        assert_eq!(config.shutdown.timeout_secs, 900);
        assert_eq!(config.spaces.common_index_pattern, "platform_services_glb-*");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[spaces]\nindex_pattern_types = [\"logs\"]\n\n[[spaces.custom_index_patterns]]\npattern = \"logs-x-*\"\nspace = \"x\""
        )
        .unwrap();

        let config = ToolConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.spaces.index_pattern_types, vec!["logs".to_string()]);
        assert_eq!(
            config.spaces.custom_index_patterns,
            vec![CustomIndexPattern {
                pattern: "logs-x-*".into(),
                space: "x".into()
            }]
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\ntimeout_secs = \"soon\"").unwrap();

        let err = ToolConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_env_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(Some(&dir.path().join(".env"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
