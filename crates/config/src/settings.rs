// Pipeline settings
// Layered: defaults < TOML file < BT_* environment < command-line overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://scoring-bancoturing.semilla42.com/predict_batch";
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_EXTRACT_LIMIT: usize = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OUTPUT_PATH: &str = "docs/data.json";

const REDACTED: &str = "********";

#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Read { path: PathBuf, message: String },
    /// Config file is not valid TOML for [`Settings`].
    Parse(String),
    /// An environment variable holds an unusable value.
    Env { var: &'static str, value: String, expected: &'static str },
    /// Settings failed validation.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read config {}: {message}", path.display())
            }
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Env { var, value, expected } => {
                write!(f, "{var}={value:?} is not a valid {expected}")
            }
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Relational data source connection.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            name: "banco_turing".into(),
            user: "turing".into(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Remote batch scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub endpoint: String,
    /// Upper bound per request.
    pub timeout_secs: u64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Records per scoring request.
    pub batch_size: usize,
    /// Row cap on the extraction query.
    pub extract_limit: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            extract_limit: DEFAULT_EXTRACT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub scoring: ScoringSettings,
    pub pipeline: PipelineSettings,
    pub output: OutputSettings,
}

/// Command-line values that win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub batch_size: Option<usize>,
    pub extract_limit: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Defaults, then `config_file` (if any), then the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.apply_env(|var| std::env::var(var).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overlay `BT_*` variables read through `lookup`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("BT_DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("BT_DB_PORT") {
            self.database.port = parse_env("BT_DB_PORT", &v, "port number")?;
        }
        if let Some(v) = lookup("BT_DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("BT_DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("BT_DB_PASS") {
            self.database.password = v;
        }
        if let Some(v) = lookup("BT_PREDICT_URL") {
            self.scoring.endpoint = v;
        }
        if let Some(v) = lookup("BT_SCORING_TIMEOUT_SECS") {
            self.scoring.timeout_secs = parse_env("BT_SCORING_TIMEOUT_SECS", &v, "number of seconds")?;
        }
        if let Some(v) = lookup("BT_BATCH_SIZE") {
            self.pipeline.batch_size = parse_env("BT_BATCH_SIZE", &v, "batch size")?;
        }
        if let Some(v) = lookup("BT_EXTRACT_LIMIT") {
            self.pipeline.extract_limit = parse_env("BT_EXTRACT_LIMIT", &v, "row limit")?;
        }
        if let Some(v) = lookup("BT_OUTPUT_PATH") {
            self.output.path = PathBuf::from(v);
        }
        Ok(self)
    }

    pub fn apply_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(ref endpoint) = overrides.endpoint {
            self.scoring.endpoint = endpoint.clone();
        }
        if let Some(n) = overrides.batch_size {
            self.pipeline.batch_size = n;
        }
        if let Some(n) = overrides.extract_limit {
            self.pipeline.extract_limit = n;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.scoring.timeout_secs = secs;
        }
        if let Some(ref path) = overrides.output {
            self.output.path = path.clone();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.batch_size < 1 {
            return Err(ConfigError::Invalid("batch size must be at least 1".into()));
        }
        if self.scoring.timeout_secs == 0 {
            return Err(ConfigError::Invalid("scoring timeout must be at least 1 second".into()));
        }
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::Invalid("database host is empty".into()));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid("database port must be non-zero".into()));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output path is empty".into()));
        }

        let endpoint = url::Url::parse(&self.scoring.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("scoring endpoint {:?}: {e}", self.scoring.endpoint))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "scoring endpoint must be http or https, got {}",
                endpoint.scheme()
            )));
        }
        Ok(())
    }

    /// Copy safe to print: the database password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.database.password.is_empty() {
            copy.database.password = REDACTED.into();
        }
        copy
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str, expected: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
        expected,
    })
}
