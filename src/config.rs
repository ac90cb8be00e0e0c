use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub solver: SolverSettings,
    pub pairing: PairingSettings,
    pub normalization: NormalizationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// HiGHS options. Time limits live here, never in the model builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_secs: f64,
    pub threads: i32,
    pub random_seed: i32,
    pub log_to_console: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 180.0,
            threads: 1,
            random_seed: 1234,
            log_to_console: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Every resident must be paired; leftovers are infeasible.
    #[default]
    Strict,
    /// Residents may stay unpaired at a per-resident penalty.
    BestEffort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PairingSettings {
    pub mode: PairingMode,
    pub unassigned_penalty: f64,
    pub precheck: bool,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            mode: PairingMode::Strict,
            unassigned_penalty: 1000.0,
            precheck: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Unusable answers fall back to a neutral code and produce a warning.
    #[default]
    Lenient,
    /// Unusable answers are rejected.
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizationSettings {
    pub policy: FallbackPolicy,
    pub neutral_code: f64,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            policy: FallbackPolicy::Lenient,
            neutral_code: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Later sources override earlier ones:
    /// 1. Default values in the structs
    /// 2. config/default.toml, then config/local.toml
    /// 3. Environment variables prefixed with ROOMMATES__
    ///    (e.g. ROOMMATES__SERVER__PORT -> server.port)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ROOMMATES")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
