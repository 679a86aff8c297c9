//! Sandbox configuration file parsing.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not valid TOML or has unknown keys.
    Parse(toml::de::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "Invalid sandbox config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid sandbox config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Default bound on nested evaluation (bindings reading bindings plus
/// function calls).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default longest string, in UTF-16 code units, a built-in may produce.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1 << 30;

/// Default longest array a built-in may allocate from a length argument.
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 1 << 24;

/// Array lengths above this are invalid whatever the configured cap.
pub const ARRAY_LENGTH_LIMIT: usize = u32::MAX as usize;

/// Complete sandbox configuration.
///
/// Expected format (every key optional):
/// ```toml
/// max_depth = 64
/// console_enabled = false
/// disabled_globals = ["console"]
/// denied_globals = ["Intl"]
/// max_string_length = 1048576
/// max_array_length = 65536
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    /// Maximum nesting of evaluations before a `RangeError`.
    pub max_depth: usize,
    /// Whether `console.*` calls are forwarded to the log.
    pub console_enabled: bool,
    /// Built-in globals removed from the sandbox.
    pub disabled_globals: Vec<String>,
    /// Extra host names that must never resolve, in addition to the
    /// built-in deny list.
    pub denied_globals: Vec<String>,
    /// Longest string `repeat`, `padStart` and `padEnd` may build.
    pub max_string_length: usize,
    /// Longest array `Array.from` may build from an array-like length.
    /// Capped at 2^32 - 1 regardless.
    pub max_array_length: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        SandboxConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            console_enabled: true,
            disabled_globals: Vec::new(),
            denied_globals: Vec::new(),
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
        }
    }
}

impl SandboxConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SandboxConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        for (key, value) in [
            ("max_depth", config.max_depth),
            ("max_string_length", config.max_string_length),
            ("max_array_length", config.max_array_length),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }
        Ok(config)
    }

    /// Effective array cap: the configured one, never above 2^32 - 1.
    pub fn array_length_limit(&self) -> usize {
        self.max_array_length.min(ARRAY_LENGTH_LIMIT)
    }
}
