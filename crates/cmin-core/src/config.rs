use std::path::{Path, PathBuf};
use std::str::FromStr;

use cmin_mangle::{MangleOptions, ScopePolicy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "cmin.json";

/// Where the rewritten source goes unless configured otherwise.
pub const DEFAULT_OUTPUT: &str = "out.c";

/// Runtime configuration for the cmin CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Scope numbering policy as spelled in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScopePolicySetting {
    #[default]
    Inherit,
    Restart,
}

impl ScopePolicySetting {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Restart => "restart",
        }
    }
}

impl FromStr for ScopePolicySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inherit" => Ok(Self::Inherit),
            "restart" => Ok(Self::Restart),
            other => Err(format!(
                "unknown scope policy `{other}` (expected `inherit` or `restart`)"
            )),
        }
    }
}

impl From<ScopePolicySetting> for ScopePolicy {
    fn from(setting: ScopePolicySetting) -> Self {
        match setting {
            ScopePolicySetting::Inherit => ScopePolicy::InheritFromEnclosing,
            ScopePolicySetting::Restart => ScopePolicy::RestartPerScope,
        }
    }
}

/// Minification settings, read from `cmin.json`.
///
/// ```json
/// { "entry_point": "main", "reserved": ["DEBUG"], "scope_policy": "inherit", "output": "out.c" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    /// Function that keeps its name.
    pub entry_point: String,
    /// Names to reserve in addition to the C keywords (macros, linker symbols, ...).
    pub reserved: Vec<String>,
    pub scope_policy: ScopePolicySetting,
    /// Output path, relative to the working directory.
    pub output: PathBuf,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            reserved: Vec::new(),
            scope_policy: ScopePolicySetting::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl MinifyConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `cmin.json` from `cwd` if it exists, otherwise the defaults.
    pub fn discover(cwd: &Path) -> Result<Self> {
        let path = cwd.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Engine options for this configuration.
    #[must_use]
    pub fn mangle_options(&self) -> MangleOptions {
        MangleOptions {
            entry_point: self.entry_point.clone(),
            scope_policy: self.scope_policy.into(),
            ..MangleOptions::default()
        }
        .with_reserved(self.reserved.iter().cloned())
    }
}
