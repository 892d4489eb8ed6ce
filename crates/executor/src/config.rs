//! Viewer configuration via `oev.toml`
//!
//! Every setting can also be given on the command line; command-line flags
//! win over the file. The file is optional.

use crate::processor::Processor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "oev.toml";

/// Run options consumed by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Truncate a damaged tail instead of failing
    pub recovery: bool,
    /// Renumber transaction ids sequentially
    pub fix_txids: bool,
    /// Echo records as text on stdout
    pub print_to_screen: bool,
}

impl Flags {
    /// Enable or disable recovery mode
    pub fn with_recovery(mut self, on: bool) -> Self {
        self.recovery = on;
        self
    }

    /// Enable or disable txid renumbering
    pub fn with_fix_txids(mut self, on: bool) -> Self {
        self.fix_txids = on;
        self
    }

    /// Enable or disable echoing to stdout
    pub fn with_print_to_screen(mut self, on: bool) -> Self {
        self.print_to_screen = on;
        self
    }
}

/// Viewer configuration loaded from `oev.toml`.
///
/// # Example
///
/// ```toml
/// # Processor: "xml" (text, default), "binary" or "stats"
/// processor = "xml"
///
/// # Stop at the last good record instead of failing on a damaged tail
/// recover = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Processor name: `"xml"`, `"binary"` or `"stats"`.
    #[serde(default = "default_processor")]
    pub processor: String,
    /// Recovery mode.
    #[serde(default)]
    pub recover: bool,
    /// Renumber transaction ids sequentially.
    #[serde(default)]
    pub fix_txids: bool,
    /// Echo records as text on stdout.
    #[serde(default)]
    pub print_to_screen: bool,
}

fn default_processor() -> String {
    "xml".to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            processor: default_processor(),
            recover: false,
            fix_txids: false,
            print_to_screen: false,
        }
    }
}

impl ViewerConfig {
    /// Set the processor name
    pub fn with_processor(mut self, name: impl Into<String>) -> Self {
        self.processor = name.into();
        self
    }

    /// Set recovery mode
    pub fn with_recover(mut self, on: bool) -> Self {
        self.recover = on;
        self
    }

    /// Set txid renumbering
    pub fn with_fix_txids(mut self, on: bool) -> Self {
        self.fix_txids = on;
        self
    }

    /// Set echoing to stdout
    pub fn with_print_to_screen(mut self, on: bool) -> Self {
        self.print_to_screen = on;
        self
    }

    /// Parsed processor
    pub fn processor(&self) -> Result<Processor, ConfigError> {
        self.processor.parse()
    }

    /// Run flags
    pub fn flags(&self) -> Flags {
        Flags {
            recovery: self.recover,
            fix_txids: self.fix_txids,
            print_to_screen: self.print_to_screen,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.processor()?;
        Ok(())
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Processor name not recognized
    #[error("Unknown processor '{0}'. Expected \"xml\", \"binary\" or \"stats\".")]
    InvalidProcessor(String),
}

impl From<ConfigError> for editlog_core::Error {
    fn from(e: ConfigError) -> Self {
        editlog_core::Error::Config(e.to_string())
    }
}
