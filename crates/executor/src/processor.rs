//! Processor selection

use crate::config::ConfigError;
use editlog_core::{Error, Result, StreamFormat};
use std::fmt;
use std::str::FromStr;

/// Conversion pipeline selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Processor {
    /// Binary log to structured text
    ToText,
    /// Structured text to binary log
    ToBinary,
    /// Binary log to per-opcode counts
    Statistics,
}

impl Processor {
    /// Canonical command-line name
    pub fn name(&self) -> &'static str {
        match self {
            Processor::ToText => "xml",
            Processor::ToBinary => "binary",
            Processor::Statistics => "stats",
        }
    }

    /// Input format this processor consumes
    pub fn input_format(&self) -> StreamFormat {
        match self {
            Processor::ToText | Processor::Statistics => StreamFormat::Binary,
            Processor::ToBinary => StreamFormat::Text,
        }
    }

    /// Reject input whose detected format this processor cannot consume.
    ///
    /// `detected` is `None` when the content matched no known format.
    pub fn check_input(&self, detected: Option<StreamFormat>) -> Result<()> {
        let expected = self.input_format();
        match detected {
            Some(format) if format == expected => Ok(()),
            Some(format) => Err(Error::FormatMismatch {
                expected,
                actual: format.name().to_string(),
            }),
            None => Err(Error::FormatMismatch {
                expected,
                actual: "unrecognized content".to_string(),
            }),
        }
    }
}

impl FromStr for Processor {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" | "text" | "json" => Ok(Processor::ToText),
            "binary" => Ok(Processor::ToBinary),
            "stats" => Ok(Processor::Statistics),
            _ => Err(ConfigError::InvalidProcessor(s.to_string())),
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
