//! # Edit Log Executor
//!
//! Runs offline edit log conversions. This is the crate front ends import:
//! - [`OfflineEditsViewer`] - detects the input, checks it against the
//!   [`Processor`], and pumps records into the selected sink
//! - [`StatisticsVisitor`]/[`StatisticsReport`] - per-opcode counts
//! - [`ViewerConfig`]/[`Flags`] - run options from `oev.toml` or flags
//!
//! ## Quick Start
//!
//! ```text
//! use editlog_executor::{convert, Processor};
//!
//! let outcome = convert("edits".as_ref(), "edits.json".as_ref(), Processor::ToText, false);
//! std::process::exit(outcome.code());
//! ```
//!
//! ## Processors
//!
//! | Processor | Input | Output |
//! |-----------|-------|--------|
//! | `xml` | binary | structured text |
//! | `binary` | structured text | binary |
//! | `stats` | binary | opcode counts |

#![warn(missing_docs)]

mod config;
mod detect;
mod processor;
mod stats;
mod txid;
mod viewer;

// Test modules
#[cfg(test)]
mod tests;

pub use config::{ConfigError, Flags, ViewerConfig, CONFIG_FILE_NAME};
pub use detect::{detect_format, sniff};
pub use processor::Processor;
pub use stats::{StatisticsReport, StatisticsVisitor};
pub use txid::FixTxids;
pub use viewer::{convert, OfflineEditsViewer, Outcome, RunSummary};

pub use editlog_core::{Error, OpCode, OpRegistry, Result, StreamFormat};
