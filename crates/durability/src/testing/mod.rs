//! Testing utilities for edit logs
//!
//! This module provides tools for exercising the codecs:
//!
//! - **Sample edits**: a synthetic log touching every supported opcode with
//!   realistic field values
//! - **Corruption**: tail truncation, garbage and bit flips on log files
//!
//! # Example
//!
//! ```ignore
//! use editlog_durability::testing::{EditLogCorruptor, SampleEdits};
//!
//! let registry = OpRegistry::standard();
//! SampleEdits::new(&registry).write_binary(&path, Some(1024 * 1024))?;
//! EditLogCorruptor::new(&path).truncate_tail(5)?;
//! ```

mod corruption;
mod sample;

pub use corruption::EditLogCorruptor;
pub use sample::{sample_record, SampleEdits};
