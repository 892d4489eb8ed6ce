//! Per-opcode statistics
//!
//! The report lists every known opcode, including ones that never occurred
//! (count 0) and the `OP_INVALID` sentinel, one line each:
//!
//! ```text
//!     OP_ADD                         (  0): 12
//!     OP_INVALID                     ( -1): 0
//! ```

use editlog_core::{LayoutVersion, OpCode, OpRegistry, OperationRecord};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Counts records by opcode
#[derive(Debug, Default)]
pub struct StatisticsVisitor {
    counts: BTreeMap<OpCode, u64>,
}

impl StatisticsVisitor {
    /// Empty visitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record
    pub fn visit(&mut self, record: &OperationRecord) {
        *self.counts.entry(record.opcode()).or_insert(0) += 1;
    }

    /// Finish counting
    pub fn into_report(self, layout_version: Option<LayoutVersion>) -> StatisticsReport {
        StatisticsReport {
            counts: self.counts,
            layout_version,
        }
    }
}

/// Finished opcode counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsReport {
    counts: BTreeMap<OpCode, u64>,
    layout_version: Option<LayoutVersion>,
}

impl StatisticsReport {
    /// Count for `opcode`; zero if never seen
    pub fn get(&self, opcode: OpCode) -> u64 {
        self.counts.get(&opcode).copied().unwrap_or(0)
    }

    /// Total records counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Layout version of the counted stream, if known
    pub fn layout_version(&self) -> Option<LayoutVersion> {
        self.layout_version
    }

    /// Every known opcode with its count, in tag order
    pub fn iter(&self) -> impl Iterator<Item = (OpCode, u64)> + '_ {
        OpCode::ALL.iter().map(move |op| (*op, self.get(*op)))
    }

    /// Supported opcodes that were never seen, skipping `exclusions`
    pub fn missing(&self, registry: &OpRegistry, exclusions: &[OpCode]) -> Vec<OpCode> {
        registry
            .supported()
            .filter(|op| !exclusions.contains(op))
            .filter(|op| self.get(*op) == 0)
            .collect()
    }

    /// One formatted line per known opcode
    pub fn render(&self) -> String {
        self.iter()
            .map(|(op, count)| format!("    {:<30.30} ({:>3}): {}\n", op.name(), op.id(), count))
            .collect()
    }

    /// Write the version line followed by the rendered counts
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        if let Some(version) = self.layout_version {
            writeln!(out, "VERSION : {}", version)?;
        }
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }
}
