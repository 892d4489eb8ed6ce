//! Processor dispatcher
//!
//! [`OfflineEditsViewer`] detects the input format, checks it against the
//! selected [`Processor`], and pumps records one at a time from a reader
//! through recovery and txid fixing into the processor's sink.
//!
//! Output goes to `<output>.tmp` first and is renamed into place only when
//! the whole run succeeds, so a failed run never leaves a partial file.

use crate::config::Flags;
use crate::detect::detect_format;
use crate::processor::Processor;
use crate::stats::{StatisticsReport, StatisticsVisitor};
use crate::txid::FixTxids;
use editlog_core::{Error, LayoutVersion, OpRegistry, OperationRecord, Result};
use editlog_durability::{BinaryEditsReader, BinaryEditsWriter, RecoveryMode, RecoveryReader};
use editlog_wire::{TextEditsReader, TextEditsWriter};
use once_cell::sync::Lazy;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Process-wide registry used by [`convert`] and [`OfflineEditsViewer::new`]
static STANDARD_REGISTRY: Lazy<OpRegistry> = Lazy::new(OpRegistry::standard);

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Processor that ran
    pub processor: Processor,
    /// Records delivered to the processor
    pub records: u64,
    /// Whether recovery truncated a damaged tail
    pub truncated: bool,
    /// Layout version declared by the input
    pub layout_version: LayoutVersion,
    /// Opcode counts, for statistics runs
    pub statistics: Option<StatisticsReport>,
}

/// Result of a conversion run
#[derive(Debug)]
pub enum Outcome {
    /// Output was written
    Success(RunSummary),
    /// Nothing was written
    Failure(Error),
}

impl Outcome {
    /// Process status code: 0 on success, -1 on failure
    pub fn code(&self) -> i32 {
        match self {
            Outcome::Success(_) => 0,
            Outcome::Failure(_) => -1,
        }
    }

    /// Whether the run succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Summary of a successful run
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            Outcome::Success(summary) => Some(summary),
            Outcome::Failure(_) => None,
        }
    }

    /// Error of a failed run
    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }
}

impl From<Result<RunSummary>> for Outcome {
    fn from(result: Result<RunSummary>) -> Self {
        match result {
            Ok(summary) => Outcome::Success(summary),
            Err(e) => Outcome::Failure(e),
        }
    }
}

/// Counters from one pass over a record stream
struct Pumped {
    records: u64,
    truncated: bool,
}

/// Offline edit log viewer.
///
/// Stateless apart from the registry it decodes with; one viewer can run
/// any number of conversions.
pub struct OfflineEditsViewer<'r> {
    registry: &'r OpRegistry,
}

impl OfflineEditsViewer<'static> {
    /// Viewer over the standard registry
    pub fn new() -> Self {
        OfflineEditsViewer {
            registry: &STANDARD_REGISTRY,
        }
    }
}

impl Default for OfflineEditsViewer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> OfflineEditsViewer<'r> {
    /// Viewer over a caller-supplied registry
    pub fn with_registry(registry: &'r OpRegistry) -> Self {
        OfflineEditsViewer { registry }
    }

    /// Registry in use
    pub fn registry(&self) -> &'r OpRegistry {
        self.registry
    }

    /// Run a conversion, folding every failure into [`Outcome::Failure`].
    pub fn go(&self, input: &Path, output: &Path, processor: Processor, flags: &Flags) -> Outcome {
        match self.try_go(input, output, processor, flags) {
            Ok(summary) => Outcome::Success(summary),
            Err(e) => {
                error!(input = %input.display(), error = %e, "Conversion failed");
                Outcome::Failure(e)
            }
        }
    }

    /// Run a conversion.
    ///
    /// # Errors
    ///
    /// `FormatMismatch` when the input is not what `processor` consumes;
    /// any decode, encode or I/O error otherwise. With `flags.recovery` a
    /// damaged tail is truncated instead of failing the run.
    pub fn try_go(
        &self,
        input: &Path,
        output: &Path,
        processor: Processor,
        flags: &Flags,
    ) -> Result<RunSummary> {
        self.try_go_to(input, output, processor, flags, io::stdout())
    }

    /// Run a conversion, echoing records to `screen` instead of stdout.
    ///
    /// `screen` is only written when `flags.print_to_screen` is set. The
    /// echoed document is closed even when the run fails part way.
    pub fn try_go_to<E: Write>(
        &self,
        input: &Path,
        output: &Path,
        processor: Processor,
        flags: &Flags,
        screen: E,
    ) -> Result<RunSummary> {
        info!(
            input = %input.display(),
            output = %output.display(),
            processor = %processor,
            recovery = flags.recovery,
            fix_txids = flags.fix_txids,
            "Starting conversion"
        );

        let detected = detect_format(input)?;
        processor.check_input(detected)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = temp_path_for(output);
        let result = self
            .run(input, &temp_path, processor, flags, screen)
            .and_then(|summary| {
                fs::rename(&temp_path, output)?;
                Ok(summary)
            });

        match result {
            Ok(summary) => {
                info!(
                    records = summary.records,
                    truncated = summary.truncated,
                    "Conversion complete"
                );
                Ok(summary)
            }
            Err(e) => {
                discard_temp(&temp_path);
                Err(e)
            }
        }
    }

    fn run<E: Write>(
        &self,
        input: &Path,
        temp_path: &Path,
        processor: Processor,
        flags: &Flags,
        screen: E,
    ) -> Result<RunSummary> {
        match processor {
            Processor::ToText => {
                let reader = BinaryEditsReader::open(self.registry, input)?;
                let layout_version = reader.layout_version();
                let mut writer = TextEditsWriter::create(self.registry, temp_path)?;
                let pumped = self.pump(reader, flags, screen, |r| writer.write_record(r))?;
                writer.finish()?;
                Ok(summary(processor, pumped, layout_version, None))
            }
            Processor::ToBinary => {
                let reader = TextEditsReader::open(self.registry, input)?;
                let layout_version = reader.layout_version();
                let mut writer = BinaryEditsWriter::create(self.registry, temp_path)?;
                let pumped = self.pump(reader, flags, screen, |r| writer.write_record(r))?;
                writer.finish()?;
                Ok(summary(processor, pumped, layout_version, None))
            }
            Processor::Statistics => {
                let reader = BinaryEditsReader::open(self.registry, input)?;
                let layout_version = reader.layout_version();
                let mut visitor = StatisticsVisitor::new();
                let pumped = self.pump(reader, flags, screen, |r| {
                    visitor.visit(r);
                    Ok(())
                })?;
                let report = visitor.into_report(Some(layout_version));
                report.write_to(BufWriter::new(File::create(temp_path)?))?;
                Ok(summary(processor, pumped, layout_version, Some(report)))
            }
        }
    }

    /// Drive `source` through recovery and txid fixing into `sink`,
    /// echoing each record to `screen` when asked.
    fn pump<I, E, F>(&self, source: I, flags: &Flags, screen: E, mut sink: F) -> Result<Pumped>
    where
        I: Iterator<Item = Result<OperationRecord>>,
        E: Write,
        F: FnMut(&OperationRecord) -> Result<()>,
    {
        let mut recovering = RecoveryReader::new(source, RecoveryMode::from_flag(flags.recovery));
        let mut echo = if flags.print_to_screen {
            Some(TextEditsWriter::new(self.registry, screen)?)
        } else {
            None
        };

        let mut records = 0u64;
        let mut failure = None;
        for item in FixTxids::new(recovering.by_ref(), flags.fix_txids) {
            let step = item.and_then(|record| {
                if let Some(echo) = echo.as_mut() {
                    echo.write_record(&record)?;
                }
                sink(&record)
            });
            if let Err(e) = step {
                failure = Some(e);
                break;
            }
            records += 1;
        }

        if let Some(echo) = echo {
            let closed = echo.finish().and_then(|mut screen| Ok(screen.flush()?));
            if let Err(e) = closed {
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        debug!(records, stop = ?recovering.stop_reason(), "Record stream ended");
        Ok(Pumped {
            records,
            truncated: recovering.was_truncated(),
        })
    }
}

/// Remove a temporary output after a failed run
fn discard_temp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temporary output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove temporary output"
        ),
    }
}

fn summary(
    processor: Processor,
    pumped: Pumped,
    layout_version: LayoutVersion,
    statistics: Option<StatisticsReport>,
) -> RunSummary {
    RunSummary {
        processor,
        records: pumped.records,
        truncated: pumped.truncated,
        layout_version,
        statistics,
    }
}

/// `<output>.tmp`, keeping any existing extension
fn temp_path_for(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Convert `input` into `output` with the standard registry.
///
/// Returns an [`Outcome`] whose [`Outcome::code`] is 0 on success and -1 on
/// failure.
pub fn convert(input: &Path, output: &Path, processor: Processor, recovery: bool) -> Outcome {
    let flags = Flags::default().with_recovery(recovery);
    OfflineEditsViewer::new().go(input, output, processor, &flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path_for(Path::new("/out/edits.xml")),
            PathBuf::from("/out/edits.xml.tmp")
        );
        assert_eq!(temp_path_for(Path::new("edits")), PathBuf::from("edits.tmp"));
    }

    #[test]
    fn test_discard_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tmp");
        std::fs::write(&path, b"partial").unwrap();

        discard_temp(&path);
        assert!(!path.exists());
        // already gone: nothing to do
        discard_temp(&path);

        // a directory cannot be removed as a file; logged, not propagated
        let nested = dir.path().join("busy.tmp");
        std::fs::create_dir(&nested).unwrap();
        discard_temp(&nested);
        assert!(nested.exists());
    }

    #[test]
    fn test_outcome_codes() {
        let failure = Outcome::Failure(Error::Config("bad".into()));
        assert_eq!(failure.code(), -1);
        assert!(!failure.is_success());
        assert!(failure.summary().is_none());
        assert!(failure.error().is_some());
    }
}
