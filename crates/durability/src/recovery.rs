//! Recovery controller.
//!
//! Wraps any record stream and decides what happens when decoding fails.
//! In [`RecoveryMode::Strict`] every error is passed through. In
//! [`RecoveryMode::Recover`] physical damage (`CorruptRecord`,
//! `TruncatedStream`) ends the stream cleanly: the caller sees the valid
//! prefix and nothing else. Structural errors (unknown opcode, schema
//! violation, unsupported version) are always passed through.

use editlog_core::{Error, OperationRecord, Result};
use std::fmt;

/// How decoding errors are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Report every error
    #[default]
    Strict,
    /// Truncate the stream at the first physically damaged record
    Recover,
}

impl RecoveryMode {
    /// Select a mode from a boolean flag
    pub fn from_flag(recover: bool) -> Self {
        if recover {
            RecoveryMode::Recover
        } else {
            RecoveryMode::Strict
        }
    }
}

impl fmt::Display for RecoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryMode::Strict => write!(f, "strict"),
            RecoveryMode::Recover => write!(f, "recover"),
        }
    }
}

/// Why a recovering stream stopped
#[derive(Debug)]
pub enum StopReason {
    /// Underlying stream ended cleanly
    EndOfData,

    /// Damage was absorbed; the stream was truncated before it
    Truncated {
        /// The absorbed error
        error: Error,
    },

    /// An error was passed to the caller
    Failed,
}

/// Record stream with recovery applied.
pub struct RecoveryReader<I> {
    inner: I,
    mode: RecoveryMode,
    yielded: u64,
    stop_reason: Option<StopReason>,
}

impl<I> RecoveryReader<I>
where
    I: Iterator<Item = Result<OperationRecord>>,
{
    /// Wrap `inner` with the given recovery mode
    pub fn new(inner: I, mode: RecoveryMode) -> Self {
        RecoveryReader {
            inner,
            mode,
            yielded: 0,
            stop_reason: None,
        }
    }

    /// Recovery mode in effect
    pub fn mode(&self) -> RecoveryMode {
        self.mode
    }

    /// Records handed to the caller so far
    pub fn records_yielded(&self) -> u64 {
        self.yielded
    }

    /// Why the stream stopped, once it has
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Whether damage was absorbed
    pub fn was_truncated(&self) -> bool {
        matches!(self.stop_reason, Some(StopReason::Truncated { .. }))
    }

    /// Consume the wrapper, returning the inner stream
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I> Iterator for RecoveryReader<I>
where
    I: Iterator<Item = Result<OperationRecord>>,
{
    type Item = Result<OperationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop_reason.is_some() {
            return None;
        }
        match self.inner.next() {
            None => {
                self.stop_reason = Some(StopReason::EndOfData);
                None
            }
            Some(Ok(record)) => {
                self.yielded += 1;
                Some(Ok(record))
            }
            Some(Err(error)) if self.mode == RecoveryMode::Recover && error.is_recoverable() => {
                tracing::warn!(
                    records = self.yielded,
                    error = %error,
                    "Truncating damaged edit log"
                );
                self.stop_reason = Some(StopReason::Truncated { error });
                None
            }
            Some(Err(error)) => {
                self.stop_reason = Some(StopReason::Failed);
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editlog_core::{OpCode, OpRegistry};

    fn stream(tail: Error) -> Vec<Result<OperationRecord>> {
        let registry = OpRegistry::standard();
        vec![
            Ok(registry.default_record(OpCode::StartLogSegment, 1).unwrap()),
            Ok(registry.default_record(OpCode::Mkdir, 2).unwrap()),
            Err(tail),
            Ok(registry.default_record(OpCode::EndLogSegment, 3).unwrap()),
        ]
    }

    #[test]
    fn test_recover_absorbs_corruption() {
        let input = stream(Error::corrupt(40, "checksum mismatch"));
        let mut reader = RecoveryReader::new(input.into_iter(), RecoveryMode::Recover);

        let records: Vec<_> = reader.by_ref().collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_ok()));
        assert_eq!(reader.records_yielded(), 2);
        assert!(reader.was_truncated());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_recover_absorbs_truncation() {
        let input = stream(Error::truncated(40, "eof"));
        let mut reader = RecoveryReader::new(input.into_iter(), RecoveryMode::Recover);
        assert_eq!(reader.by_ref().count(), 2);
        assert!(matches!(
            reader.stop_reason(),
            Some(StopReason::Truncated {
                error: Error::TruncatedStream { .. }
            })
        ));
    }

    #[test]
    fn test_strict_passes_error_through() {
        let input = stream(Error::corrupt(40, "checksum mismatch"));
        let mut reader = RecoveryReader::new(input.into_iter(), RecoveryMode::Strict);

        let results: Vec<_> = reader.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[2], Err(Error::CorruptRecord { .. })));
        assert!(matches!(reader.stop_reason(), Some(StopReason::Failed)));
    }

    #[test]
    fn test_structural_error_never_absorbed() {
        let input = stream(Error::UnknownOpcode {
            opcode: "0x7e".into(),
            offset: 40,
        });
        let results: Vec<_> = RecoveryReader::new(input.into_iter(), RecoveryMode::Recover).collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[2], Err(Error::UnknownOpcode { .. })));
    }

    #[test]
    fn test_clean_stream_unchanged() {
        let registry = OpRegistry::standard();
        let input = vec![Ok(registry.default_record(OpCode::Mkdir, 9).unwrap())];
        let mut reader = RecoveryReader::new(input.into_iter(), RecoveryMode::Recover);
        assert_eq!(reader.by_ref().count(), 1);
        assert!(matches!(reader.stop_reason(), Some(StopReason::EndOfData)));
        assert!(!reader.was_truncated());
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(RecoveryMode::from_flag(true), RecoveryMode::Recover);
        assert_eq!(RecoveryMode::default(), RecoveryMode::Strict);
    }
}
