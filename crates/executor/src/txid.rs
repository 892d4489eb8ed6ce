//! Sequential transaction id renumbering

use editlog_core::{OperationRecord, Result};

/// Rewrites txids so they increase by exactly one.
///
/// Numbering starts at the first record's txid, or at 1 when that txid is
/// not positive. Errors pass through untouched and do not consume an id.
/// When disabled the adapter is a pass-through.
pub struct FixTxids<I> {
    inner: I,
    enabled: bool,
    next: Option<i64>,
}

impl<I> FixTxids<I>
where
    I: Iterator<Item = Result<OperationRecord>>,
{
    /// Wrap `inner`, renumbering only when `enabled`
    pub fn new(inner: I, enabled: bool) -> Self {
        FixTxids {
            inner,
            enabled,
            next: None,
        }
    }
}

impl<I> Iterator for FixTxids<I>
where
    I: Iterator<Item = Result<OperationRecord>>,
{
    type Item = Result<OperationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        if !self.enabled {
            return Some(item);
        }
        Some(item.map(|mut record| {
            let txid = match self.next {
                Some(txid) => txid,
                None if record.txid() > 0 => record.txid(),
                None => 1,
            };
            if txid != record.txid() {
                tracing::trace!(from = record.txid(), to = txid, "Renumbered txid");
            }
            record.set_txid(txid);
            self.next = Some(txid.saturating_add(1));
            record
        }))
    }
}
