// crates/valset-consensus/src/events.rs
//
// Generic contract-event scanner over finalized blocks.
//
// A scanner is configured with two callbacks:
//   - `is_valid_log`: cheap pre-filter (usually "emitted by contract X")
//   - `parse_event`:  decode a filtered log; `Ok(None)` means "other event"
//
// Events keep receipt order within a block and block order across a range.
// Only successful receipts are scanned.

use std::sync::Arc;

use tracing::debug;

use valset_core::error::ValsetError;
use valset_core::traits::ChainBackend;
use valset_core::types::{FullBlock, Header, Log, Receipt};

/// Pre-filter applied to every log before decoding.
pub type LogFilter = Box<dyn Fn(&Log) -> bool + Send + Sync>;

/// Decoder for a filtered log.
pub type LogParser<T> = Box<dyn Fn(&Header, &Log) -> Result<Option<T>, ValsetError> + Send + Sync>;

/// Events found in one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEvents<T> {
    /// Header of the block the events were emitted in.
    pub header: Header,
    pub events: Vec<T>,
}

impl<T> BlockEvents<T> {
    pub fn block_number(&self) -> u64 {
        self.header.number
    }
}

/// Extracts typed events from block receipts.
pub struct EventScanner<T> {
    chain: Arc<dyn ChainBackend>,
    is_valid_log: LogFilter,
    parse_event: LogParser<T>,
}

impl<T> EventScanner<T> {
    pub fn new(chain: Arc<dyn ChainBackend>, is_valid_log: LogFilter, parse_event: LogParser<T>) -> Self {
        Self {
            chain,
            is_valid_log,
            parse_event,
        }
    }

    /// Decode the matching events of one block's receipts.
    pub fn events_from_receipts(
        &self,
        header: &Header,
        receipts: &[Receipt],
    ) -> Result<Vec<T>, ValsetError> {
        let mut events = Vec::new();
        for receipt in receipts.iter().filter(|r| r.is_success()) {
            for log in receipt.logs.iter().filter(|l| (self.is_valid_log)(l)) {
                if let Some(event) = (self.parse_event)(header, log)? {
                    events.push(event);
                }
            }
        }
        Ok(events)
    }

    /// Events of `block`, preceded by those of any blocks skipped since
    /// `last_processed`.
    pub fn get_from_blocks(
        &self,
        last_processed: u64,
        block: &FullBlock,
    ) -> Result<Vec<BlockEvents<T>>, ValsetError> {
        let number = block.number();
        let mut all = Vec::new();

        if number > last_processed.saturating_add(1) {
            debug!(
                from = last_processed + 1,
                to = number - 1,
                "backfilling missed blocks"
            );
            all = self.get_events_from_all_blocks(last_processed + 1, number - 1)?;
        }

        let events = self.events_from_receipts(&block.header, &block.receipts)?;
        if !events.is_empty() {
            all.push(BlockEvents {
                header: block.header.clone(),
                events,
            });
        }

        Ok(all)
    }

    /// Events of every block in `from..=to`, fetched from the chain.
    ///
    /// `to < from` yields nothing. A missing header or receipt fetch failure
    /// aborts the whole range.
    pub fn get_events_from_all_blocks(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<BlockEvents<T>>, ValsetError> {
        let mut all = Vec::new();
        if to < from {
            return Ok(all);
        }

        for number in from..=to {
            let header = self.chain.header_by_number(number)?.ok_or_else(|| {
                ValsetError::Chain(format!("header for block {} not found", number))
            })?;

            let receipts = self.chain.receipts_by_hash(&header.hash).map_err(|e| {
                ValsetError::Chain(format!(
                    "could not get receipts for block {}: {}",
                    number, e
                ))
            })?;

            let events = self.events_from_receipts(&header, &receipts)?;
            if !events.is_empty() {
                all.push(BlockEvents { header, events });
            }
        }

        Ok(all)
    }
}
