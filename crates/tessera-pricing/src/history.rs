//! # History Recorder
//!
//! Best-effort, bounded price change log.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       History Recording                                 │
//! │                                                                         │
//! │  PriceStore / RegionalOverrides                                        │
//! │       │                                                                 │
//! │       │  recorder.record(entry)   ← try_send, never blocks or fails    │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────┐                                     │
//! │  │ bounded mpsc (capacity N)     │  full? entry dropped + warn!        │
//! │  └───────────────┬───────────────┘                                     │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  HistoryWorker::run (one task)                                         │
//! │       │  log.append(entry, MAX_HISTORY_ENTRIES)                        │
//! │       │  failure? warn! and move on                                    │
//! │       ▼                                                                 │
//! │  price_history (newest first, ≤ 100 per variant)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are applied in the order they were queued. `flush()` waits until
//! everything queued before it has been applied.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use tessera_core::money::format_price;
use tessera_core::ports::PriceHistoryLog;
use tessera_core::{
    AuditTrail, CoreError, HistoryFilter, PriceHistoryEntry, RecentHistoryFilter,
    ValidationError, BULK_SCAN_LIMIT, DEFAULT_HISTORY_DAYS, DEFAULT_LIST_LIMIT,
    MAX_HISTORY_DAYS, MAX_HISTORY_ENTRIES,
};

use crate::error::{PricingError, PricingResult};

// =============================================================================
// Commands
// =============================================================================

enum HistoryCommand {
    Append(PriceHistoryEntry),
    Flush(oneshot::Sender<()>),
}

// =============================================================================
// Recorder (handle)
// =============================================================================

/// Cheap, cloneable handle for recording and reading price history.
#[derive(Clone)]
pub struct HistoryRecorder {
    commands: mpsc::Sender<HistoryCommand>,
    shutdown_tx: mpsc::Sender<()>,
    log: Arc<dyn PriceHistoryLog>,
}

impl HistoryRecorder {
    /// Queues an entry without waiting.
    ///
    /// A full or closed queue drops the entry with a warning; the price
    /// change that triggered it is never affected.
    pub fn record(&self, entry: PriceHistoryEntry) {
        let variant_id = entry.variant_id.clone();

        match self.commands.try_send(HistoryCommand::Append(entry)) {
            Ok(()) => debug!(variant_id = %variant_id, "Queued price history entry"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(variant_id = %variant_id, "History queue full, dropping entry");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(variant_id = %variant_id, "History queue closed, dropping entry");
            }
        }
    }

    /// Waits until every entry queued so far has been written (or dropped).
    pub async fn flush(&self) -> PricingResult<()> {
        let (done_tx, done_rx) = oneshot::channel();

        self.commands
            .send(HistoryCommand::Flush(done_tx))
            .await
            .map_err(|_| PricingError::HistoryQueueClosed)?;

        done_rx.await.map_err(|_| PricingError::HistoryQueueClosed)
    }

    /// Asks the worker to drain the queue and stop.
    pub async fn shutdown(&self) -> PricingResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| PricingError::HistoryQueueClosed)
    }

    /// A variant's history, newest first.
    ///
    /// `limit` defaults to (and is capped at) the retained maximum.
    pub async fn get_price_history(
        &self,
        variant_id: &str,
        filter: &HistoryFilter,
    ) -> PricingResult<Vec<PriceHistoryEntry>> {
        let limit = filter
            .limit
            .unwrap_or(MAX_HISTORY_ENTRIES)
            .min(MAX_HISTORY_ENTRIES);

        Ok(self
            .log
            .list_variant_history(variant_id, filter.currency_code, limit)
            .await?)
    }

    /// Recent changes across all variants, newest first.
    ///
    /// A window longer than [`MAX_HISTORY_DAYS`] is a validation error.
    pub async fn get_bulk_price_history(
        &self,
        filter: &RecentHistoryFilter,
    ) -> PricingResult<Vec<PriceHistoryEntry>> {
        let days = filter.days.unwrap_or(DEFAULT_HISTORY_DAYS).max(0);
        if days > MAX_HISTORY_DAYS {
            return Err(CoreError::from(ValidationError::AboveMaximum {
                field: "days".to_string(),
                max: MAX_HISTORY_DAYS,
            })
            .into());
        }
        let limit = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(BULK_SCAN_LIMIT);
        let since = Utc::now() - Duration::days(days);

        debug!(days, limit, currency = ?filter.currency_code, "Scanning recent price history");

        Ok(self
            .log
            .list_recent_history(filter.currency_code, since, limit)
            .await?)
    }

    /// Full retained history of a variant, for the audit view.
    pub async fn audit_trail(
        &self,
        variant_id: &str,
        variant_title: Option<String>,
    ) -> PricingResult<AuditTrail> {
        let history = self
            .get_price_history(variant_id, &HistoryFilter::default())
            .await?;

        Ok(AuditTrail {
            variant_id: variant_id.to_string(),
            variant_title,
            total_changes: history.len(),
            history,
        })
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Background task applying queued history entries.
pub struct HistoryWorker {
    log: Arc<dyn PriceHistoryLog>,
    commands: mpsc::Receiver<HistoryCommand>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl HistoryWorker {
    /// Creates a worker and its recorder handle.
    ///
    /// `capacity` bounds the number of entries waiting to be written.
    pub fn new(log: Arc<dyn PriceHistoryLog>, capacity: usize) -> (Self, HistoryRecorder) {
        let (commands_tx, commands_rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = HistoryWorker {
            log: log.clone(),
            commands: commands_rx,
            shutdown_rx,
        };

        let recorder = HistoryRecorder {
            commands: commands_tx,
            shutdown_tx,
            log,
        };

        (worker, recorder)
    }

    /// Runs the worker loop.
    ///
    /// This should be spawned as a background task. It stops after a
    /// shutdown request (draining what is already queued) or once every
    /// recorder handle is dropped.
    pub async fn run(mut self) {
        info!("History worker starting");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },

                _ = self.shutdown_rx.recv() => {
                    info!("History worker shutting down, draining queue");
                    self.commands.close();
                    while let Some(command) = self.commands.recv().await {
                        self.handle(command).await;
                    }
                    break;
                }
            }
        }

        info!("History worker stopped");
    }

    async fn handle(&self, command: HistoryCommand) {
        match command {
            HistoryCommand::Append(entry) => {
                if let Err(e) = self.log.append(&entry, MAX_HISTORY_ENTRIES).await {
                    warn!(
                        variant_id = %entry.variant_id,
                        currency = %entry.currency_code,
                        error = %e,
                        "Failed to record price history"
                    );
                }
            }
            HistoryCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// History entry with display strings for both amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedHistoryEntry {
    #[serde(flatten)]
    pub entry: PriceHistoryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_old_amount: Option<String>,
    pub formatted_new_amount: String,
}

impl From<PriceHistoryEntry> for FormattedHistoryEntry {
    fn from(entry: PriceHistoryEntry) -> Self {
        FormattedHistoryEntry {
            formatted_old_amount: entry
                .old_amount
                .map(|amount| format_price(amount, entry.currency_code)),
            formatted_new_amount: format_price(entry.new_amount, entry.currency_code),
            entry,
        }
    }
}
