//! Ordered broadcast with crash-safe resumption
//!
//! Transactions are submitted strictly in order. A node rejection is
//! classified once, at this boundary, into a [`RejectionKind`]:
//!
//! - **Transient** - resubmitted after a fixed interval, only when retrying is enabled
//! - **AlreadyApplied** - the node already has the transaction, continue with the next one
//! - **Fatal** - the failing transaction and everything after it go to the pending
//!   queue and the sequence stops
//!
//! The queue is removed only once every transaction in a run has been accepted
//! or recognised as already applied.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::BroadcastConfig;
use crate::errors::{AppResult, BroadcastError, RpcError};
use crate::rpc::Broadcaster;
use crate::store::StateStore;

/// Typed view of a failed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Transient,
    AlreadyApplied,
    Fatal,
}

/// Node reason substrings, matched verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPatterns {
    pub transient: Vec<String>,
    pub already_applied: Vec<String>,
}

impl BroadcastPatterns {
    pub fn from_config(config: &BroadcastConfig) -> Self {
        Self {
            transient: config.transient_patterns.clone(),
            already_applied: config.already_applied_patterns.clone(),
        }
    }

    /// Classify a submission failure
    ///
    /// Failures without a node answer (timeouts, refused connections) are fatal:
    /// whether the node saw the transaction is unknown, so it stays queued.
    pub fn classify(&self, err: &RpcError) -> RejectionKind {
        let Some(message) = err.remote_message() else {
            return RejectionKind::Fatal;
        };
        if self.transient.iter().any(|p| message.contains(p.as_str())) {
            RejectionKind::Transient
        } else if self.already_applied.iter().any(|p| message.contains(p.as_str())) {
            RejectionKind::AlreadyApplied
        } else {
            RejectionKind::Fatal
        }
    }
}

impl Default for BroadcastPatterns {
    fn default() -> Self {
        Self::from_config(&BroadcastConfig::default())
    }
}

/// Result of one submission in a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted now; carries the txid reported by the node
    Accepted(String),
    /// The node already knew the transaction or its inputs were spent by it
    AlreadyApplied,
}

/// Broadcast sequencer over a [`Broadcaster`] and the pending queue store
pub struct Sequencer {
    broadcaster: Arc<dyn Broadcaster>,
    pending: Arc<dyn StateStore<Vec<String>>>,
    patterns: BroadcastPatterns,
    retry_interval: Duration,
    propagation_delay: Duration,
}

impl Sequencer {
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        pending: Arc<dyn StateStore<Vec<String>>>,
        patterns: BroadcastPatterns,
    ) -> Self {
        Self {
            broadcaster,
            pending,
            patterns,
            retry_interval: Duration::from_millis(1000),
            propagation_delay: Duration::ZERO,
        }
    }

    /// Wait before resubmitting a transiently rejected transaction
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Wait between consecutive submissions so each input is known to the node
    pub fn with_propagation_delay(mut self, delay: Duration) -> Self {
        self.propagation_delay = delay;
        self
    }

    /// True when an earlier run left unsent transactions behind
    pub fn has_pending(&self) -> AppResult<bool> {
        self.pending.exists()
    }

    /// Submit `txs` in order
    ///
    /// # Arguments
    /// * `txs` - serialised transactions, each depending only on earlier ones
    /// * `retry` - resubmit on transient rejections instead of failing
    ///
    /// # Errors
    /// [`BroadcastError::Unrecoverable`] after `txs[i..]` has been written to
    /// the pending queue, where `i` is the failing transaction.
    pub async fn broadcast_all(&self, txs: &[String], retry: bool) -> AppResult<Vec<Submission>> {
        let total = txs.len();
        let mut submissions = Vec::with_capacity(total);

        for (index, hex) in txs.iter().enumerate() {
            if index > 0 && !self.propagation_delay.is_zero() {
                debug!("Waiting {:?} for propagation", self.propagation_delay);
                sleep(self.propagation_delay).await;
            }

            info!("Broadcasting transaction {} of {}", index + 1, total);
            match self.submit(hex, retry).await {
                Ok(txid) => {
                    debug!("Accepted {}", txid);
                    submissions.push(Submission::Accepted(txid));
                }
                Err(e) if self.patterns.classify(&e) == RejectionKind::AlreadyApplied => {
                    info!("Transaction {} already sent, skipping: {}", index + 1, e);
                    submissions.push(Submission::AlreadyApplied);
                }
                Err(e) => {
                    error!("Broadcast of transaction {} failed: {}", index + 1, e);
                    self.pending
                        .save(&txs[index..].to_vec())
                        .map_err(|se| BroadcastError::Store(se.to_string()))?;
                    warn!(
                        "Saved {} pending transaction(s) to {}",
                        total - index,
                        self.pending.location()
                    );
                    return Err(BroadcastError::Unrecoverable {
                        index: index + 1,
                        total,
                        reason: e.to_string(),
                        pending_path: self.pending.location(),
                    }
                    .into());
                }
            }
        }

        self.pending
            .clear()
            .map_err(|e| BroadcastError::Store(e.to_string()))?;
        Ok(submissions)
    }

    /// Rebroadcast a queue left by an earlier run, with retrying disabled
    ///
    /// Returns `None` when there is nothing pending.
    pub async fn resume_pending(&self) -> AppResult<Option<Vec<Submission>>> {
        let Some(txs) = self
            .pending
            .load()
            .map_err(|e| BroadcastError::Store(e.to_string()))?
        else {
            return Ok(None);
        };

        info!(
            "Found {} pending transaction(s) in {}, rebroadcasting",
            txs.len(),
            self.pending.location()
        );
        self.broadcast_all(&txs, false).await.map(Some)
    }

    /// One transaction, resubmitting on transient rejections when `retry` is set
    async fn submit(&self, hex: &str, retry: bool) -> Result<String, RpcError> {
        loop {
            match self.broadcaster.send_raw_transaction(hex).await {
                Ok(txid) => return Ok(txid),
                Err(e) if retry && self.patterns.classify(&e) == RejectionKind::Transient => {
                    warn!("Retrying in {:?}: {}", self.retry_interval, e);
                    sleep(self.retry_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
