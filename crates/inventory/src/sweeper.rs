//! Periodic release of expired holds.
//!
//! Each tick is one transaction: lock the expired ACTIVE holds, mark them
//! EXPIRED, and return their units with a single bulk increment per tick.
//! A failed tick rolls back completely and the same holds are found again
//! on the next tick. A hold that was committed as EXPIRED is never selected
//! again, so no unit is returned twice.

use std::sync::Arc;
use std::time::Duration;

use dropstock_core::clock::Clock;
use dropstock_core::reservation::units_per_drop;
use dropstock_core::types::DbId;
use dropstock_db::models::drop::StockLevel;
use dropstock_db::repositories::{DropRepo, ReservationRepo};
use dropstock_db::DbPool;
use dropstock_events::EventNotifier;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::InventoryResult;

/// Outcome of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Holds moved from ACTIVE to EXPIRED.
    pub expired: usize,
    /// New stock level of every drop that received units back.
    pub stock_levels: Vec<StockLevel>,
}

/// Returns stock from holds whose deadline has passed.
#[derive(Clone)]
pub struct ExpirationSweeper {
    pool: DbPool,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirationSweeper {
    pub fn new(
        pool: DbPool,
        notifier: Arc<dyn EventNotifier>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            pool,
            notifier,
            clock,
            interval,
        }
    }

    /// Run one sweep now.
    ///
    /// Holds currently locked by an in-flight purchase are skipped and left
    /// to that purchase or to a later sweep.
    pub async fn sweep_once(&self) -> InventoryResult<SweepReport> {
        let mut tx = self.pool.begin().await?;

        let candidates = ReservationRepo::lock_expired(&mut tx, self.clock.now()).await?;
        if candidates.is_empty() {
            tx.commit().await?;
            return Ok(SweepReport::default());
        }

        let ids: Vec<DbId> = candidates.iter().map(|h| h.id).collect();
        let expired = ReservationRepo::mark_expired(&mut tx, &ids).await?;

        let pairs: Vec<(DbId, DbId)> = expired.iter().map(|h| (h.id, h.drop_id)).collect();
        let returns: Vec<(DbId, i32)> = units_per_drop(&pairs).into_iter().collect();
        let drop_ids: Vec<DbId> = returns.iter().map(|&(drop_id, _)| drop_id).collect();

        DropRepo::lock_many(&mut tx, &drop_ids).await?;
        let stock_levels = DropRepo::return_units(&mut tx, &returns).await?;

        tx.commit().await?;

        for &(drop_id, units) in &returns {
            tracing::debug!(drop_id, units, "Returned units from expired holds");
        }
        for level in &stock_levels {
            self.notifier
                .notify_stock_changed(level.drop_id, level.available_stock);
        }

        Ok(SweepReport {
            expired: expired.len(),
            stock_levels,
        })
    }

    /// Sweep on a fixed interval until `cancel` fires.
    ///
    /// Cancellation is checked between ticks; a tick already in progress
    /// finishes and commits (or rolls back) on its own.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Expiration sweeper started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Expiration sweeper stopping");
                    break;
                }
                _ = interval.tick() => self.tick().await,
            }
        }
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(self.run(cancel.clone()));
        SweeperHandle { cancel, join }
    }

    async fn tick(&self) {
        match self.sweep_once().await {
            Ok(report) if report.expired > 0 => {
                tracing::info!(
                    expired = report.expired,
                    drops = report.stock_levels.len(),
                    "Expired reservations released"
                );
            }
            Ok(_) => tracing::debug!("Sweep: nothing expired"),
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Sweep rolled back, retrying next tick");
            }
            Err(e) => tracing::error!(error = %e, "Sweep failed"),
        }
    }
}

/// Handle to a spawned sweeper task.
pub struct SweeperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop scheduling new ticks. Returns immediately.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the sweeper task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop and wait up to `timeout` for an in-flight tick to finish.
    ///
    /// Returns `false` if the task was still running when the timeout hit.
    pub async fn shutdown(self, timeout: Duration) -> bool {
        self.cancel.cancel();
        tokio::time::timeout(timeout, self.join).await.is_ok()
    }
}
