//! Burst orchestration: the bounded-round control loop.
//!
//! Each round waits for a fresh tick, fans `2×K` signed order units out
//! across a fixed-size worker pool, waits on the reactor's drain gate,
//! dwells, then fans out one cancel per issued client order id and drains
//! again. The drain barrier guarantees every order registration precedes
//! any cancel registration within a round; there is no ordering guarantee
//! between individual requests of the same phase.

use crate::error::{ExecError, ExecResult};
use crate::reactor::{InFlightHandle, RequestReactor};
use crate::request::RequestBuilder;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tickburst_core::{Clock, OrderIdGenerator, OrderIntent, RoundPhase, Side, SystemClock, Tick};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Burst configuration. Defaults match the reference workload:
/// 10 rounds of 50 orders per side at ±15% around mid, 10s dwell.
#[derive(Debug, Clone)]
pub struct BurstConfig {
    /// Number of rounds to run.
    pub rounds: u32,
    /// Orders per side per round (K); a round submits 2×K units.
    pub orders_per_side: u32,
    /// Buy price offset: price = mid × (1 − spread_down).
    pub spread_down: Decimal,
    /// Sell price offset: price = mid × (1 + spread_up).
    pub spread_up: Decimal,
    /// Resting time between the order drain and the cancel burst.
    pub dwell: Duration,
    /// Worker pool size; independent of burst size, excess units queue.
    pub workers: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            orders_per_side: 50,
            spread_down: Decimal::new(15, 2),
            spread_up: Decimal::new(15, 2),
            dwell: Duration::from_secs(10),
            workers: 8,
        }
    }
}

/// Summary of one completed round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: u32,
    pub mid: Decimal,
    /// Client order ids issued in the send phase, in completion order.
    pub issued: Vec<u32>,
    pub orders_ok: usize,
    pub orders_failed: usize,
    pub cancels_ok: usize,
    pub cancels_failed: usize,
}

/// The control loop tying feed, signer, and reactor together.
pub struct BurstOrchestrator<C: Clock = SystemClock> {
    config: BurstConfig,
    builder: Arc<RequestBuilder<C>>,
    reactor: Arc<RequestReactor>,
    ids: Arc<OrderIdGenerator>,
    tick_rx: watch::Receiver<Option<Tick>>,
    workers: Arc<Semaphore>,
}

impl<C: Clock + 'static> BurstOrchestrator<C> {
    pub fn new(
        config: BurstConfig,
        builder: Arc<RequestBuilder<C>>,
        reactor: Arc<RequestReactor>,
        ids: Arc<OrderIdGenerator>,
        tick_rx: watch::Receiver<Option<Tick>>,
    ) -> Self {
        let workers = Arc::new(Semaphore::new(config.workers));
        Self {
            config,
            builder,
            reactor,
            ids,
            tick_rx,
            workers,
        }
    }

    /// Run the configured number of rounds.
    pub async fn run(mut self) -> ExecResult<Vec<RoundReport>> {
        let mut reports = Vec::with_capacity(self.config.rounds as usize);
        for round in 1..=self.config.rounds {
            reports.push(self.run_round(round).await?);
        }
        info!(rounds = self.config.rounds, "All rounds complete");
        Ok(reports)
    }

    /// One full round: tick → orders → drain → dwell → cancels → drain.
    pub async fn run_round(&mut self, round: u32) -> ExecResult<RoundReport> {
        debug!(round, phase = %RoundPhase::AwaitingTick, "Awaiting fresh tick");
        let mid = self.await_fresh_mid().await?;

        info!(
            round,
            phase = %RoundPhase::SendingOrders,
            %mid,
            count = 2 * self.config.orders_per_side,
            "Ready to send orders around mid price"
        );
        let handles = self.send_orders(mid).await;
        let issued: Vec<u32> = handles.iter().map(|(id, _)| *id).collect();

        let (orders_ok, orders_failed) = self.drain_and_release(handles).await;
        info!(
            round,
            phase = %RoundPhase::OrdersSent,
            ok = orders_ok,
            failed = orders_failed,
            "Orders sent"
        );

        tokio::time::sleep(self.config.dwell).await;

        info!(
            round,
            phase = %RoundPhase::Cancelling,
            count = issued.len(),
            "Ready to cancel orders"
        );
        let cancel_handles = self.cancel_orders(&issued).await;
        let (cancels_ok, cancels_failed) = self.drain_and_release(cancel_handles).await;

        info!(round, phase = %RoundPhase::Done, "Round complete");
        Ok(RoundReport {
            round,
            mid,
            issued,
            orders_ok,
            orders_failed,
            cancels_ok,
            cancels_failed,
        })
    }

    /// Block until a tick newer than the last consumed one is available.
    ///
    /// The watch channel's version check is the guard against spurious
    /// wakeups; the `Option` guards against a stale default before the
    /// first tick has ever arrived.
    async fn await_fresh_mid(&mut self) -> ExecResult<Decimal> {
        loop {
            self.tick_rx
                .changed()
                .await
                .map_err(|_| ExecError::TickStreamClosed)?;
            if let Some(tick) = *self.tick_rx.borrow_and_update() {
                return Ok(tick.mid());
            }
        }
    }

    /// Price plan for one round: 2×K units alternating buy below and sell
    /// above mid.
    fn unit_plan(&self, mid: Decimal) -> Vec<(Side, Decimal)> {
        let buy_price = mid * (Decimal::ONE - self.config.spread_down);
        let sell_price = mid * (Decimal::ONE + self.config.spread_up);
        (0..self.config.orders_per_side)
            .flat_map(|_| [(Side::Buy, buy_price), (Side::Sell, sell_price)])
            .collect()
    }

    /// Fan the order burst out across the worker pool and collect every
    /// unit's result. Returns only the units that registered a transfer;
    /// a failed unit is logged and skipped, the burst continues.
    async fn send_orders(&self, mid: Decimal) -> Vec<(u32, InFlightHandle)> {
        let mut join = JoinSet::new();
        for (side, price) in self.unit_plan(mid) {
            let workers = Arc::clone(&self.workers);
            let builder = Arc::clone(&self.builder);
            let reactor = Arc::clone(&self.reactor);
            let ids = Arc::clone(&self.ids);
            join.spawn(async move {
                let _permit = workers.acquire_owned().await.expect("worker pool closed");
                let id = ids.next();
                let intent = OrderIntent {
                    client_order_id: id,
                    side,
                    price,
                    timestamp_ms: builder.now_ms(),
                };
                let result = builder
                    .order_request(&intent)
                    .and_then(|req| reactor.register(req));
                match result {
                    Ok(handle) => Some((id, handle)),
                    Err(e) => {
                        warn!(client_order_id = id, error = %e, "Order unit aborted");
                        None
                    }
                }
            });
        }
        Self::collect(join).await
    }

    /// Fan out one cancel per recorded client order id — exactly that
    /// set, regardless of what the global id counter has moved on to.
    async fn cancel_orders(&self, issued: &[u32]) -> Vec<(u32, InFlightHandle)> {
        let mut join = JoinSet::new();
        for id in issued.iter().copied() {
            let workers = Arc::clone(&self.workers);
            let builder = Arc::clone(&self.builder);
            let reactor = Arc::clone(&self.reactor);
            join.spawn(async move {
                let _permit = workers.acquire_owned().await.expect("worker pool closed");
                let result = builder
                    .cancel_request(id)
                    .and_then(|req| reactor.register(req));
                match result {
                    Ok(handle) => Some((id, handle)),
                    Err(e) => {
                        warn!(client_order_id = id, error = %e, "Cancel unit aborted");
                        None
                    }
                }
            });
        }
        Self::collect(join).await
    }

    /// Wait-for-all barrier over a fan-out: the caller does not proceed
    /// until every submission has returned.
    async fn collect(mut join: JoinSet<Option<(u32, InFlightHandle)>>) -> Vec<(u32, InFlightHandle)> {
        let mut out = Vec::with_capacity(join.len());
        while let Some(res) = join.join_next().await {
            match res {
                Ok(Some(pair)) => out.push(pair),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Burst unit panicked"),
            }
        }
        out
    }

    /// Wait for the drain gate, then take and log every outcome. Handles
    /// are consumed here, releasing their resources on every path.
    async fn drain_and_release(&self, handles: Vec<(u32, InFlightHandle)>) -> (usize, usize) {
        self.reactor.drain_wait().await;

        let mut ok = 0;
        let mut failed = 0;
        for (id, handle) in handles {
            match handle.into_outcome() {
                Some(outcome) if outcome.is_success() => ok += 1,
                Some(outcome) => {
                    failed += 1;
                    warn!(client_order_id = id, ?outcome, "Request did not succeed");
                }
                None => {
                    failed += 1;
                    warn!(client_order_id = id, "Request outcome missing after drain");
                }
            }
        }
        (ok, failed)
    }
}
