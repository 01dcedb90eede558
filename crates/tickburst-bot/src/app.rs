//! Main application orchestration.
//!
//! Owns every long-lived component and wires them together:
//! tick source → mid-price cell → burst orchestrator → request reactor.
//! All shared state is created here and handed into constructors; nothing
//! is ambient.

use crate::config::AppConfig;
use crate::error::AppResult;
use std::sync::Arc;
use tickburst_core::OrderIdGenerator;
use tickburst_exec::{ApiSecret, BurstOrchestrator, RequestBuilder, RequestReactor, Signer};
use tickburst_feed::TickSource;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main application.
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the whole burst workload, then shut every component down.
    pub async fn run(self) -> AppResult<()> {
        // Validate signing configuration before any network activity: an
        // unknown algorithm is fatal.
        let secret = ApiSecret::new(self.config.api_secret.clone());
        let signer = Signer::new(&self.config.sign_algo, secret)?;

        let (tick_tx, tick_rx) = TickSource::cell();
        let shutdown = CancellationToken::new();
        let source = TickSource::new(self.config.tick_source_config(), tick_tx, shutdown.clone());
        let feed_task = tokio::spawn(source.run());

        let (reactor, reactor_task) = RequestReactor::start();
        let builder = Arc::new(RequestBuilder::new(self.config.request_config(), signer));
        let ids = Arc::new(OrderIdGenerator::new());
        let orchestrator = BurstOrchestrator::new(
            self.config.burst_config(),
            builder,
            Arc::clone(&reactor),
            ids,
            tick_rx,
        );

        info!(
            rounds = self.config.rounds,
            orders_per_side = self.config.orders_per_side,
            symbol = %self.config.symbol,
            "Starting burst run"
        );

        let run_result = tokio::select! {
            result = orchestrator.run() => Some(result),
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down early");
                None
            }
        };

        // Stop the feed with a clean close handshake.
        shutdown.cancel();
        match feed_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Tick source ended with error"),
            Err(e) => warn!(error = %e, "Tick source task failed"),
        }

        // Dropping the last reactor handle lets the dispatch loop finish
        // any remaining transfers and exit.
        drop(reactor);
        if let Err(e) = reactor_task.await {
            warn!(error = %e, "Reactor task failed");
        }

        match run_result {
            Some(Ok(reports)) => {
                info!(rounds = reports.len(), "Done");
                Ok(())
            }
            Some(Err(e)) => {
                error!(error = %e, "Burst run failed");
                Err(e.into())
            }
            None => Ok(()),
        }
    }
}
