//! Tick source: connection lifecycle and mid-price publication.

use crate::error::{FeedError, FeedResult};
use crate::parser::parse_book_ticker;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tickburst_core::Tick;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Single-slot cell holding the latest tick. `None` until the first tick
/// arrives, so a reader can never consume a stale default price.
pub type TickCell = watch::Sender<Option<Tick>>;
/// Reader end of the tick cell.
pub type TickReceiver = watch::Receiver<Option<Tick>>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Disconnected,
    Connecting,
    Streaming,
    Closed,
}

/// Tick source configuration.
#[derive(Debug, Clone)]
pub struct TickSourceConfig {
    /// Book-ticker stream URL, e.g.
    /// `wss://stream.binancefuture.com/ws/btcusdt@bookTicker`.
    pub url: String,
}

/// Streaming tick source.
///
/// Owns the WebSocket connection for its whole lifetime. On each inbound
/// book-ticker frame the mid-price cell is overwritten and waiters are
/// woken. There is no automatic reconnect: any transport error moves the
/// source to `Closed` and ends the stream.
pub struct TickSource {
    config: TickSourceConfig,
    state: Arc<RwLock<FeedState>>,
    tick_tx: TickCell,
    shutdown: CancellationToken,
}

impl TickSource {
    /// Create a new tick cell pair.
    pub fn cell() -> (TickCell, TickReceiver) {
        watch::channel(None)
    }

    /// Create a new tick source publishing into `tick_tx`.
    pub fn new(config: TickSourceConfig, tick_tx: TickCell, shutdown: CancellationToken) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(FeedState::Disconnected)),
            tick_tx,
            shutdown,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FeedState {
        *self.state.read()
    }

    /// Connect and stream until shutdown or transport failure.
    ///
    /// Runs the connection for its whole lifetime; intended to be spawned
    /// as a dedicated task.
    pub async fn run(self) -> FeedResult<()> {
        *self.state.write() = FeedState::Connecting;
        info!(url = %self.config.url, "Connecting to book-ticker stream");

        let connect = connect_async_tls_with_config(&self.config.url, None, true, None);
        let (ws_stream, _response) = match connect.await {
            Ok(ok) => ok,
            Err(e) => {
                *self.state.write() = FeedState::Closed;
                error!(?e, "Book-ticker handshake failed");
                return Err(FeedError::ConnectionFailed(e.to_string()));
            }
        };

        *self.state.write() = FeedState::Streaming;
        info!("Book-ticker stream connected");

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!("Shutdown requested, closing book-ticker stream");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    *self.state.write() = FeedState::Closed;
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                error!(?e, "Failed to send pong");
                                *self.state.write() = FeedState::Closed;
                                return Err(e.into());
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Book-ticker stream closed by server");
                            *self.state.write() = FeedState::Closed;
                            return Err(FeedError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(?e, "Book-ticker read error");
                            *self.state.write() = FeedState::Closed;
                            return Err(e.into());
                        }
                        None => {
                            warn!("Book-ticker stream ended");
                            *self.state.write() = FeedState::Closed;
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Parse a text frame and publish the tick. Frames that do not parse
    /// as book-ticker updates are dropped without touching the cell.
    fn handle_text_frame(&self, text: &str) {
        match parse_book_ticker(text) {
            Some(tick) => {
                trace!(bid = %tick.bid, ask = %tick.ask, mid = %tick.mid(), "Tick");
                self.tick_tx.send_replace(Some(tick));
            }
            None => {
                trace!("Dropping non-tick frame");
            }
        }
    }
}
