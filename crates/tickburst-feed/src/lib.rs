//! Book-ticker WebSocket feed for tickburst.
//!
//! Maintains a single streaming connection to the exchange book-ticker
//! channel and publishes the latest tick into a single-slot cell
//! (`tokio::sync::watch`). Only the most recent tick is retained; readers
//! wait on the cell's change signal rather than polling.

pub mod error;
pub mod parser;
pub mod source;

pub use error::{FeedError, FeedResult};
pub use parser::parse_book_ticker;
pub use source::{FeedState, TickCell, TickReceiver, TickSource, TickSourceConfig};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
