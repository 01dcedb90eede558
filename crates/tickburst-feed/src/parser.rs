//! Book-ticker message parsing.
//!
//! Inbound messages are JSON text with best bid in `b` and best ask in
//! `a`, both string-encoded. Anything else is not a tick and is dropped
//! by the caller; a parse failure never propagates.

use rust_decimal::Decimal;
use serde::Deserialize;
use tickburst_core::Tick;

/// Raw book-ticker frame. Fields other than `b`/`a` are ignored.
#[derive(Debug, Deserialize)]
struct RawBookTicker {
    /// Best bid price (string-encoded).
    b: String,
    /// Best ask price (string-encoded).
    a: String,
}

/// Parse one text frame into a tick.
///
/// Returns `None` for any shape that is not a well-formed book-ticker
/// update, including unparseable prices.
#[must_use]
pub fn parse_book_ticker(text: &str) -> Option<Tick> {
    let raw: RawBookTicker = serde_json::from_str(text).ok()?;
    let bid: Decimal = raw.b.parse().ok()?;
    let ask: Decimal = raw.a.parse().ok()?;
    Some(Tick::new(bid, ask))
}
