//! Domain types for ticks, order intents, and signed requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire representation used in exchange query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One market-data update containing best bid/ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
}

impl Tick {
    /// Create a new tick.
    #[must_use]
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }

    /// Mid price: (bid + ask) / 2.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// One unit of burst work, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    /// Unique, monotonically assigned client order id.
    pub client_order_id: u32,
    /// Order side.
    pub side: Side,
    /// Limit price.
    pub price: Decimal,
    /// Creation time in milliseconds since Unix epoch.
    pub timestamp_ms: u64,
}

/// HTTP method for exchange requests.
///
/// A closed enum: requests with an unrepresentable method cannot be built,
/// so there is no runtime "unknown method" branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A fully built, authenticated exchange request.
///
/// The url already carries the canonical query string and its signature.
/// Consumed exactly once by the request reactor.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Complete request URL including query string and signature.
    pub url: String,
    /// Header key/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Echoes the client order id for order calls; `None` otherwise.
    pub correlation_id: Option<u32>,
}

/// Phase of one burst round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingTick,
    SendingOrders,
    OrdersSent,
    Cancelling,
    Done,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingTick => "awaiting_tick",
            Self::SendingOrders => "sending_orders",
            Self::OrdersSent => "orders_sent",
            Self::Cancelling => "cancelling",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}
