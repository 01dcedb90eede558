//! Core domain types for the tickburst order burst driver.
//!
//! This crate provides the fundamental types shared across the system:
//! - `Tick`: one market-data update with best bid/ask
//! - `OrderIntent`, `Side`: units of burst work
//! - `SignedRequest`, `HttpMethod`: transport-ready request descriptions
//! - `OrderIdGenerator`: process-wide monotonic client order ids
//! - `Clock`: time source abstraction for testability

pub mod clock;
pub mod id;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use id::OrderIdGenerator;
pub use types::{HttpMethod, OrderIntent, RoundPhase, Side, SignedRequest, Tick};
