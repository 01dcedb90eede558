//! Order burst execution for tickburst.
//!
//! # Key Components
//!
//! - [`Signer`]: keyed-MAC request signing with a named algorithm registry
//! - [`RequestReactor`]: shared non-blocking HTTP dispatch loop with a
//!   concurrent registration surface and a drain gate
//! - [`RequestBuilder`]: canonical query-string assembly for order and
//!   cancel calls
//! - [`BurstOrchestrator`]: the bounded-round control loop (await tick,
//!   fan out orders, drain, dwell, fan out cancels, drain)
//!
//! The reactor splits responsibilities the same way the underlying
//! transport wants them split: many tasks may register work concurrently,
//! but a single dedicated task drives all in-flight transfers. The
//! in-flight gauge is the predicate arbitrating the two sides.

pub mod error;
pub mod orchestrator;
pub mod reactor;
pub mod request;
pub mod signer;

pub use error::{ExecError, ExecResult};
pub use orchestrator::{BurstConfig, BurstOrchestrator, RoundReport};
pub use reactor::{InFlightHandle, RequestOutcome, RequestReactor};
pub use request::{RequestBuilder, RequestConfig};
pub use signer::{ApiSecret, SignAlgo, Signer};
