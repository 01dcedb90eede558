//! Non-blocking HTTP dispatch reactor.
//!
//! Many tasks may register signed requests concurrently; one dedicated
//! reactor task drives every in-flight transfer. The in-flight gauge is
//! published through a `watch` channel: registration bumps it *before*
//! handing the job to the reactor, so a drain waiter can never observe a
//! missed registration, and `drain_wait` re-checks the count on every
//! wakeup (no spurious-wakeup hazard).

use crate::error::{ExecError, ExecResult};
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use std::sync::Arc;
use tickburst_core::{HttpMethod, SignedRequest};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Final state of one registered transfer.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// The exchange answered; carries the HTTP status code. A non-2xx
    /// status still counts as a completed transfer for drain purposes.
    Completed { status: u16 },
    /// Transport-level failure. Also counts toward drain.
    TransportFailed { error: String },
}

impl RequestOutcome {
    /// True when the exchange answered with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { status } if (200..300).contains(status))
    }
}

/// Handle to one in-flight transfer.
///
/// Held from registration until after the drain that covers the transfer;
/// dropping the handle releases its resources on every exit path. Once
/// `drain_wait` has returned, the outcome slot is guaranteed filled.
#[derive(Debug)]
pub struct InFlightHandle {
    correlation_id: Option<u32>,
    outcome_rx: oneshot::Receiver<RequestOutcome>,
}

impl InFlightHandle {
    /// Client order id echoed from the request, if any.
    #[must_use]
    pub fn correlation_id(&self) -> Option<u32> {
        self.correlation_id
    }

    /// Consume the handle and take the outcome without blocking.
    ///
    /// Returns `None` if the transfer has not completed yet; after a
    /// covering `drain_wait` this always returns `Some`.
    pub fn into_outcome(mut self) -> Option<RequestOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Consume the handle and wait for the outcome.
    pub async fn outcome(self) -> Option<RequestOutcome> {
        self.outcome_rx.await.ok()
    }
}

struct ReactorJob {
    request: reqwest::Request,
    outcome_tx: oneshot::Sender<RequestOutcome>,
}

/// Shared HTTP dispatch context.
///
/// Cheap to share behind an `Arc`; `register` is safe from any task.
pub struct RequestReactor {
    client: reqwest::Client,
    job_tx: mpsc::UnboundedSender<ReactorJob>,
    inflight_tx: Arc<watch::Sender<u32>>,
    inflight_rx: watch::Receiver<u32>,
}

impl RequestReactor {
    /// Start the reactor: build the shared client and spawn the dispatch
    /// task. The task exits once every reactor clone is dropped and the
    /// remaining transfers have finished.
    pub fn start() -> (Arc<Self>, JoinHandle<()>) {
        let client = reqwest::Client::new();
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (inflight_tx, inflight_rx) = watch::channel(0u32);
        let inflight_tx = Arc::new(inflight_tx);

        let reactor = Arc::new(Self {
            client: client.clone(),
            job_tx,
            inflight_tx: Arc::clone(&inflight_tx),
            inflight_rx,
        });
        let task = tokio::spawn(reactor_loop(client, job_rx, inflight_tx));
        (reactor, task)
    }

    /// Register a signed request for dispatch.
    ///
    /// Builds the transport request, increments the in-flight gauge, and
    /// queues the transfer. Registration and the gauge increment are
    /// atomic with respect to drain waiters.
    pub fn register(&self, req: SignedRequest) -> ExecResult<InFlightHandle> {
        let request = self.build_transport_request(&req)?;
        let (outcome_tx, outcome_rx) = oneshot::channel();

        // Bump the gauge before queueing so a concurrent drain_wait cannot
        // slip through between enqueue and increment.
        self.inflight_tx.send_modify(|n| *n += 1);

        let job = ReactorJob {
            request,
            outcome_tx,
        };
        if self.job_tx.send(job).is_err() {
            self.inflight_tx.send_modify(|n| *n = n.saturating_sub(1));
            return Err(ExecError::ReactorUnavailable);
        }

        trace!(correlation_id = ?req.correlation_id, "Transfer registered");
        Ok(InFlightHandle {
            correlation_id: req.correlation_id,
            outcome_rx,
        })
    }

    /// Block the caller until the in-flight count reaches zero.
    ///
    /// Never returns while the count is nonzero. There is no per-request
    /// timeout: a hung transfer blocks drain indefinitely.
    pub async fn drain_wait(&self) {
        let mut rx = self.inflight_rx.clone();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|&n| n == 0).await;
        debug!("Reactor drained");
    }

    /// Current in-flight transfer count.
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        *self.inflight_rx.borrow()
    }

    fn build_transport_request(&self, req: &SignedRequest) -> ExecResult<reqwest::Request> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let url = reqwest::Url::parse(&req.url)
            .map_err(|e| ExecError::InvalidRequest(format!("bad url: {e}")))?;

        let mut builder = self.client.request(method, url);
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }
        builder
            .build()
            .map_err(|e| ExecError::InvalidRequest(e.to_string()))
    }
}

/// Dedicated dispatch loop.
///
/// Parks on the job channel while nothing is in flight; once at least one
/// transfer is registered, drives all of them concurrently while still
/// accepting new registrations, until the set empties again.
async fn reactor_loop(
    client: reqwest::Client,
    mut job_rx: mpsc::UnboundedReceiver<ReactorJob>,
    inflight_tx: Arc<watch::Sender<u32>>,
) {
    let mut in_flight = FuturesUnordered::new();
    let mut closed = false;

    loop {
        tokio::select! {
            job = job_rx.recv(), if !closed => {
                match job {
                    Some(job) => {
                        in_flight.push(dispatch(client.clone(), Arc::clone(&inflight_tx), job));
                    }
                    None => closed = true,
                }
            }
            Some(()) = in_flight.next() => {}
            else => break,
        }
    }
    debug!("Reactor loop finished");
}

/// Drive one transfer to completion, fulfil its outcome slot, and only
/// then decrement the gauge — so every outcome is observable by the time
/// a covering drain returns.
async fn dispatch(
    client: reqwest::Client,
    inflight_tx: Arc<watch::Sender<u32>>,
    job: ReactorJob,
) {
    let outcome = match client.execute(job.request).await {
        Ok(response) => {
            let status = response.status().as_u16();
            // The body is not interesting; consume it to finish the transfer.
            let _ = response.bytes().await;
            RequestOutcome::Completed { status }
        }
        Err(e) => {
            warn!(error = %e, "Transfer failed at transport level");
            RequestOutcome::TransportFailed {
                error: e.to_string(),
            }
        }
    };

    // The handle may already have been dropped; that is a valid release.
    let _ = job.outcome_tx.send(outcome);
    inflight_tx.send_modify(|n| *n = n.saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A request that fails fast with a transport error (nothing listens
    /// on the discard port).
    fn unroutable_request(correlation_id: Option<u32>) -> SignedRequest {
        SignedRequest {
            method: HttpMethod::Post,
            url: "http://127.0.0.1:9/v1/order?x=1&signature=aa".to_string(),
            headers: vec![("X-MBX-APIKEY".to_string(), "key".to_string())],
            correlation_id,
        }
    }

    #[tokio::test]
    async fn test_drain_on_idle_reactor_returns_immediately() {
        let (reactor, _task) = RequestReactor::start();
        assert_eq!(reactor.in_flight(), 0);
        reactor.drain_wait().await;
    }

    #[tokio::test]
    async fn test_register_increments_and_drain_waits_for_zero() {
        let (reactor, _task) = RequestReactor::start();

        let handle = reactor.register(unroutable_request(Some(7))).unwrap();
        assert_eq!(handle.correlation_id(), Some(7));

        reactor.drain_wait().await;
        assert_eq!(reactor.in_flight(), 0);

        let outcome = handle.into_outcome().expect("outcome filled after drain");
        assert!(matches!(outcome, RequestOutcome::TransportFailed { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_all_observed() {
        const R: usize = 40;
        let (reactor, _task) = RequestReactor::start();

        let mut joins = Vec::new();
        for i in 0..R {
            let reactor = Arc::clone(&reactor);
            joins.push(tokio::spawn(async move {
                reactor.register(unroutable_request(Some(i as u32))).unwrap()
            }));
        }

        let mut handles = Vec::new();
        for join in joins {
            handles.push(join.await.expect("registration task"));
        }
        assert_eq!(handles.len(), R);

        reactor.drain_wait().await;
        assert_eq!(reactor.in_flight(), 0);

        // Exactly R transfers ran: every handle has a filled outcome slot.
        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|h| h.into_outcome().expect("outcome after drain"))
            .collect();
        assert_eq!(outcomes.len(), R);
    }

    #[tokio::test]
    async fn test_bad_url_is_rejected_without_registration() {
        let (reactor, _task) = RequestReactor::start();
        let mut req = unroutable_request(None);
        req.url = "not a url".to_string();

        let err = reactor.register(req).unwrap_err();
        assert!(matches!(err, ExecError::InvalidRequest(_)));
        assert_eq!(reactor.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropping_handle_early_is_a_valid_release() {
        let (reactor, _task) = RequestReactor::start();
        drop(reactor.register(unroutable_request(None)).unwrap());
        // The transfer still runs and the gauge still drains.
        reactor.drain_wait().await;
        assert_eq!(reactor.in_flight(), 0);
    }

    #[test]
    fn test_outcome_success_classification() {
        assert!(RequestOutcome::Completed { status: 200 }.is_success());
        assert!(!RequestOutcome::Completed { status: 404 }.is_success());
        assert!(!RequestOutcome::TransportFailed {
            error: "refused".to_string()
        }
        .is_success());
    }
}
