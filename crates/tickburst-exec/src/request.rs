//! Canonical request building for the exchange REST API.
//!
//! Query strings are assembled in the exchange's canonical parameter
//! order, signed over the unsigned query, and the signature is appended
//! as the final parameter. Authentication travels in the `X-MBX-APIKEY`
//! header.

use crate::error::ExecResult;
use crate::signer::Signer;
use rust_decimal::Decimal;
use tickburst_core::{Clock, HttpMethod, OrderIntent, SignedRequest, SystemClock};

/// Static request parameters.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// REST base URL ending in a slash, e.g.
    /// `https://testnet.binancefuture.com/fapi/`.
    pub base_url: String,
    /// API key sent in the `X-MBX-APIKEY` header.
    pub api_key: String,
    /// Trading symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Request validity window in milliseconds.
    pub recv_window_ms: u64,
    /// Order quantity per unit.
    pub quantity: Decimal,
}

/// Builds signed order and cancel requests.
pub struct RequestBuilder<C: Clock = SystemClock> {
    config: RequestConfig,
    signer: Signer,
    clock: C,
}

impl RequestBuilder<SystemClock> {
    pub fn new(config: RequestConfig, signer: Signer) -> Self {
        Self::with_clock(config, signer, SystemClock)
    }
}

impl<C: Clock> RequestBuilder<C> {
    pub fn with_clock(config: RequestConfig, signer: Signer, clock: C) -> Self {
        Self {
            config,
            signer,
            clock,
        }
    }

    /// Current time in milliseconds, for stamping order intents.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Build a signed POST for a new limit order.
    pub fn order_request(&self, intent: &OrderIntent) -> ExecResult<SignedRequest> {
        let query = format!(
            "recvWindow={}&symbol={}&newClientOrderId={}&side={}&positionSide=BOTH&type=LIMIT&timeInForce=GTC&quantity={}&price={:.3}&timestamp={}",
            self.config.recv_window_ms,
            self.config.symbol,
            intent.client_order_id,
            intent.side,
            self.config.quantity,
            intent.price,
            intent.timestamp_ms,
        );
        Ok(SignedRequest {
            method: HttpMethod::Post,
            url: self.signed_url(&query)?,
            headers: self.headers(),
            correlation_id: Some(intent.client_order_id),
        })
    }

    /// Build a signed DELETE cancelling the order with the given client
    /// order id.
    pub fn cancel_request(&self, client_order_id: u32) -> ExecResult<SignedRequest> {
        let query = format!(
            "recvWindow={}&symbol={}&origClientOrderId={}&timestamp={}",
            self.config.recv_window_ms,
            self.config.symbol,
            client_order_id,
            self.clock.now_ms(),
        );
        Ok(SignedRequest {
            method: HttpMethod::Delete,
            url: self.signed_url(&query)?,
            headers: self.headers(),
            correlation_id: None,
        })
    }

    fn signed_url(&self, query: &str) -> ExecResult<String> {
        let signature = self.signer.sign(query)?;
        Ok(format!(
            "{}v1/order?{}&signature={}",
            self.config.base_url, query, signature
        ))
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("X-MBX-APIKEY".to_string(), self.config.api_key.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::ApiSecret;
    use rust_decimal_macros::dec;
    use tickburst_core::Side;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    fn builder() -> RequestBuilder<FixedClock> {
        let config = RequestConfig {
            base_url: "https://testnet.binancefuture.com/fapi/".to_string(),
            api_key: "test-key".to_string(),
            symbol: "BTCUSDT".to_string(),
            recv_window_ms: 10_000,
            quantity: dec!(0.01),
        };
        let signer = Signer::new("sha256", ApiSecret::new("test-secret")).unwrap();
        RequestBuilder::with_clock(config, signer, FixedClock(1_700_000_000_000))
    }

    #[test]
    fn test_order_request_shape() {
        let b = builder();
        let intent = OrderIntent {
            client_order_id: 42,
            side: Side::Buy,
            price: dec!(85.85),
            timestamp_ms: 1_700_000_000_000,
        };
        let req = b.order_request(&intent).unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.correlation_id, Some(42));
        assert_eq!(
            req.headers,
            vec![("X-MBX-APIKEY".to_string(), "test-key".to_string())]
        );

        let expected_query = "recvWindow=10000&symbol=BTCUSDT&newClientOrderId=42&side=BUY&positionSide=BOTH&type=LIMIT&timeInForce=GTC&quantity=0.01&price=85.850&timestamp=1700000000000";
        let expected_sig = b.signer.sign(expected_query).unwrap();
        assert_eq!(
            req.url,
            format!(
                "https://testnet.binancefuture.com/fapi/v1/order?{expected_query}&signature={expected_sig}"
            )
        );
    }

    #[test]
    fn test_price_is_normalized_to_three_decimals() {
        let b = builder();
        let intent = OrderIntent {
            client_order_id: 1,
            side: Side::Sell,
            price: dec!(116.15),
            timestamp_ms: 1,
        };
        let req = b.order_request(&intent).unwrap();
        assert!(req.url.contains("price=116.150&"), "url: {}", req.url);
        assert!(req.url.contains("side=SELL&"));
    }

    #[test]
    fn test_cancel_request_shape() {
        let b = builder();
        let req = b.cancel_request(42).unwrap();

        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.correlation_id, None);

        let expected_query =
            "recvWindow=10000&symbol=BTCUSDT&origClientOrderId=42&timestamp=1700000000000";
        let expected_sig = b.signer.sign(expected_query).unwrap();
        assert_eq!(
            req.url,
            format!(
                "https://testnet.binancefuture.com/fapi/v1/order?{expected_query}&signature={expected_sig}"
            )
        );
    }

    #[test]
    fn test_signature_is_over_unsigned_query() {
        let b = builder();
        let req = b.cancel_request(1).unwrap();
        let (query, sig) = req
            .url
            .split_once('?')
            .and_then(|(_, q)| q.rsplit_once("&signature="))
            .expect("signature is the final parameter");
        assert_eq!(b.signer.sign(query).unwrap(), sig);
    }
}
