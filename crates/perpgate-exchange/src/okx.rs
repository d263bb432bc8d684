//! OKX-style v5 REST client.
//!
//! Signs every private request with HMAC-SHA256 over
//! `timestamp + method + path + body` (base64-encoded) and the
//! `OK-ACCESS-*` header set. Translation between gateway types and
//! exchange-native fields (instId, tdMode, posSide, sz) lives entirely
//! in this module.

use crate::client::{BoxFuture, ExchangeClient, OrderRequest};
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{
    coin_of_inst_id, parse_decimal_or_zero, AccountConfig, Envelope, RawAccountConfig,
    RawOrderAck, RawOrderDetail, RawPosition, RawTicker,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use perpgate_core::{
    ClientOrderId, Contracts, Instrument, MarginMode, OpenPosition, OrderResult, OrderSide,
    OrderType, Price,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TICKERS_PATH: &str = "/api/v5/market/tickers?instType=SWAP";
const POSITIONS_PATH: &str = "/api/v5/account/positions";
const ACCOUNT_CONFIG_PATH: &str = "/api/v5/account/config";
const ORDER_PATH: &str = "/api/v5/trade/order";

/// API credentials for the exchange.
#[derive(Debug, Clone)]
pub struct OkxCredentials {
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl OkxCredentials {
    pub fn new(api_key: String, secret: String, passphrase: String) -> Self {
        Self {
            api_key,
            secret,
            passphrase,
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> ExchangeResult<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| ExchangeError::MissingCredential(name.to_string()))
        };
        Ok(Self::new(
            var("PERPGATE_API_KEY")?,
            var("PERPGATE_API_SECRET")?,
            var("PERPGATE_API_PASSPHRASE")?,
        ))
    }
}

/// REST client for an OKX-style perpetual-swap exchange.
pub struct OkxClient {
    http: Client,
    base_url: String,
    credentials: OkxCredentials,
    /// When true, sends the simulated-trading header (demo environment).
    simulated: bool,
}

impl OkxClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - REST endpoint base (e.g. "https://www.okx.com")
    pub fn new(
        base_url: impl Into<String>,
        credentials: OkxCredentials,
        simulated: bool,
    ) -> ExchangeResult<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            simulated,
        })
    }

    /// Sign `timestamp + method + path + body` with the API secret.
    fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let prehash = format!("{timestamp}{method}{path}{body}");
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(prehash.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Build the authenticated header set for one request.
    fn auth_headers(&self, method: &str, path: &str, body: &str) -> ExchangeResult<HeaderMap> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let signature = self.sign(&timestamp, method, path, body);

        let mut headers = HeaderMap::new();
        let mut put = |name: &'static str, value: &str| -> ExchangeResult<()> {
            headers.insert(
                name,
                HeaderValue::from_str(value)
                    .map_err(|e| ExchangeError::HttpClient(format!("bad header {name}: {e}")))?,
            );
            Ok(())
        };
        put("OK-ACCESS-KEY", &self.credentials.api_key)?;
        put("OK-ACCESS-SIGN", &signature)?;
        put("OK-ACCESS-TIMESTAMP", &timestamp)?;
        put("OK-ACCESS-PASSPHRASE", &self.credentials.passphrase)?;
        if self.simulated {
            put("x-simulated-trading", "1")?;
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Authenticated GET returning the envelope's data rows.
    async fn get_private<T: DeserializeOwned>(&self, path: &str) -> ExchangeResult<Vec<T>> {
        let headers = self.auth_headers("GET", path, "")?;
        let url = format!("{}{}", self.base_url, path);
        let envelope: Envelope<T> = self
            .http
            .get(&url)
            .headers(headers)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }

    /// Public GET (no signature) returning the envelope's data rows.
    async fn get_public<T: DeserializeOwned>(&self, path: &str) -> ExchangeResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let envelope: Envelope<T> = self.http.get(&url).send().await?.json().await?;
        envelope.into_data()
    }

    /// Authenticated POST returning the envelope without code checking;
    /// order acks carry per-order codes the caller inspects.
    async fn post_private<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> ExchangeResult<Envelope<T>> {
        let body_str = body.to_string();
        let headers = self.auth_headers("POST", path, &body_str)?;
        let url = format!("{}{}", self.base_url, path);
        let envelope: Envelope<T> = self
            .http
            .post(&url)
            .headers(headers)
            .body(body_str)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Translate a gateway symbol ("BTC/USDT:USDT") into an exchange
    /// instrument ID ("BTC-USDT-SWAP").
    fn inst_id_of_symbol(symbol: &str) -> String {
        let coin = symbol.split('/').next().unwrap_or(symbol);
        format!("{coin}-USDT-SWAP")
    }

    /// Build the exchange-native order body.
    ///
    /// `sz` is the intent's contract count serialized unchanged; any
    /// base-currency or notional conversion happened (and was tested)
    /// upstream, where the intent was constructed.
    fn order_body(request: &OrderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "instId": Self::inst_id_of_symbol(&request.symbol),
            "tdMode": request.margin_mode.to_string(),
            "side": request.side.to_string(),
            "ordType": request.order_type.to_string(),
            "sz": request.quantity.to_string(),
            "clOrdId": request.client_order_id.as_str(),
        });

        if let Some(price) = request.price {
            body["px"] = serde_json::Value::String(price.to_string());
        }
        if let Some(position_side) = request.position_side {
            body["posSide"] = serde_json::Value::String(position_side.to_string());
        }
        if request.reduce_only {
            body["reduceOnly"] = serde_json::Value::Bool(true);
        }
        body
    }

    async fn fetch_tickers_impl(
        &self,
        instruments: &[Instrument],
    ) -> ExchangeResult<HashMap<String, Price>> {
        let rows: Vec<RawTicker> = self.get_public(TICKERS_PATH).await?;

        let mut prices = HashMap::new();
        for instrument in instruments {
            let inst_id = format!("{}-USDT-SWAP", instrument.coin());
            if let Some(row) = rows.iter().find(|r| r.inst_id == inst_id) {
                let last = parse_decimal_or_zero(&row.last)?;
                prices.insert(instrument.coin().to_string(), Price::new(last));
            } else {
                warn!(coin = instrument.coin(), "no ticker for instrument");
            }
        }
        Ok(prices)
    }

    async fn fetch_positions_impl(&self) -> ExchangeResult<Vec<OpenPosition>> {
        let rows: Vec<RawPosition> = self.get_private(POSITIONS_PATH).await?;
        let mut positions = Vec::new();
        for raw in rows {
            if let Some(position) = raw.into_open_position()? {
                positions.push(position);
            }
        }
        debug!(count = positions.len(), "fetched open positions");
        Ok(positions)
    }

    async fn fetch_account_config_impl(&self) -> ExchangeResult<AccountConfig> {
        let rows: Vec<RawAccountConfig> = self.get_private(ACCOUNT_CONFIG_PATH).await?;
        let raw = rows
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::Decode("empty account config response".to_string()))?;
        Ok(raw.into())
    }

    async fn create_order_impl(&self, request: OrderRequest) -> ExchangeResult<OrderResult> {
        let body = Self::order_body(&request);
        debug!(symbol = %request.symbol, side = %request.side, sz = %request.quantity, "submitting order");

        let envelope: Envelope<RawOrderAck> = self.post_private(ORDER_PATH, &body).await?;

        // Per-order sCode is more specific than the envelope code.
        if let Some(ack) = envelope.data.first() {
            if ack.s_code != "0" {
                return Err(ExchangeError::from_payload(&ack.s_code, &ack.s_msg));
            }
        } else if envelope.code != "0" {
            return Err(ExchangeError::from_payload(&envelope.code, &envelope.msg));
        }

        let ack = envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::Decode("order ack missing from response".to_string()))?;

        // The placement ack has no fill fields; fetch the order detail
        // for the authoritative ones.
        let inst_id = Self::inst_id_of_symbol(&request.symbol);
        let detail_path = format!("{ORDER_PATH}?instId={inst_id}&ordId={}", ack.ord_id);
        let details: Vec<RawOrderDetail> = self.get_private(&detail_path).await?;
        let detail = details
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::Decode("order detail missing".to_string()))?;

        let filled = parse_decimal_or_zero(&detail.acc_fill_sz)?;
        let average = parse_decimal_or_zero(&detail.avg_px)?;

        Ok(OrderResult {
            order_id: detail.ord_id,
            filled_quantity: Contracts::new(filled),
            average_price: Price::new(average),
            // The order detail has no cost field; see OrderResult::cost.
            cost: filled * average,
        })
    }
}

impl ExchangeClient for OkxClient {
    fn fetch_tickers<'a>(
        &'a self,
        instruments: &'a [Instrument],
    ) -> BoxFuture<'a, ExchangeResult<HashMap<String, Price>>> {
        Box::pin(self.fetch_tickers_impl(instruments))
    }

    fn fetch_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<OpenPosition>>> {
        Box::pin(self.fetch_positions_impl())
    }

    fn fetch_account_config(&self) -> BoxFuture<'_, ExchangeResult<AccountConfig>> {
        Box::pin(self.fetch_account_config_impl())
    }

    fn create_order(&self, request: OrderRequest) -> BoxFuture<'_, ExchangeResult<OrderResult>> {
        Box::pin(self.create_order_impl(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpgate_core::PositionDirection;
    use rust_decimal_macros::dec;

    fn credentials() -> OkxCredentials {
        OkxCredentials::new(
            "key".to_string(),
            "secret".to_string(),
            "phrase".to_string(),
        )
    }

    fn request(position_side: Option<PositionDirection>) -> OrderRequest {
        OrderRequest {
            symbol: "BTC/USDT:USDT".to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Contracts::new(dec!(5)),
            price: None,
            position_side,
            reduce_only: false,
            margin_mode: MarginMode::Cross,
            client_order_id: ClientOrderId::new(),
        }
    }

    #[test]
    fn test_inst_id_translation() {
        assert_eq!(
            OkxClient::inst_id_of_symbol("BTC/USDT:USDT"),
            "BTC-USDT-SWAP"
        );
        assert_eq!(OkxClient::inst_id_of_symbol("ETH"), "ETH-USDT-SWAP");
    }

    #[test]
    fn test_order_body_net_mode_omits_pos_side() {
        let body = OkxClient::order_body(&request(None));
        assert!(body.get("posSide").is_none());
        assert_eq!(body["sz"], "5");
        assert_eq!(body["tdMode"], "cross");
        assert_eq!(body["ordType"], "market");
        assert!(body.get("px").is_none());
    }

    #[test]
    fn test_order_body_hedge_mode_carries_pos_side() {
        let body = OkxClient::order_body(&request(Some(PositionDirection::Long)));
        assert_eq!(body["posSide"], "long");
    }

    #[test]
    fn test_order_body_limit_price() {
        let mut req = request(None);
        req.order_type = OrderType::Limit;
        req.price = Some(Price::new(dec!(50000)));
        let body = OkxClient::order_body(&req);
        assert_eq!(body["px"], "50000");
        assert_eq!(body["ordType"], "limit");
    }

    #[test]
    fn test_signature_is_deterministic() {
        let client = OkxClient::new("https://example.test", credentials(), true).unwrap();
        let a = client.sign("2024-01-01T00:00:00.000Z", "GET", "/api/v5/account/config", "");
        let b = client.sign("2024-01-01T00:00:00.000Z", "GET", "/api/v5/account/config", "");
        assert_eq!(a, b);
        // Base64 of a 32-byte MAC.
        assert_eq!(BASE64.decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OkxClient::new("https://example.test/", credentials(), false).unwrap();
        assert_eq!(client.base_url, "https://example.test");
    }

    #[test]
    fn test_from_env_missing_variable_is_credential_error() {
        std::env::remove_var("PERPGATE_API_KEY");
        std::env::remove_var("PERPGATE_API_SECRET");
        std::env::remove_var("PERPGATE_API_PASSPHRASE");

        let err = OkxCredentials::from_env().unwrap_err();
        match err {
            ExchangeError::MissingCredential(name) => assert_eq!(name, "PERPGATE_API_KEY"),
            other => panic!("expected missing-credential error, got {other:?}"),
        }
    }

    #[test]
    fn test_coin_of_inst_id_roundtrip() {
        let inst_id = OkxClient::inst_id_of_symbol("SOL/USDT:USDT");
        assert_eq!(coin_of_inst_id(&inst_id), "SOL");
    }
}
