//! # JSON-RPC Node Transport
//!
//! `NodeTransport` over Ethereum JSON-RPC on HTTP. Signing is left to the
//! node's wallet (`eth_sendTransaction`), which is how a browser-injected
//! provider behaves.

use crate::config::NodeConfig;
use crate::domain::entities::{CallRequest, TransactionReceipt, TransactionRequest};
use crate::domain::value_objects::{Address, Bytes, NetworkId, TxHash};
use crate::errors::TransportError;
use crate::ports::outbound::NodeTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    contract_address: Option<Address>,
    /// Absent before Byzantium; treated as success.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt, TransportError> {
        let status = match self.status.as_deref() {
            None => true,
            Some(raw) => parse_quantity(raw)? == 1,
        };
        let block_number = self.block_number.as_deref().map(parse_quantity).transpose()?;

        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            contract_address: self.contract_address,
            status,
            block_number,
        })
    }
}

fn parse_quantity(raw: &str) -> Result<u64, TransportError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| TransportError::Parse(format!("bad quantity {raw}: {e}")))
}

fn quantity(value: u64) -> String {
    format!("{value:#x}")
}

/// `eth_sendTransaction` parameter object.
fn transaction_object(request: &TransactionRequest) -> Value {
    let mut object = json!({
        "from": request.from,
        "data": request.data,
        "value": format!("0x{:x}", request.value),
    });
    if let Some(to) = request.to {
        object["to"] = json!(to);
    }
    if let Some(gas) = request.gas {
        object["gas"] = json!(quantity(gas));
    }
    object
}

/// `eth_call` parameter object.
fn call_object(request: &CallRequest) -> Value {
    let mut object = json!({
        "to": request.to,
        "data": request.data,
    });
    if let Some(from) = request.from {
        object["from"] = json!(from);
    }
    object
}

/// Node transport speaking JSON-RPC over HTTP.
pub struct JsonRpcTransport {
    client: Client,
    endpoint: String,
    receipt_poll_interval: Duration,
    request_id: AtomicU64,
}

impl JsonRpcTransport {
    /// Creates a transport for the configured node endpoint.
    pub fn new(config: &NodeConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            receipt_poll_interval: config.receipt_poll_interval,
            request_id: AtomicU64::new(1),
        })
    }

    /// The node endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Calls `method`; a `null` result is returned as `None`.
    async fn request<P: Serialize + Send, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, TransportError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id(),
        };
        trace!(method, id = request.id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connection(format!("cannot connect to {}", self.endpoint))
                } else {
                    TransportError::Http(e)
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(rpc_response.result)
    }

    async fn request_required<P: Serialize + Send, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, TransportError> {
        self.request(method, params)
            .await?
            .ok_or_else(|| TransportError::Parse(format!("missing result for {method}")))
    }
}

#[async_trait]
impl NodeTransport for JsonRpcTransport {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        let id: String = self.request_required("net_version", json!([])).await?;
        Ok(NetworkId::new(id))
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError> {
        self.request_required("eth_call", json!([call_object(&request), "latest"]))
            .await
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxHash, TransportError> {
        self.request_required("eth_sendTransaction", json!([transaction_object(&request)]))
            .await
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, TransportError> {
        loop {
            let receipt: Option<RawReceipt> = self
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(raw) = receipt {
                return raw.into_receipt();
            }
            debug!(%tx_hash, "Receipt pending");
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}
