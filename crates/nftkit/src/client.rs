//! JSON-RPC ledger client

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nftkit_common::{Error, LedgerReader, LedgerTransaction, TransactionId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;

const GET_TRANSACTION: &str = "GetTransaction";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    id: String,
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Ledger reader over JSON-RPC
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    inner: Client,
    rpc_url: Url,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcLedger {
    /// Create new [`JsonRpcLedger`]
    pub fn new(rpc_url: Url) -> Self {
        Self {
            inner: Client::new(),
            rpc_url,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create new [`JsonRpcLedger`] whose requests give up after `timeout`
    pub fn with_timeout(rpc_url: Url, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        Ok(Self {
            inner: client,
            rpc_url,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoint url
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, Error> {
        let request = JsonRpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed).to_string(),
            jsonrpc: "2.0",
            method,
            params,
        };

        let response = self
            .inner
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?
            .text()
            .await
            .map_err(|e| Error::HttpError(e.to_string()))?;

        parse_response(&response)
    }
}

fn parse_response<R: DeserializeOwned>(body: &str) -> Result<R, Error> {
    let response: JsonRpcResponse<R> = serde_json::from_str(body).map_err(|err| {
        tracing::warn!("Json rpc response error: {}", err);
        Error::LedgerQuery(format!("undecodable response: {err}"))
    })?;

    if let Some(error) = response.error {
        return Err(Error::LedgerQuery(format!(
            "rpc error {}: {}",
            error.code, error.message
        )));
    }

    response
        .result
        .ok_or_else(|| Error::LedgerQuery("response without result".to_string()))
}

#[async_trait]
impl LedgerReader for JsonRpcLedger {
    #[instrument(skip(self), fields(rpc_url = %self.rpc_url))]
    async fn get_transaction(&self, id: &TransactionId) -> Result<LedgerTransaction, Error> {
        self.call(GET_TRANSACTION, json!([id.as_str()]))
            .await
            .map_err(|err| match err {
                Error::HttpError(reason) => Error::LedgerQuery(reason),
                other => other,
            })
    }
}
