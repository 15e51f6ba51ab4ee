use async_trait::async_trait;
use bitcoin::{ScriptBuf, Txid};
use corepc_client::client_sync::{v28::Client, Auth};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::NodeRpcConfig;
use crate::errors::{AppResult, DecodeError, RpcError, RpcResult};
use crate::network::DashAddress;
use crate::rpc::{execute_with_timeout, retry_with_backoff, Broadcaster, CoinSource, TransactionLookup};
use crate::types::{dash_to_duffs, Coin};

/// Node messages meaning the transaction is unknown, not that the call failed
const NOT_FOUND_MESSAGES: [&str; 2] = [
    "No such mempool or blockchain transaction",
    "Invalid or non-wallet transaction id",
];

/// Upper confirmation bound passed to `listunspent`
const MAX_CONFIRMATIONS: u32 = 9_999_999;

/// `listunspent` entry, only the fields a [`Coin`] needs
#[derive(Debug, Deserialize)]
struct UnspentEntry {
    txid: String,
    vout: u32,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: String,
    amount: f64,
}

impl UnspentEntry {
    fn into_coin(self) -> RpcResult<Coin> {
        let txid = Txid::from_str(&self.txid).map_err(|_| RpcError::InvalidTxid {
            txid: self.txid.clone(),
        })?;
        let script = hex::decode(&self.script_pub_key).map_err(|e| {
            RpcError::DeserialisationFailed(format!("scriptPubKey of {}: {}", self.txid, e))
        })?;
        Ok(Coin {
            txid,
            vout: self.vout,
            script_pubkey: ScriptBuf::from_bytes(script),
            amount: dash_to_duffs(self.amount),
        })
    }
}

/// Dash Core RPC client
///
/// Every call runs the blocking `corepc-client` request on the blocking pool
/// under a timeout. Reads retry with backoff; `sendrawtransaction` is tried
/// exactly once and its rejection is handed back untouched.
pub struct NodeRpcClient {
    client: Arc<Client>,
    config: NodeRpcConfig,
    error_count: Arc<AtomicU64>,
}

impl NodeRpcClient {
    /// Create the client; no request is made until the first call
    pub fn new(config: NodeRpcConfig) -> RpcResult<Self> {
        let client = Self::create_sync_client(&config)?;
        Ok(Self {
            client,
            config,
            error_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Test RPC connection, returning the node's block count
    pub async fn test_connection(&self) -> RpcResult<u64> {
        let blocks: u64 = self.call_with_retry("getblockcount", Vec::new()).await?;
        info!("Dash RPC connection established, {} blocks", blocks);
        Ok(blocks)
    }

    /// Get the current error count from RPC operations
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    fn create_sync_client(config: &NodeRpcConfig) -> RpcResult<Arc<Client>> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create Dash RPC client: {}", e))
        })?;

        Ok(Arc::new(client))
    }

    async fn call_once<T>(&self, method: &'static str, args: Vec<Value>) -> RpcResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = Arc::clone(&self.client);

        let result = match execute_with_timeout(self.config.timeout_seconds, move || -> RpcResult<T> {
            client.call::<T>(method, &args).map_err(|e| RpcError::CallFailed {
                method: method.to_string(),
                message: e.to_string(),
            })
        })
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(RpcError::CallFailed {
                method: "spawn_blocking".to_string(),
                message: format!("Task execution error: {}", e),
            }),
            Err(_) => Err(RpcError::Timeout {
                timeout_seconds: self.config.timeout_seconds,
                operation: method.to_string(),
            }),
        };

        if result.is_err() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn call_with_retry<T>(&self, method: &'static str, args: Vec<Value>) -> RpcResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        retry_with_backoff(&self.config.retry_policy(), method, || {
            self.call_once(method, args.clone())
        })
        .await
    }

    /// Verbose `getrawtransaction`; a missing transaction is not retried
    async fn get_raw_transaction_verbose(&self, txid: &Txid) -> RpcResult<Value> {
        let args = vec![json!(txid.to_string()), json!(true)];

        retry_with_backoff(&self.config.retry_policy(), "getrawtransaction", || {
            let args = args.clone();
            async move {
                match self.call_once::<Value>("getrawtransaction", args).await {
                    Err(RpcError::CallFailed { message, .. })
                        if NOT_FOUND_MESSAGES.iter().any(|m| message.contains(m)) =>
                    {
                        debug!("Transaction {} not found: {}", txid, message);
                        Err(RpcError::TransactionNotFound {
                            txid: txid.to_string(),
                        })
                    }
                    other => other,
                }
            }
        })
        .await
    }
}

#[async_trait]
impl CoinSource for NodeRpcClient {
    async fn list_unspent(&self, address: &DashAddress) -> RpcResult<Vec<Coin>> {
        let entries: Vec<UnspentEntry> = self
            .call_with_retry(
                "listunspent",
                vec![json!(0), json!(MAX_CONFIRMATIONS), json!([address.to_string()])],
            )
            .await?;
        debug!("listunspent returned {} coin(s) for {}", entries.len(), address);
        entries.into_iter().map(UnspentEntry::into_coin).collect()
    }
}

#[async_trait]
impl Broadcaster for NodeRpcClient {
    async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String> {
        self.call_once("sendrawtransaction", vec![json!(hex)]).await
    }
}

#[async_trait]
impl TransactionLookup for NodeRpcClient {
    async fn input_script(&self, txid: &Txid, input_index: usize) -> AppResult<Vec<u8>> {
        let tx = self.get_raw_transaction_verbose(txid).await?;
        Ok(script_sig_from_verbose(&tx, input_index)?)
    }
}

/// `vin[input_index].scriptSig.hex` of a verbose `getrawtransaction` answer
fn script_sig_from_verbose(tx: &Value, input_index: usize) -> Result<Vec<u8>, DecodeError> {
    let input = tx
        .get("vin")
        .and_then(Value::as_array)
        .and_then(|vin| vin.get(input_index))
        .ok_or(DecodeError::NoInputs)?;
    let script_hex = input
        .get("scriptSig")
        .and_then(|s| s.get("hex"))
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingScriptSig)?;
    hex::decode(script_hex)
        .map_err(|e| DecodeError::MalformedScript(format!("scriptSig hex: {}", e)))
}
