use std::path::Path;
use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Node RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing outside the inscription rules
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Inscription content rejected before anything was built or sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Inscription could not be decoded from a transaction
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Broadcast sequence stopped
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// Wallet file or key problems
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Coin selection could not reach the required amount
    #[error("insufficient balance. Need {needed} duffs, have {available} duffs")]
    InsufficientFunds { needed: u64, available: u64 },

    /// No spendable coins at all
    #[error("no UTXOs available with at least {min_amount} duffs")]
    NoCoins { min_amount: u64 },

    /// Transaction assembly or signing failed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Rejections raised while validating inscription content and transaction shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no data to mint")]
    EmptyContent,

    #[error("data must be hex")]
    InvalidHex,

    #[error("content type too long: {len} bytes, maximum is {max} bytes")]
    ContentTypeTooLong { len: usize, max: usize },

    #[error("content too large: {len} bytes, maximum size is {max} bytes")]
    ContentTooLarge { len: usize, max: usize },

    #[error("content chunk too large: {len} bytes, maximum script element is {max} bytes")]
    ChunkTooLarge { len: usize, max: usize },

    #[error("output amount {amount} duffs is below dust limit ({dust} duffs)")]
    DustOutput { amount: i64, dust: u64 },

    #[error("scriptSig size {len} bytes exceeds network limit of {max} bytes")]
    ScriptSigTooLarge { len: usize, max: usize },
}

/// Failures while recovering an inscription from an unlocking script
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a darinal")]
    NotAnInscription,

    #[error("invalid inscription format: {0}")]
    InvalidFormat(String),

    #[error("could not decompile script: {0}")]
    MalformedScript(String),

    #[error("no inputs found in transaction")]
    NoInputs,

    #[error("no scriptSig found")]
    MissingScriptSig,
}

/// Broadcast sequence failures
#[derive(Error, Debug)]
pub enum BroadcastError {
    /// The remaining transactions were written to the pending queue
    #[error(
        "broadcast of transaction {index} of {total} failed: {reason}. \
         Remaining transactions saved to {pending_path}, re-run to reattempt broadcast"
    )]
    Unrecoverable {
        index: usize,
        total: usize,
        reason: String,
        pending_path: String,
    },

    /// The pending queue itself could not be read or written
    #[error("pending queue error: {0}")]
    Store(String),
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to the node RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// TXID string format is invalid (not valid hex or wrong length)
    #[error("Invalid txid: {txid}")]
    InvalidTxid { txid: String },

    /// RPC method call failed; `message` carries the node's reason verbatim
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// Retry limit exceeded for RPC operation
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// Transaction exists in valid format but not found in blockchain/mempool
    #[error("Transaction not found: {txid}")]
    TransactionNotFound { txid: String },
}

impl RpcError {
    /// Reason text reported by the remote node, if the node answered at all
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            RpcError::CallFailed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Transport-level failures that a later attempt may not hit
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RpcError::ConnectionFailed(_) | RpcError::CallFailed { .. } | RpcError::Timeout { .. }
        )
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Context for file-backed stores
pub(crate) fn io_context(err: std::io::Error, path: &Path) -> AppError {
    AppError::Io(std::io::Error::new(
        err.kind(),
        format!("{}: {}", path.display(), err),
    ))
}
