//! Types shared by the workflows, the ledger and the content store

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ledger transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new [`TransactionId`]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Id as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

/// Token identifier as emitted by the token contract
///
/// Token ids are `Uint256` on the ledger so they are kept in their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Create new [`TokenId`]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Id as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Auction collection identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    /// Create new [`CollectionId`]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price amount (`Uint128` on the ledger)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// Amount zero
    pub const ZERO: Amount = Amount(0);

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named parameter carried by a receipt event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParam {
    /// Parameter name
    pub vname: String,
    /// Ledger type of the parameter, e.g. `Uint256`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Parameter value
    pub value: Value,
}

impl EventParam {
    /// Create new [`EventParam`]
    pub fn new<N, K>(vname: N, kind: K, value: Value) -> Self
    where
        N: Into<String>,
        K: Into<String>,
    {
        Self {
            vname: vname.into(),
            kind: kind.into(),
            value,
        }
    }
}

/// Event emitted by a contract during a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name
    #[serde(rename = "_eventname")]
    pub name: String,
    /// Emitting contract address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Event parameters in emission order
    #[serde(default)]
    pub params: Vec<EventParam>,
}

impl Event {
    /// Create new [`Event`]
    pub fn new<S: Into<String>>(name: S, params: Vec<EventParam>) -> Self {
        Self {
            name: name.into(),
            address: None,
            params,
        }
    }

    /// Value of the parameter named `vname`
    pub fn param(&self, vname: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|p| p.vname == vname)
            .map(|p| &p.value)
    }
}

/// Ledger outcome record for a submitted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Whether the transaction executed successfully
    pub success: bool,
    /// Events emitted, in emission order
    #[serde(default)]
    pub event_logs: Vec<Event>,
}

impl Receipt {
    /// Successful receipt with the given events
    pub fn success(event_logs: Vec<Event>) -> Self {
        Self {
            success: true,
            event_logs,
        }
    }

    /// Failed receipt
    pub fn failure() -> Self {
        Self {
            success: false,
            event_logs: Vec::new(),
        }
    }
}

/// Transaction as returned by a ledger query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Transaction id
    #[serde(rename = "ID")]
    pub id: TransactionId,
    /// Receipt, absent while the transaction is pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

impl LedgerTransaction {
    /// Transaction still pending on the ledger
    pub fn pending(id: TransactionId) -> Self {
        Self { id, receipt: None }
    }

    /// Transaction with a receipt
    pub fn resolved(id: TransactionId, receipt: Receipt) -> Self {
        Self {
            id,
            receipt: Some(receipt),
        }
    }
}

/// Asset to be stored before minting
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset name
    pub name: String,
    /// Asset description
    pub description: String,
    /// Raw content
    pub content: Vec<u8>,
    /// MIME type of the content
    pub content_type: String,
}

impl Asset {
    /// Create new [`Asset`]
    pub fn new<N, D, C>(name: N, description: D, content: Vec<u8>, content_type: C) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        C: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            content,
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("content", &format!("<{} bytes>", self.content.len()))
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Asset stored by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Content link handed to the mint transaction
    pub url: String,
    /// Content identifier
    pub cid: String,
}

/// Auction start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRequest {
    /// Collection name
    pub collection_name: String,
    /// Tokens put up for auction
    pub token_ids: Vec<TokenId>,
    /// Price per token, same length and order as `token_ids`
    pub prices: Vec<Amount>,
    /// Auction length in blocks
    pub block_duration: u64,
}
