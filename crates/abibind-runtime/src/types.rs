//! Options, requests and log types shared by backends and bindings

use abibind_primitives::{Address, BlockNumber, H256, U256};
use bytes::Bytes;
use serde::{Serialize, Serializer};

/// Block a read-only call executes against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Explicit height
    Number(BlockNumber),
    /// Chain head
    #[default]
    Latest,
    /// Head plus the node's pending transactions
    Pending,
    /// Genesis
    Earliest,
    /// Most recent safe head
    Safe,
    /// Most recent finalized block
    Finalized,
}

impl BlockId {
    /// JSON-RPC block parameter: a hex quantity or a tag
    pub fn to_param(self) -> String {
        let tag = match self {
            BlockId::Number(n) => return quantity(n),
            BlockId::Latest => "latest",
            BlockId::Pending => "pending",
            BlockId::Earliest => "earliest",
            BlockId::Safe => "safe",
            BlockId::Finalized => "finalized",
        };
        tag.to_string()
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_param())
    }
}

fn quantity(value: impl std::fmt::LowerHex) -> String {
    format!("0x{:x}", value)
}

/// Options for read-only calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallOpts {
    /// Caller address seen by the contract
    pub from: Option<Address>,
    /// Block to execute against
    pub block: BlockId,
}

impl CallOpts {
    /// Call at a specific block
    pub fn at_block(number: BlockNumber) -> Self {
        Self {
            block: BlockId::Number(number),
            ..Default::default()
        }
    }
}

/// Options for state-mutating transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactOpts {
    /// Sender account
    pub from: Option<Address>,
    /// Wei attached to the call (payable functions)
    pub value: Option<U256>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price
    pub gas_price: Option<u128>,
    /// Sender nonce
    pub nonce: Option<u64>,
}

impl TransactOpts {
    /// Transact from `sender`
    pub fn from(sender: Address) -> Self {
        Self {
            from: Some(sender),
            ..Default::default()
        }
    }

    /// Attach a value in wei
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Block range for historical log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOpts {
    /// First block (inclusive), earliest when unset
    pub from_block: Option<BlockNumber>,
    /// Last block (inclusive), latest when unset
    pub to_block: Option<BlockNumber>,
}

/// Starting point for live log subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchOpts {
    /// First block to deliver, the chain head when unset
    pub from_block: Option<BlockNumber>,
}

/// Message sent with `eth_call` or `eth_sendTransaction`.
///
/// Unset fields are left out of the JSON object so the node fills them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Sender
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::address")]
    pub from: Option<Address>,
    /// Target contract
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::address")]
    pub to: Option<Address>,
    /// Gas limit
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::quantity")]
    pub gas: Option<u64>,
    /// Gas price in wei
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::quantity")]
    pub gas_price: Option<u128>,
    /// Wei transferred with the call
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::quantity")]
    pub value: Option<U256>,
    /// Sender nonce
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::quantity")]
    pub nonce: Option<u64>,
    /// Calldata
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser::data")]
    pub data: Option<Bytes>,
}

mod ser {
    use super::*;

    pub(super) fn address<S: Serializer>(value: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(address) => s.serialize_str(&address.to_hex()),
            None => s.serialize_none(),
        }
    }

    pub(super) fn quantity<T, S>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error>
    where
        T: std::fmt::LowerHex,
        S: Serializer,
    {
        match value {
            Some(v) => s.serialize_str(&super::quantity(v)),
            None => s.serialize_none(),
        }
    }

    pub(super) fn data<S: Serializer>(value: &Option<Bytes>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_str(&format!("0x{}", hex::encode(bytes))),
            None => s.serialize_none(),
        }
    }
}

impl CallRequest {
    /// Request for a read-only call
    pub fn call(to: Address, data: Vec<u8>, opts: &CallOpts) -> Self {
        Self {
            from: opts.from,
            to: Some(to),
            data: Some(Bytes::from(data)),
            ..Default::default()
        }
    }

    /// Request for a transaction
    pub fn transact(to: Address, data: Vec<u8>, opts: &TransactOpts) -> Self {
        Self {
            from: opts.from,
            to: Some(to),
            gas: opts.gas,
            gas_price: opts.gas_price,
            value: opts.value,
            nonce: opts.nonce,
            data: Some(Bytes::from(data)),
        }
    }

    /// First four bytes of the calldata, if there are that many
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.as_deref()?.get(..4)?.try_into().ok()
    }
}

/// Transaction accepted by the backend but not yet mined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Hash reported by the backend
    pub hash: H256,
}

impl PendingTransaction {
    /// Wrap a submitted transaction hash
    pub fn new(hash: H256) -> Self {
        Self { hash }
    }

    /// Hash reported by the backend
    pub fn hash(&self) -> &H256 {
        &self.hash
    }
}

/// A contract log as delivered by a backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics; topic 0 is the event signature unless anonymous
    pub topics: Vec<H256>,
    /// ABI-encoded non-indexed parameters
    pub data: Bytes,
    /// Block containing the log
    pub block_number: Option<BlockNumber>,
    /// Transaction that emitted the log
    pub transaction_hash: Option<H256>,
    /// Position within the block
    pub log_index: Option<u64>,
    /// Removed by a chain reorganization
    pub removed: bool,
}

impl Log {
    /// Ordering key: block number, then log index. Pending logs carry no
    /// block number or index and sort after every mined log.
    pub fn position(&self) -> (BlockNumber, u64) {
        (
            self.block_number.unwrap_or(BlockNumber::MAX),
            self.log_index.unwrap_or(u64::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_params() {
        assert_eq!(BlockId::default().to_param(), "latest");
        assert_eq!(BlockId::Number(100).to_param(), "0x64");
        assert_eq!(serde_json::to_value(BlockId::Safe).unwrap(), "safe");
    }

    #[test]
    fn test_call_request_serialize() {
        let req = CallRequest::call(Address::ZERO, vec![0x02, 0x57, 0x1b, 0xe3], &CallOpts::default());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"], "0x0000000000000000000000000000000000000000");
        assert_eq!(json["data"], "0x02571be3");
        assert!(json.get("from").is_none());
    }

    #[test]
    fn test_transact_request_carries_value() {
        let opts = TransactOpts::from(Address::ZERO).with_value(U256::from(1000));
        let req = CallRequest::transact(Address::ZERO, vec![], &opts);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["value"], "0x3e8");
        assert_eq!(req.selector(), None);
    }

    #[test]
    fn test_pending_logs_sort_last() {
        let mined = |block, index| Log {
            block_number: Some(block),
            log_index: Some(index),
            ..Default::default()
        };
        let mut logs = vec![Log::default(), mined(7, 1), mined(0, 0), mined(7, 0)];
        logs.sort_by_key(Log::position);
        let order: Vec<_> = logs.iter().map(|l| (l.block_number, l.log_index)).collect();
        assert_eq!(
            order,
            vec![(Some(0), Some(0)), (Some(7), Some(0)), (Some(7), Some(1)), (None, None)]
        );
    }
}
