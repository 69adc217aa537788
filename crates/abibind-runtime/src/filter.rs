//! Log filters

use abibind_primitives::{Address, BlockNumber, H256};
use serde_json::{json, Value};

use crate::types::Log;

/// Log filter: an optional contract address, topic constraints per position
/// and a block range.
///
/// Each topic position holds a set of candidates. An empty set leaves the
/// position unconstrained; otherwise the log's topic at that position must
/// equal one of the candidates. All positions must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract
    pub address: Option<Address>,
    /// Candidates per topic position
    pub topics: Vec<Vec<H256>>,
    /// First block (inclusive)
    pub from_block: Option<BlockNumber>,
    /// Last block (inclusive)
    pub to_block: Option<BlockNumber>,
}

impl LogFilter {
    /// Filter logs emitted by `address`
    pub fn new(address: Address) -> Self {
        Self {
            address: Some(address),
            ..Default::default()
        }
    }

    /// Set the candidates for every topic position
    pub fn with_topics(mut self, topics: Vec<Vec<H256>>) -> Self {
        self.topics = topics;
        self
    }

    /// Restrict to a block range
    pub fn with_blocks(mut self, from: Option<BlockNumber>, to: Option<BlockNumber>) -> Self {
        self.from_block = from;
        self.to_block = to;
        self
    }

    /// Whether the log satisfies address, topic and block constraints
    pub fn matches(&self, log: &Log) -> bool {
        if self.address.is_some_and(|address| address != log.address) {
            return false;
        }
        if let Some(block) = log.block_number {
            if self.from_block.is_some_and(|from| block < from) {
                return false;
            }
            if self.to_block.is_some_and(|to| block > to) {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(position, candidates)| {
            candidates.is_empty()
                || log
                    .topics
                    .get(position)
                    .is_some_and(|topic| candidates.contains(topic))
        })
    }

    /// JSON-RPC filter object for `eth_getLogs` / `eth_newFilter`
    pub fn to_json(&self) -> Value {
        let mut filter = serde_json::Map::new();
        if let Some(address) = &self.address {
            filter.insert("address".into(), json!(address.to_hex()));
        }
        if let Some(from) = self.from_block {
            filter.insert("fromBlock".into(), json!(format!("0x{:x}", from)));
        }
        if let Some(to) = self.to_block {
            filter.insert("toBlock".into(), json!(format!("0x{:x}", to)));
        }

        // Trailing unconstrained positions are dropped; inner ones become null
        let used = self
            .topics
            .iter()
            .rposition(|candidates| !candidates.is_empty())
            .map_or(0, |last| last + 1);
        let topics: Vec<Value> = self.topics[..used]
            .iter()
            .map(|candidates| match candidates.as_slice() {
                [] => Value::Null,
                [single] => json!(single.to_hex()),
                many => Value::Array(many.iter().map(|t| json!(t.to_hex())).collect()),
            })
            .collect();
        if !topics.is_empty() {
            filter.insert("topics".into(), Value::Array(topics));
        }
        Value::Object(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(byte: u8) -> H256 {
        H256::from_bytes([byte; 32])
    }

    fn log_with(topics: Vec<H256>) -> Log {
        Log {
            address: Address::ZERO,
            topics,
            block_number: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_or_within_and_across_positions() {
        let filter = LogFilter::new(Address::ZERO).with_topics(vec![
            vec![topic(0xee)],
            vec![topic(0xa), topic(0xb)],
            vec![],
        ]);

        assert!(filter.matches(&log_with(vec![topic(0xee), topic(0xa), topic(1)])));
        assert!(filter.matches(&log_with(vec![topic(0xee), topic(0xb), topic(2)])));
        assert!(!filter.matches(&log_with(vec![topic(0xee), topic(0xc), topic(1)])));
        assert!(!filter.matches(&log_with(vec![topic(0xef), topic(0xa), topic(1)])));
        // constrained position missing from the log
        assert!(!filter.matches(&log_with(vec![topic(0xee)])));
    }

    #[test]
    fn test_address_and_block_range() {
        let other = Address::from_bytes([1; 20]);
        let filter = LogFilter::new(other).with_blocks(Some(11), None);
        let mut log = log_with(vec![]);
        assert!(!filter.matches(&log));
        log.address = other;
        assert!(!filter.matches(&log));
        log.block_number = Some(11);
        assert!(filter.matches(&log));
    }

    #[test]
    fn test_to_json() {
        let filter = LogFilter::new(Address::ZERO)
            .with_topics(vec![vec![topic(1)], vec![], vec![topic(2), topic(3)], vec![]])
            .with_blocks(Some(16), None);
        let json = filter.to_json();
        assert_eq!(json["fromBlock"], "0x10");
        assert!(json.get("toBlock").is_none());
        let topics = json["topics"].as_array().unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], json!(topic(1).to_hex()));
        assert!(topics[1].is_null());
        assert_eq!(topics[2].as_array().unwrap().len(), 2);
    }
}
