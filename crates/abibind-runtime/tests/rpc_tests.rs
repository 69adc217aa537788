//! RpcBackend tests over MockTransport

use std::sync::Arc;
use std::time::Duration;

use abibind_runtime::{
    Address, Backend, BlockId, CallOpts, CallRequest, LogFilter, MockTransport, RpcBackend,
    TransactOpts, TransportError, H256,
};
use serde_json::{json, Value};

const TOPIC: &str = "0xce0457fe73731f824cc272376169235128c118b49d344817417c6d108d155e82";

fn rpc_log(block: u64, index: u64) -> Value {
    json!({
        "address": "0x00000000000c2e074ec69a0dfb2997ba6c7d2e1e",
        "topics": [TOPIC],
        "data": "0x",
        "blockNumber": format!("0x{:x}", block),
        "logIndex": format!("0x{:x}", index),
        "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
    })
}

fn backend() -> RpcBackend<MockTransport> {
    RpcBackend::new(MockTransport::new()).with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn test_eth_call_sends_request_and_block() {
    let backend = backend();
    backend
        .transport()
        .set_response("eth_call", json!("0x000000000000000000000000000000000000000000000000000000000000002a"));

    let request = CallRequest::call(Address::ZERO, vec![0x01, 0x02, 0x03, 0x04], &CallOpts::default());
    let out = backend.call(request, BlockId::Number(16)).await.unwrap();
    assert_eq!(out.len(), 32);
    assert_eq!(out[31], 42);

    let requests = backend.transport().requests();
    assert_eq!(requests[0].0, "eth_call");
    assert_eq!(requests[0].1[0]["data"], "0x01020304");
    assert_eq!(requests[0].1[1], "0x10");
}

#[tokio::test]
async fn test_eth_send_transaction_returns_hash() {
    let backend = backend();
    let hash = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
    backend.transport().set_response("eth_sendTransaction", json!(hash));

    let request = CallRequest::transact(Address::ZERO, vec![], &TransactOpts::from(Address::ZERO));
    let tx = backend.transact(request).await.unwrap();
    assert_eq!(tx, H256::from_hex(hash).unwrap());
}

#[tokio::test]
async fn test_rpc_errors_pass_through() {
    let backend = backend();
    backend.transport().push_response(
        "eth_call",
        Err(TransportError::Rpc {
            code: 3,
            message: "execution reverted".into(),
        }),
    );
    let request = CallRequest::call(Address::ZERO, vec![], &CallOpts::default());
    let err = backend.call(request, BlockId::Latest).await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Rpc {
            code: 3,
            message: "execution reverted".into(),
        }
    );
}

#[tokio::test]
async fn test_get_logs_is_sorted() {
    let backend = backend();
    backend
        .transport()
        .set_response("eth_getLogs", json!([rpc_log(9, 1), rpc_log(2, 0), rpc_log(9, 0)]));
    let logs = backend.filter_logs(&LogFilter::new(Address::ZERO)).await.unwrap();
    let positions: Vec<_> = logs.iter().map(|l| l.position()).collect();
    assert_eq!(positions, vec![(2, 0), (9, 0), (9, 1)]);
}

#[tokio::test]
async fn test_polling_watch_delivers_and_uninstalls_once() {
    let transport_backend = Arc::new(backend());
    let transport = transport_backend.transport();
    transport.set_response("eth_newFilter", json!("0x1"));
    transport.push_response("eth_getFilterChanges", Ok(json!([rpc_log(1, 0), rpc_log(1, 1)])));
    transport.set_response("eth_getFilterChanges", json!([]));
    transport.set_response("eth_uninstallFilter", json!(true));

    let subscription = transport_backend
        .watch_logs(&LogFilter::new(Address::ZERO))
        .await
        .unwrap();
    let (mut logs, handle) = subscription.into_parts();
    assert_eq!(logs.recv().await.unwrap().unwrap().position(), (1, 0));
    assert_eq!(logs.recv().await.unwrap().unwrap().position(), (1, 1));

    handle.unsubscribe().await;
    assert_eq!(transport.count("eth_uninstallFilter"), 1);
    assert!(logs.recv().await.is_none());
}

#[tokio::test]
async fn test_polling_failure_ends_the_stream() {
    let backend = backend();
    backend.transport().set_response("eth_newFilter", json!("0x2"));
    backend.transport().set_response("eth_uninstallFilter", json!(true));
    backend.transport().push_response(
        "eth_getFilterChanges",
        Err(TransportError::Rpc {
            code: -32000,
            message: "filter not found".into(),
        }),
    );

    let subscription = backend.watch_logs(&LogFilter::default()).await.unwrap();
    let (mut logs, handle) = subscription.into_parts();
    assert!(matches!(logs.recv().await, Some(Err(TransportError::Rpc { .. }))));
    assert!(logs.recv().await.is_none());
    handle.unsubscribe().await;
    assert_eq!(backend.transport().count("eth_uninstallFilter"), 1);
}
