//! BoundContract tests against the in-memory backend

use std::sync::Arc;

use abibind_abi::{encode, function_selector, ParamType};
use abibind_runtime::{
    tokens, Address, BindError, BoundContract, CallOpts, DecodeError, EncodeError, MockBackend,
    TransactOpts, Token, TransportError, U256,
};

const RESOLVER_ABI: &str = r#"[
    {"type":"function","name":"addr","stateMutability":"view",
     "inputs":[{"name":"node","type":"bytes32"}],
     "outputs":[{"name":"","type":"address"}]},
    {"type":"function","name":"addr","stateMutability":"view",
     "inputs":[{"name":"node","type":"bytes32"},{"name":"coinType","type":"uint256"}],
     "outputs":[{"name":"","type":"bytes"}]},
    {"type":"function","name":"setTTL","stateMutability":"nonpayable",
     "inputs":[{"name":"node","type":"bytes32"},{"name":"ttl","type":"uint64"}],
     "outputs":[]}
]"#;

fn setup() -> (Arc<MockBackend>, BoundContract) {
    let backend = Arc::new(MockBackend::new());
    let address = Address::from_bytes([0x42; 20]);
    let contract = BoundContract::from_json(address, RESOLVER_ABI, backend.clone()).unwrap();
    (backend, contract)
}

mod calls {
    use super::*;

    #[tokio::test]
    async fn test_call_encodes_and_decodes() {
        let (backend, contract) = setup();
        let owner = Address::from_bytes([7; 20]);
        backend.set_call_response(
            "addr(bytes32)",
            encode(&[ParamType::Address], &[Token::Address(owner)]).unwrap(),
        );

        let out = contract
            .call(&CallOpts::default(), "addr(bytes32)", vec![tokens::fixed_bytes(&[1; 32])])
            .await
            .unwrap();
        assert_eq!(out, vec![Token::Address(owner)]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let (request, _) = &calls[0];
        assert_eq!(request.to, Some(contract.address()));
        assert_eq!(request.selector(), Some(function_selector("addr(bytes32)")));
    }

    #[tokio::test]
    async fn test_overloads_are_addressed_by_signature() {
        let (backend, contract) = setup();
        backend.set_call_response(
            "addr(bytes32,uint256)",
            encode(&[ParamType::Bytes], &[Token::Bytes(vec![0xbc; 25])]).unwrap(),
        );
        let out = contract
            .call(
                &CallOpts::default(),
                "addr(bytes32,uint256)",
                vec![tokens::fixed_bytes(&[1; 32]), tokens::uint(0u64)],
            )
            .await
            .unwrap();
        assert_eq!(out, vec![Token::Bytes(vec![0xbc; 25])]);
    }

    #[tokio::test]
    async fn test_unknown_signature() {
        let (_, contract) = setup();
        let err = contract
            .call(&CallOpts::default(), "addr(bytes)", vec![])
            .await
            .unwrap_err();
        assert_eq!(err, BindError::UnknownFunction("addr(bytes)".into()));
    }

    #[tokio::test]
    async fn test_encoding_error_happens_before_any_backend_call() {
        let (backend, contract) = setup();
        let err = contract
            .call(&CallOpts::default(), "addr(bytes32)", vec![tokens::fixed_bytes(&[1; 4])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::Encoding { ref context, source: EncodeError::Param { index: 0, .. } }
                if context == "addr(bytes32)"
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_return_data() {
        let (backend, contract) = setup();
        backend.set_call_response("addr(bytes32)", vec![0xff; 32]);
        let err = contract
            .call(&CallOpts::default(), "addr(bytes32)", vec![tokens::fixed_bytes(&[1; 32])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::Decoding { source: DecodeError::DirtyPadding(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through_unchanged() {
        let (backend, contract) = setup();
        let failure = TransportError::Rpc {
            code: -32005,
            message: "rate limited".into(),
        };
        backend.fail_next(failure.clone());
        let err = contract
            .call(&CallOpts::default(), "addr(bytes32)", vec![tokens::fixed_bytes(&[1; 32])])
            .await
            .unwrap_err();
        assert_eq!(err, BindError::Transport(failure));
    }
}

mod transactions {
    use super::*;

    #[tokio::test]
    async fn test_transact_records_request() {
        let (backend, contract) = setup();
        let sender = Address::from_bytes([9; 20]);
        let pending = contract
            .transact(
                &TransactOpts::from(sender),
                "setTTL(bytes32,uint64)",
                vec![tokens::fixed_bytes(&[2; 32]), tokens::uint(3600u64)],
            )
            .await
            .unwrap();
        assert!(!pending.hash().is_zero());

        let txs = backend.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].from, Some(sender));
        assert_eq!(txs[0].data.as_ref().map(|d| d.len()), Some(4 + 64));
    }

    #[tokio::test]
    async fn test_width_overflow_is_an_encoding_error() {
        let (backend, contract) = setup();
        let err = contract
            .transact(
                &TransactOpts::default(),
                "setTTL(bytes32,uint64)",
                vec![tokens::fixed_bytes(&[2; 32]), Token::Uint(U256::MAX)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BindError::Encoding { .. }));
        assert!(backend.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_raw_transact_sends_calldata_verbatim() {
        let (backend, contract) = setup();
        contract
            .raw_transact(&TransactOpts::default(), vec![0xde, 0xad])
            .await
            .unwrap();
        assert_eq!(
            backend.transactions()[0].data.as_deref(),
            Some(&[0xde, 0xad][..])
        );
    }
}

mod display {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_contract_displays_checksummed_address() {
        let address: Address = CHECKSUMMED.to_lowercase().parse().unwrap();
        let contract =
            BoundContract::from_json(address, RESOLVER_ABI, Arc::new(MockBackend::new())).unwrap();
        assert_eq!(contract.to_string(), CHECKSUMMED);
        assert_eq!(address.to_string(), CHECKSUMMED.to_lowercase());
        assert!(format!("{contract:?}").contains(CHECKSUMMED));
    }
}
