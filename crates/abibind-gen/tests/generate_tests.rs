//! End-to-end generator tests: ABI JSON in, formatted module source out

use abibind_abi::{AbiError, AbiLocation};
use abibind_gen::{Abigen, BuildConfig, GenError, GeneratorConfig, MultiAbigen, HEADER};

const REGISTRY_ABI: &str = r#"[
    {"type":"function","name":"owner","stateMutability":"view",
     "inputs":[{"name":"node","type":"bytes32"}],
     "outputs":[{"name":"","type":"address"}]},
    {"type":"function","name":"setOwner","stateMutability":"nonpayable",
     "inputs":[{"name":"node","type":"bytes32"},{"name":"owner","type":"address"}],
     "outputs":[]},
    {"type":"function","name":"pubkey","stateMutability":"view",
     "inputs":[{"name":"node","type":"bytes32"}],
     "outputs":[{"name":"x","type":"bytes32"},{"name":"y","type":"bytes32"}]},
    {"type":"event","name":"NewOwner","anonymous":false,
     "inputs":[{"name":"node","type":"bytes32","indexed":true},
               {"name":"label","type":"bytes32","indexed":true},
               {"name":"owner","type":"address","indexed":false}]},
    {"type":"fallback","stateMutability":"payable"}
]"#;

fn generate(abi: &str) -> String {
    Abigen::new("ENSRegistry", abi).generate().unwrap().source
}

// ==================== Output shape ====================

mod shape {
    use super::*;

    #[test]
    fn test_module_and_header() {
        let bindings = Abigen::new("ENSRegistry", REGISTRY_ABI).generate().unwrap();
        assert_eq!(bindings.module_name, "ens_registry");
        assert!(bindings.source.starts_with(HEADER));
        assert!(bindings.source.contains("pub mod ens_registry"));
        assert!(bindings.source.contains("pub const ABI: &str"));
    }

    #[test]
    fn test_output_is_valid_rust() {
        let source = generate(REGISTRY_ABI);
        assert!(syn::parse_file(&source).is_ok());
    }

    #[test]
    fn test_wrapper_types() {
        let source = generate(REGISTRY_ABI);
        for ty in [
            "pub struct EnsRegistry ",
            "pub struct EnsRegistrySession ",
            "pub struct EnsRegistryCaller ",
            "pub struct EnsRegistryCallerSession ",
            "pub struct EnsRegistryTransactor ",
            "pub struct EnsRegistryTransactorSession ",
            "pub struct EnsRegistryFilterer ",
            "pub struct NewOwnerEvent ",
        ] {
            assert!(source.contains(ty), "missing {ty}");
        }
    }

    #[test]
    fn test_arity_rule() {
        let source = generate(REGISTRY_ABI);
        assert!(source.contains("-> Result<Address, BindError>"));
        assert!(source.contains("pub struct PubkeyOutput"));
        assert!(source.contains("-> Result<PubkeyOutput, BindError>"));
        assert!(source.contains("-> Result<PendingTransaction, BindError>"));
    }

    #[test]
    fn test_event_methods() {
        let source = generate(REGISTRY_ABI);
        assert!(source.contains("pub async fn filter_new_owner("));
        assert!(source.contains("pub async fn watch_new_owner("));
        assert!(source.contains("pub fn parse_new_owner("));
        assert!(source.contains("LogIterator<NewOwnerEvent>"));
        assert!(source.contains("EventWatch<NewOwnerEvent>"));
        assert!(source.contains("\"NewOwner(bytes32,bytes32,address)\""));
    }

    #[test]
    fn test_topic_candidates_carry_declared_type() {
        let abi = r#"[{"type":"event","name":"Tick","anonymous":false,"inputs":[
            {"name":"id","type":"uint24","indexed":true},
            {"name":"tag","type":"string","indexed":true}]}]"#;
        let compact: String = generate(abi).split_whitespace().collect();
        assert!(compact.contains("encode_topics(&ParamType::Uint(24),id.into_iter()"));
        assert!(compact.contains("encode_topics(&ParamType::String,tag.into_iter()"));
    }

    #[test]
    fn test_fallback_wrapper() {
        let source = generate(REGISTRY_ABI);
        assert!(source.contains("pub async fn fallback("));
        assert!(!source.contains("pub async fn receive("));
    }

    #[test]
    fn test_selectors_in_docs() {
        let source = generate(REGISTRY_ABI);
        assert!(source.contains("Calls `owner(bytes32)` (selector `0x02571be3`)."));
    }
}

// ==================== Naming ====================

mod naming {
    use super::*;

    const FIRST: &str = r#"{"type":"function","name":"addr","stateMutability":"view",
        "inputs":[{"name":"node","type":"bytes32"}],"outputs":[{"name":"","type":"address"}]}"#;
    const SECOND: &str = r#"{"type":"function","name":"addr","stateMutability":"view",
        "inputs":[{"name":"node","type":"bytes32"},{"name":"coinType","type":"uint256"}],
        "outputs":[{"name":"","type":"bytes"}]}"#;

    fn method_for(plan: &abibind_gen::BindingPlan, signature: &str) -> String {
        plan.function(signature).unwrap().method.clone()
    }

    #[test]
    fn test_overloads_follow_declaration_order() {
        let plan = Abigen::new("R", format!("[{FIRST},{SECOND}]")).plan().unwrap();
        assert_eq!(method_for(&plan, "addr(bytes32)"), "addr");
        assert_eq!(method_for(&plan, "addr(bytes32,uint256)"), "addr0");
    }

    #[test]
    fn test_reordering_swaps_bare_name() {
        let plan = Abigen::new("R", format!("[{SECOND},{FIRST}]")).plan().unwrap();
        assert_eq!(method_for(&plan, "addr(bytes32,uint256)"), "addr");
        assert_eq!(method_for(&plan, "addr(bytes32)"), "addr0");
    }

    #[test]
    fn test_module_override() {
        let bindings = Abigen::new("PublicResolver", "[]").module("resolver").generate().unwrap();
        assert_eq!(bindings.module_name, "resolver");
        assert!(bindings.source.contains("pub mod resolver"));
    }
}

// ==================== Determinism ====================

mod determinism {
    use super::*;

    #[test]
    fn test_same_input_same_bytes() {
        assert_eq!(generate(REGISTRY_ABI), generate(REGISTRY_ABI));
    }

    #[test]
    fn test_abi_constant_is_canonical() {
        let compact: String = REGISTRY_ABI.split_whitespace().collect::<Vec<_>>().join("");
        let a = generate(REGISTRY_ABI);
        let b = generate(&compact);
        assert_eq!(a, b);
    }
}

// ==================== Failures ====================

mod failures {
    use super::*;

    #[test]
    fn test_unsupported_type_names_function() {
        let abi = r#"[{"type":"function","name":"foo","stateMutability":"view",
            "inputs":[{"name":"x","type":"unknownfoo"}],"outputs":[]}]"#;
        match Abigen::new("Bad", abi).generate() {
            Err(GenError::UnsupportedType { ty, item }) => {
                assert_eq!(ty, "unknownfoo");
                assert!(item.contains("foo"));
            }
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type_in_event() {
        let abi = r#"[{"type":"event","name":"Weird","anonymous":false,
            "inputs":[{"name":"x","type":"uint7","indexed":false}]}]"#;
        assert!(matches!(
            Abigen::new("Bad", abi).generate(),
            Err(GenError::UnsupportedType { item, .. }) if item == "event Weird"
        ));
    }

    #[test]
    fn test_malformed_abi() {
        let err = Abigen::new("Bad", r#"{"not":"an abi"}"#).generate().unwrap_err();
        assert!(matches!(
            err,
            GenError::Abi(AbiError::MalformedAbi { location: AbiLocation::Document, .. })
        ));
    }

    #[test]
    fn test_bad_runtime_path() {
        let config = GeneratorConfig {
            runtime_crate: "1nvalid path".to_string(),
            ..Default::default()
        };
        let result = Abigen::new("C", "[]").with_config(config).generate();
        assert!(matches!(result, Err(GenError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Abigen::from_file("C", "/nonexistent/abi.json");
        assert!(matches!(result, Err(GenError::Io { .. })));
    }
}

// ==================== Configuration ====================

mod config {
    use super::*;

    #[test]
    fn test_docs_can_be_disabled() {
        let config = GeneratorConfig {
            docs: false,
            ..Default::default()
        };
        let source = Abigen::new("ENSRegistry", REGISTRY_ABI)
            .with_config(config)
            .generate()
            .unwrap()
            .source;
        assert!(!source.contains("selector `0x02571be3`"));
    }

    #[test]
    fn test_extra_derives_and_runtime_path() {
        let config = GeneratorConfig {
            runtime_crate: "::my_runtime".to_string(),
            derives: vec!["Hash".to_string()],
            docs: true,
        };
        let source = Abigen::new("ENSRegistry", REGISTRY_ABI)
            .with_config(config)
            .generate()
            .unwrap()
            .source;
        assert!(source.contains("my_runtime::tokens"));
        assert!(source.contains("Hash"));
    }
}

// ==================== Files ====================

mod files {
    use super::*;

    #[test]
    fn test_write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/ens_registry.rs");
        let bindings = Abigen::new("ENSRegistry", REGISTRY_ABI).generate().unwrap();

        bindings.write_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), bindings.source);
        assert!(bindings.is_up_to_date(&path));
    }

    #[test]
    fn test_multi_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("abi")).unwrap();
        std::fs::write(dir.path().join("abi/Registry.json"), REGISTRY_ABI).unwrap();
        std::fs::write(dir.path().join("abi/Empty.json"), "[]").unwrap();
        std::fs::write(
            dir.path().join("abibind.toml"),
            r#"
                [[contracts]]
                name = "ENSRegistry"
                abi = "abi/Registry.json"

                [[contracts]]
                name = "Empty"
                abi = "abi/Empty.json"
            "#,
        )
        .unwrap();

        let multi = MultiAbigen::from_config_file(dir.path().join("abibind.toml")).unwrap();
        assert_eq!(multi.len(), 2);

        let out = dir.path().join("generated");
        let written = multi.write_to_dir(&out).unwrap();
        assert_eq!(written, vec![out.join("ens_registry.rs"), out.join("empty.rs")]);
        assert!(multi.stale_files(&out).unwrap().is_empty());

        std::fs::write(out.join("empty.rs"), "// edited").unwrap();
        assert_eq!(multi.stale_files(&out).unwrap(), vec![out.join("empty.rs")]);
    }

    #[test]
    fn test_failed_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::default();
        let multi = MultiAbigen::from_config(&config, dir.path())
            .unwrap()
            .push(Abigen::new("Good", "[]"))
            .push(Abigen::new("Bad", r#"[{"type":"function","name":"f","inputs":[{"name":"x","type":"unknownfoo"}],"outputs":[]}]"#));

        let out = dir.path().join("generated");
        assert!(multi.write_to_dir(&out).is_err());
        assert!(!out.exists());
    }
}
