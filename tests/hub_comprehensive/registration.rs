//! Building the hub: validation, aliases and the three call surfaces.

use crate::common::*;

fn strict_signature() -> Signature {
    Signature::new(vec![
        Parameter::positional("a"),
        Parameter::positional("b").with_default(0),
    ])
    .unwrap()
}

#[test]
fn paths_are_sorted() {
    let hub = Hub::builder(HubConfig::default())
        .register(plain_add("mods.test", "zeta"))
        .register(plain_add("mods.test", "alpha"))
        .register(plain_add("mods.nest.basic", "ret"))
        .build()
        .unwrap();
    assert_eq!(
        hub.paths(),
        vec!["mods.nest.basic.ret", "mods.test.alpha", "mods.test.zeta"]
    );
    assert_eq!(hub.len(), 3);
}

#[test]
fn missing_default_contract_is_reported() {
    let mut config = HubConfig::default();
    config.namespace_mut("mods").default_contracts = vec!["init".to_string(), "ghost".to_string()];

    let err = Hub::builder(config)
        .contracts("mods", ContractSet::new().with(Contract::new("init")))
        .register(plain_add("mods.test", "ping"))
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "contract not found: ghost");
}

#[test]
fn default_contracts_without_a_set_are_reported() {
    let mut config = HubConfig::default();
    config.namespace_mut("mods").default_contracts = vec!["init".to_string()];
    assert!(matches!(
        Hub::builder(config).build(),
        Err(Error::ContractNotFound { .. })
    ));
}

#[test]
fn verification_collects_every_violation() {
    let mut config = HubConfig::default();
    config.namespace_mut("mods").verify_signatures = true;

    let bad = Implementation::plain(
        Target::new(
            "mods.test",
            "ping",
            Signature::new(vec![
                Parameter::positional("x"),
                Parameter::positional("b"),
                Parameter::positional("c"),
            ])
            .unwrap(),
        ),
        add,
    );
    let err = Hub::builder(config)
        .contracts(
            "mods",
            ContractSet::new()
                .with(Contract::new("init").expect_signature("ping", strict_signature())),
        )
        .register(bad)
        .build()
        .unwrap_err();

    match err {
        Error::ContractSignature { target, violations } => {
            assert_eq!(target, "mods.test.ping");
            assert_eq!(
                violations,
                vec![
                    "init: parameter \"x\" does not have the correct name: a".to_string(),
                    "init: parameter \"b\" does not have a default value".to_string(),
                    "init: extra parameter \"c\" must have a default value".to_string(),
                ]
            );
        }
        other => panic!("expected ContractSignature, got {:?}", other),
    }
}

#[test]
fn conforming_implementation_passes_verification() {
    let mut config = HubConfig::default();
    config.namespace_mut("mods").verify_signatures = true;
    let hub = Hub::builder(config)
        .contracts(
            "mods",
            ContractSet::new()
                .with(Contract::new("test").expect_signature("ping", strict_signature())),
        )
        .register(Implementation::plain(
            Target::new(
                "mods.test",
                "ping",
                Signature::new(vec![
                    Parameter::positional("a"),
                    Parameter::positional("b").with_default(5),
                    Parameter::keyword_only("verbose").with_default(false),
                ])
                .unwrap(),
            ),
            add,
        ))
        .build()
        .unwrap();
    assert_eq!(hub.call("mods.test.ping", Args::new().arg(1)).unwrap(), Value::Int(6));
}

#[test]
fn alias_registers_under_public_name() {
    let rec = Recorder::new();
    let hub = Hub::builder(HubConfig::default())
        .contracts(
            "mods",
            ContractSet::new().with(Contract::new("test").pre("list", rec.pre("pre_list"))),
        )
        .register(plain_add("mods.test", "list_").with_alias("list"))
        .build()
        .unwrap();

    assert_eq!(hub.paths(), vec!["mods.test.list"]);
    assert_eq!(hub.call("mods.test.list", Args::new().arg(1)).unwrap(), Value::Int(3));
    assert_eq!(rec.events(), vec!["pre_list"]);
    assert_eq!(hub.get("mods.test.list").unwrap().target().name(), "list_");
}

#[test]
fn binding_errors_name_the_aliased_path() {
    let hub = Hub::builder(HubConfig::default())
        .register(plain_add("mods.test", "_list").with_alias("list"))
        .build()
        .unwrap();

    let err = hub.call("mods.test.list", Args::new()).unwrap_err();
    assert!(err.is_binding());
    let message = err.to_string();
    assert!(message.contains("mods.test.list"), "{}", message);
    assert!(!message.contains("_list"), "{}", message);
}

#[test]
fn unqualified_target_is_reachable_by_its_path() {
    let implementation = plain_add("", "f");
    let path = implementation.target().path().to_string();
    assert_eq!(path, "f");

    let hub = Hub::builder(HubConfig::default())
        .register(implementation)
        .build()
        .unwrap();
    assert_eq!(hub.paths(), vec!["f"]);
    assert_eq!(hub.call(&path, Args::new().arg(1)).unwrap(), Value::Int(3));
}

#[test]
fn async_hook_on_plain_implementation_fails_build() {
    let rec = Recorder::new();
    let err = Hub::builder(HubConfig::default())
        .contracts(
            "mods",
            ContractSet::new().with(Contract::new("init").pre_all(rec.pre_async("slow"))),
        )
        .register(plain_add("mods.test", "ping"))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::StageMismatch { ref stage, nature: "plain" } if stage == "init.pre"
    ));
}

#[tokio::test]
async fn every_surface_through_the_hub() {
    let rec = Recorder::new();
    let hub = Hub::builder(HubConfig::default())
        .contracts(
            "mods",
            ContractSet::new().with(Contract::new("init").pre_all(rec.pre_async("pre"))),
        )
        .register(async_add("mods.test", "later"))
        .register(counter("mods.test", "count"))
        .build()
        .unwrap();

    assert_eq!(
        hub.call_async("mods.test.later", Args::new().arg(1)).await.unwrap(),
        Value::Int(3)
    );
    let items = collect_ok(hub.call_stream("mods.test.count", Args::new().arg(2))).await;
    assert_eq!(items, vec![Value::Int(0), Value::Int(1)]);
    assert_eq!(rec.events(), vec!["pre", "pre"]);

    assert!(matches!(
        hub.call("mods.test.later", Args::new().arg(1)),
        Err(Error::WrongMode { .. })
    ));
    assert!(matches!(
        hub.call_async("mods.test.count", Args::new().arg(1)).await,
        Err(Error::WrongMode { .. })
    ));
}
