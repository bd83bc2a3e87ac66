//! With no stages, a dispatcher is indistinguishable from the implementation.

use crate::common::*;

#[test]
fn no_contracts_matches_direct_call() {
    let imp = plain_add("mods.test", "ping");
    let dispatcher = Dispatcher::new(imp.clone(), stages_for(&ContractSet::new(), "ping")).unwrap();
    assert!(dispatcher.stages().is_empty());

    let cases = [
        Args::new().arg(1),
        Args::new().arg(1).arg(5),
        Args::new().kwarg("a", 3).kwarg("b", 4),
        Args::new().arg(1).arg(2).arg(3),
        Args::new().kwarg("zzz", 1),
    ];
    for args in cases {
        let wrapped = dispatcher.call(args.clone());
        let direct = imp.call(&args);
        match (wrapped, direct) {
            (Ok(w), Ok(d)) => assert_eq!(w, d),
            (Err(w), Err(d)) => assert_eq!(w.to_string(), d.to_string()),
            (w, d) => panic!("diverged: {:?} vs {:?}", w, d),
        }
    }
}

#[test]
fn unrelated_contracts_leave_fast_path() {
    // Stages for other operations do not apply to `ping`.
    let set = ContractSet::new().with(
        Contract::new("test")
            .pre("pong", PreHook::sync(|_| Err(Error::failed("wrong op"))))
            .post("pong", PostHook::sync(|_| Ok(Some(Value::Null)))),
    );
    let dispatcher =
        Dispatcher::new(plain_add("mods.test", "ping"), stages_for(&set, "ping")).unwrap();
    assert!(dispatcher.stages().is_empty());
    assert_eq!(dispatcher.call(Args::new().arg(1)).unwrap(), Value::Int(3));
}

#[tokio::test]
async fn no_contracts_async_and_stream() {
    let imp = async_add("mods.test", "later");
    let dispatcher = Dispatcher::bare(imp.clone());
    assert_eq!(
        dispatcher.call_async(Args::new().arg(4)).await.unwrap(),
        imp.call_async(&Args::new().arg(4)).await.unwrap()
    );

    let dispatcher = Dispatcher::bare(counter("mods.test", "count"));
    let items = collect_ok(dispatcher.call_stream(Args::new().arg(3))).await;
    assert_eq!(items, vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
}
