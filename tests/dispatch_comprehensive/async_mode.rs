//! ASYNC dispatch: awaited stages in resolved order.

use crate::common::*;

#[tokio::test]
async fn async_pre_stages_are_awaited_before_the_next() {
    let rec = Recorder::new();
    let set = ContractSet::new()
        .with(Contract::new("test").pre_all(rec.pre_async("first")))
        .with(
            Contract::new("init")
                .pre_all(rec.pre("second"))
                .pre("later", rec.pre_async("exact")),
        );
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let dispatcher = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap();

    assert_eq!(dispatcher.call_async(Args::new().arg(1)).await.unwrap(), Value::Int(3));
    assert_eq!(rec.events(), vec!["first", "exact", "second"]);
}

#[tokio::test]
async fn sync_override_in_async_mode() {
    let rec = Recorder::new();
    let set = ContractSet::new().with(Contract::new("test").call_all(rec.call("sync-override")));
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let dispatcher = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap();
    assert_eq!(
        dispatcher.call_async(Args::new().arg(1)).await.unwrap(),
        Value::from("sync-override")
    );
}

#[tokio::test]
async fn async_post_substitution() {
    let post = PostHook::asynchronous(|ctx| {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let v = ctx.ret().and_then(Value::as_int).unwrap_or(0);
            Ok(if v > 10 { None } else { Some(Value::Int(v * 100)) })
        })
    });
    let set = ContractSet::new().with(Contract::new("test").post("later", post));
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let dispatcher = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap();

    assert_eq!(dispatcher.call_async(Args::new().arg(1)).await.unwrap(), Value::Int(300));
    assert_eq!(dispatcher.call_async(Args::new().arg(20)).await.unwrap(), Value::Int(22));
}

#[tokio::test]
async fn async_binding_error_on_await() {
    let set = ContractSet::new().with(Contract::new("test").pre_all(PreHook::sync(|_| Ok(()))));
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let dispatcher = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap();

    let pending = dispatcher.invoke(Args::new().arg(1).arg(2).arg(3));
    let err = match pending {
        pact::Invocation::Pending(fut) => fut.await.unwrap_err(),
        other => panic!("expected Pending, got {:?}", other),
    };
    assert!(err.is_binding());
}

#[tokio::test]
async fn stream_override_rejected_for_async() {
    let set = ContractSet::new().with(Contract::new("test").call_all(CallHook::stream(|_| {
        Ok(Box::pin(stream::empty::<Result<Value>>()))
    })));
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let err = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap_err();
    assert!(matches!(err, Error::StageMismatch { nature: "async", .. }));
}
