//! STREAM dispatch: forward every element, then one post-processed value.

use crate::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn forwards_sequence_exactly_without_post() {
    let rec = Recorder::new();
    let set = ContractSet::new().with(Contract::new("test").pre_all(rec.pre_async("pre")));
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();

    let items = collect_ok(dispatcher.call_stream(Args::new().arg(3))).await;
    assert_eq!(items, vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
    assert_eq!(rec.events(), vec!["pre"]);
}

#[tokio::test]
async fn elements_arrive_before_posts_run() {
    let rec = Recorder::new();
    let set = ContractSet::new().with(Contract::new("test").post_all(rec.post("post")));
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();

    let mut s = dispatcher.call_stream(Args::new().arg(2));
    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(0));
    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(1));
    assert!(rec.events().is_empty());

    // Unchanged last element is yielded again as the final value.
    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(1));
    assert_eq!(rec.events(), vec!["post"]);
    assert!(s.next().await.is_none());
}

fn lazy_producer(polls: Arc<AtomicUsize>) -> Implementation {
    Implementation::streaming(
        Target::new("mods.test", "lazy", Signature::empty()),
        move |_| {
            let polls = Arc::clone(&polls);
            stream::unfold(0i64, move |n| {
                let polls = Arc::clone(&polls);
                async move {
                    polls.fetch_add(1, Ordering::SeqCst);
                    (n < 3).then(|| (Ok(Value::Int(n)), n + 1))
                }
            })
        },
    )
}

#[tokio::test]
async fn each_element_is_delivered_before_the_next_is_produced() {
    let polls = Arc::new(AtomicUsize::new(0));
    let rec = Recorder::new();
    let set = ContractSet::new().with(
        Contract::new("test")
            .pre_all(rec.pre_async("pre"))
            .post_all(rec.post("post")),
    );
    let dispatcher =
        Dispatcher::new(lazy_producer(Arc::clone(&polls)), stages_for(&set, "lazy")).unwrap();

    let mut s = dispatcher.call_stream(Args::new());
    assert_eq!(polls.load(Ordering::SeqCst), 0);

    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(0));
    assert_eq!(polls.load(Ordering::SeqCst), 1);

    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(1));
    assert_eq!(polls.load(Ordering::SeqCst), 2);
    assert_eq!(rec.events(), vec!["pre"]);
}

#[tokio::test]
async fn uncontracted_stream_is_equally_lazy() {
    let polls = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::bare(lazy_producer(Arc::clone(&polls)));

    let mut s = dispatcher.call_stream(Args::new());
    assert_eq!(s.next().await.unwrap().unwrap(), Value::Int(0));
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn post_replaces_final_value() {
    let set = ContractSet::new().with(Contract::new("test").post("count", PostHook::sync(|ctx| {
        let last = ctx.ret().and_then(Value::as_int).unwrap_or(-1);
        Ok(Some(Value::from(format!("done:{}", last))))
    })));
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();

    let items = collect_ok(dispatcher.call_stream(Args::new().arg(3))).await;
    assert_eq!(
        items,
        vec![Value::Int(0), Value::Int(1), Value::Int(2), Value::from("done:2")]
    );
}

#[tokio::test]
async fn empty_stream_with_post() {
    let set = ContractSet::new().with(Contract::new("test").post_all(PostHook::sync(|ctx| {
        Ok(match ctx.ret() {
            None => Some(Value::from("empty")),
            Some(_) => None,
        })
    })));
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();
    let items = collect_ok(dispatcher.call_stream(Args::new().arg(0))).await;
    assert_eq!(items, vec![Value::from("empty")]);
}

#[tokio::test]
async fn element_error_ends_stream() {
    let imp = Implementation::streaming(Target::new("mods.test", "flaky", sig_ab()), |_| {
        stream::iter(vec![
            Ok(Value::Int(1)),
            Err(Error::failed("broken pipe")),
            Ok(Value::Int(2)),
        ])
    });
    let rec = Recorder::new();
    let set = ContractSet::new().with(Contract::new("test").post_all(rec.post("post")));
    let dispatcher = Dispatcher::new(imp, stages_for(&set, "flaky")).unwrap();

    let items: Vec<Result<Value>> = dispatcher.call_stream(Args::new().arg(1)).collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), &Value::Int(1));
    assert_eq!(items[1].as_ref().unwrap_err().to_string(), "broken pipe");
    assert!(rec.events().is_empty());
}

#[tokio::test]
async fn pre_stage_error_yields_once() {
    let set = ContractSet::new().with(
        Contract::new("test").pre_all(PreHook::sync(|_| Err(Error::failed("nope")))),
    );
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();
    let items: Vec<Result<Value>> = dispatcher.call_stream(Args::new().arg(3)).collect().await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}

#[tokio::test]
async fn override_stream_sees_context() {
    let set = ContractSet::new().with(Contract::new("test").call("count", CallHook::stream(|ctx| {
        let n = ctx.argument("a")?.as_int().unwrap_or(0);
        let items: Vec<Result<Value>> = (0..n).rev().map(|i| Ok(Value::Int(i))).collect();
        Ok(Box::pin(stream::iter(items)))
    })));
    let dispatcher =
        Dispatcher::new(counter("mods.test", "count"), stages_for(&set, "count")).unwrap();
    let items = collect_ok(dispatcher.call_stream(Args::new().arg(3))).await;
    assert_eq!(items, vec![Value::Int(2), Value::Int(1), Value::Int(0)]);
}

#[tokio::test]
async fn invoke_yields_streaming_variant() {
    let dispatcher = Dispatcher::bare(counter("mods.test", "count"));
    let invocation = dispatcher.invoke(Args::new().arg(2));
    assert!(matches!(invocation, pact::Invocation::Streaming(_)));
    let items = collect_ok(invocation.into_stream()).await;
    assert_eq!(items, vec![Value::Int(0), Value::Int(1)]);
}
