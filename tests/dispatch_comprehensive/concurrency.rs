//! Concurrent invocations share a dispatcher but never a call context.

use crate::common::*;
use std::thread;

#[test]
fn threads_share_one_dispatcher() {
    let set = ContractSet::new().with(
        Contract::new("test")
            .pre_all(PreHook::sync(|ctx| {
                let a = ctx.argument("a")?.clone();
                ctx.memo("a", || Ok(a))?;
                Ok(())
            }))
            .post_all(PostHook::sync(|ctx| {
                let a = ctx.memo("a", || Ok(Value::Null))?.as_int().unwrap_or(-1);
                let ret = ctx.ret().and_then(Value::as_int).unwrap_or(-1);
                assert_eq!(ret, a + 2);
                Ok(None)
            })),
    );
    let dispatcher =
        Dispatcher::new(plain_add("mods.test", "ping"), stages_for(&set, "ping")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let a = t * 1000 + i;
                    assert_eq!(dispatcher.call(Args::new().arg(a)).unwrap(), Value::Int(a + 2));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_share_one_async_dispatcher() {
    let rec = Recorder::new();
    let set = ContractSet::new().with(Contract::new("test").pre_all(rec.pre_async("pre")));
    let stages = Arc::new(resolve(Some(&set), &[], &[], "test", "later"));
    let dispatcher = Dispatcher::new(async_add("mods.test", "later"), stages).unwrap();

    let mut tasks = Vec::new();
    for i in 0..32i64 {
        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher.call_async(Args::new().arg(i)).await
        }));
    }
    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap().unwrap(), Value::Int(i as i64 + 2));
    }
    assert_eq!(rec.events().len(), 32);
}
