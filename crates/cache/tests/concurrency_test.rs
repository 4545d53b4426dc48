//! Integration tests for cache behavior under parallel callers: claim
//! races, detached fetch completion, and namespace sharing.

use docket_cache::{CacheStore, Clock, ManualClock, ResponseCache};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn cache_at(epoch: i64) -> ResponseCache {
    let clock = Arc::new(ManualClock::new(epoch));
    ResponseCache::new(Arc::new(CacheStore::new())).with_clock(clock as Arc<dyn Clock>)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_racers_share_one_fetch() {
    let cache = cache_at(1_000);
    let counter = Arc::new(AtomicUsize::new(0));
    let racers = 16;
    let barrier = Arc::new(Barrier::new(racers));

    let mut handles = Vec::with_capacity(racers);
    for _ in 0..racers {
        let cache = cache.clone();
        let counter = Arc::clone(&counter);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            cache
                .memoize("cases")
                .call(&["7"], move || async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst) as u32 + 1)
                })
                .await
                .unwrap()
        }));
    }

    for outcome in futures::future::join_all(handles).await {
        assert_eq!(outcome.unwrap(), 1);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropped_caller_does_not_cancel_the_fetch() {
    let cache = cache_at(1_000);
    let handle = cache.memoize("cases");
    let completed = Arc::new(AtomicBool::new(false));

    let fetch_flag = Arc::clone(&completed);
    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        handle.call(&["7"], move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fetch_flag.store(true, Ordering::SeqCst);
            Ok::<u32, String>(1)
        }),
    )
    .await;
    assert!(abandoned.is_err(), "caller should give up before the fetch settles");

    // The operation keeps running after its caller detached
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(completed.load(Ordering::SeqCst));

    // And its outcome landed in the shared slot
    let served = handle
        .call::<u32, String, _, _>(&["7"], || async {
            panic!("entry is fresh, fetch must not run")
        })
        .await
        .unwrap();
    assert_eq!(served, 1);
}

#[tokio::test]
async fn same_namespace_shares_entries_and_different_namespaces_do_not() {
    let cache = cache_at(1_000);
    let counter = Arc::new(AtomicUsize::new(0));

    let fetch = |counter: &Arc<AtomicUsize>| {
        let counter = Arc::clone(counter);
        async move { Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst) as u32 + 1) }
    };

    let first = cache.memoize("cases");
    assert_eq!(first.call(&["7"], || fetch(&counter)).await.unwrap(), 1);

    // A second handle over the same namespace reads the shared entry
    let second = cache.memoize("cases");
    assert_eq!(second.call(&["7"], || fetch(&counter)).await.unwrap(), 1);

    // A different namespace is isolated even for equal arguments
    let other = cache.memoize("parties");
    assert_eq!(other.call(&["7"], || fetch(&counter)).await.unwrap(), 2);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn independent_stores_do_not_share_state() {
    let counter = Arc::new(AtomicUsize::new(0));
    let fetch = |counter: &Arc<AtomicUsize>| {
        let counter = Arc::clone(counter);
        async move { Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst) as u32 + 1) }
    };

    let first = cache_at(1_000);
    let second = cache_at(1_000);

    assert_eq!(
        first.memoize("cases").call(&["7"], || fetch(&counter)).await.unwrap(),
        1
    );
    assert_eq!(
        second.memoize("cases").call(&["7"], || fetch(&counter)).await.unwrap(),
        2
    );
}
