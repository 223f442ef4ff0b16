//! Concurrent access tests: registration linearizability, racing
//! first-time lazy resolutions, and isolation between unrelated keys.

use bindery::{Behavior, Registry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

struct Tagged {
    tag: u32,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_first_gets_observe_exactly_one_singleton() {
    const TASKS: usize = 32;

    let constructed = Arc::new(AtomicU32::new(0));
    let counter = constructed.clone();

    let registry = Arc::new(Registry::new());
    registry
        .register_type_with(
            move |_: ()| Tagged {
                tag: counter.fetch_add(1, Ordering::SeqCst),
            },
            Behavior::LAZY_SINGLETON,
        )
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(TASKS));
    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let registry = registry.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            registry.get::<Tagged>().await.unwrap()
        }));
    }

    let mut tags = HashSet::new();
    let mut values = Vec::new();
    for handle in handles {
        let value = handle.await.unwrap();
        tags.insert(value.tag);
        values.push(value);
    }

    // Several candidates may have been constructed, but every caller saw
    // the same published value.
    assert_eq!(tags.len(), 1);
    for value in &values[1..] {
        assert!(Arc::ptr_eq(&values[0], value));
    }
    assert_eq!(
        registry.get::<Tagged>().await.unwrap().tag,
        values[0].tag,
        "later resolutions keep returning the published value"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_publication_does_not_block_unrelated_keys() {
    let registry = Arc::new(Registry::new());
    registry
        .register_type_with(
            |_: ()| {
                std::thread::sleep(Duration::from_millis(100));
                Tagged { tag: 0 }
            },
            Behavior::LAZY_SINGLETON,
        )
        .await
        .unwrap();
    registry.register_instance("fast".to_string()).await;

    let slow_registry = registry.clone();
    let slow = tokio::spawn(async move { slow_registry.get::<Tagged>().await.unwrap() });

    // While the slow first resolution constructs, other keys stay usable.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let fast = tokio::time::timeout(Duration::from_millis(50), registry.get::<String>())
        .await
        .expect("unrelated key blocked behind a publication")
        .unwrap();
    assert_eq!(&*fast, "fast");

    slow.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registration_and_resolution_is_safe() {
    const WRITERS: usize = 8;
    const READERS: usize = 8;

    let registry = Arc::new(Registry::new());
    registry.register_instance(0u64).await;

    let barrier = Arc::new(Barrier::new(WRITERS + READERS));
    let mut handles = Vec::new();

    for i in 0..WRITERS {
        let registry = registry.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            registry.register_instance(i as u64).await;
        }));
    }
    for _ in 0..READERS {
        let registry = registry.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            // Every read observes some fully registered value.
            let value = registry.get::<u64>().await.unwrap();
            assert!(*value < WRITERS as u64);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Last write wins; afterwards exactly one entry remains.
    assert_eq!(registry.len().await, 1);
    assert!(*registry.get::<u64>().await.unwrap() < WRITERS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_initializers_each_run_once() {
    const TASKS: usize = 16;

    let registry = Arc::new(Registry::new());
    registry
        .register_type_with(|_: ()| Tagged { tag: 7 }, Behavior::LAZY_SINGLETON)
        .await
        .unwrap();

    let runs = Arc::new(AtomicU32::new(0));
    let barrier = Arc::new(Barrier::new(TASKS));
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let registry = registry.clone();
        let barrier = barrier.clone();
        let runs = runs.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            registry
                .get_with_initializer(move |_: &Tagged| {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // One initializer run per resolution, regardless of who published.
    assert_eq!(runs.load(Ordering::SeqCst), TASKS as u32);
}
