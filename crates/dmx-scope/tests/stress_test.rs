//! Concurrency stress tests for scope storage

use dmx_scope::prelude::*;
use dmx_test_utils::{counting_producer, init_tracing};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 16;

#[test]
fn concurrent_get_or_create_builds_once() {
    init_tracing();
    let manager = ScopeManager::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Barrier::new(THREADS);

    let scopes: Vec<Arc<DomainModelScope>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    manager
                        .get_or_create(
                            ScopeKey::new("stress", "Shared"),
                            counting_producer(calls.clone()),
                            Arc::default(),
                        )
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(scopes.iter().all(|scope| Arc::ptr_eq(scope, &scopes[0])));
    assert_eq!(manager.len(), 1);
}

#[test]
fn distinct_keys_build_independently() {
    let manager = ScopeManager::new();
    let calls = Arc::new(AtomicUsize::new(0));

    thread::scope(|s| {
        for unit in 0..THREADS {
            let manager = &manager;
            let calls = Arc::clone(&calls);
            s.spawn(move || {
                for _ in 0..4 {
                    manager
                        .get_or_create(
                            ScopeKey::new("stress", format!("Unit{unit}")),
                            counting_producer(Arc::clone(&calls)),
                            Arc::default(),
                        )
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), THREADS);
    assert_eq!(manager.len(), THREADS);
}

#[test]
fn build_in_progress_does_not_block_other_keys() {
    const WAIT: Duration = Duration::from_secs(5);

    let manager = ScopeManager::new();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = parking_lot::Mutex::new(release_rx);

    let slow: Arc<dyn DomainModelProducer> =
        Arc::new(move |_: &ServiceRegistry| -> ScopeResult<DomainModel> {
            let _ = started_tx.send(());
            release_rx
                .lock()
                .recv_timeout(WAIT)
                .map_err(|e| ScopeError::producer(format!("never released: {e}")))?;
            Ok(DomainModel::new())
        });

    let (done_tx, done_rx) = mpsc::channel();
    thread::scope(|s| {
        let slow_build = s.spawn(|| {
            manager.get_or_create(ScopeKey::new("stress", "Slow"), slow, Arc::default())
        });
        started_rx.recv_timeout(WAIT).unwrap();

        // Slow is mid-build; Fast and the aggregate queries still answer
        s.spawn(|| {
            let fast = manager.get_or_create(
                ScopeKey::new("stress", "Fast"),
                counting_producer(Arc::default()),
                Arc::default(),
            );
            let _ = done_tx.send((fast.is_ok(), manager.len(), manager.stats().slots));
        });
        let observed = done_rx.recv_timeout(Duration::from_secs(1));
        assert_eq!(observed, Ok((true, 1, 2)));

        release_tx.send(()).unwrap();
        assert!(slow_build.join().unwrap().is_ok());
    });

    assert_eq!(manager.len(), 2);
}

#[test]
fn remove_during_first_build_leaves_creator_with_detached_scope() {
    const WAIT: Duration = Duration::from_secs(5);

    let manager = ScopeManager::new();
    let key = ScopeKey::new("stress", "TornDown");
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = parking_lot::Mutex::new(release_rx);

    let slow: Arc<dyn DomainModelProducer> =
        Arc::new(move |_: &ServiceRegistry| -> ScopeResult<DomainModel> {
            let _ = started_tx.send(());
            release_rx
                .lock()
                .recv_timeout(WAIT)
                .map_err(|e| ScopeError::producer(format!("never released: {e}")))?;
            Ok(DomainModel::new())
        });

    thread::scope(|s| {
        let creator = s.spawn(|| manager.get_or_create(key.clone(), slow, Arc::default()));
        started_rx.recv_timeout(WAIT).unwrap();

        // Nothing is stored yet, so teardown finds no scope to hand back
        assert!(manager.remove(&key).is_none());

        release_tx.send(()).unwrap();
        let scope = creator.join().unwrap().unwrap();
        assert!(scope.is_active());
    });

    assert!(manager.find(&key).is_none());
    assert_eq!(manager.stats().slots, 0);
}

#[test]
fn concurrent_access_after_invalidate_rebuilds_once() {
    let manager = ScopeManager::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = manager
        .get_or_create(
            ScopeKey::new("stress", "Invalidated"),
            counting_producer(calls.clone()),
            Arc::default(),
        )
        .unwrap();
    scope.invalidate().unwrap();

    let barrier = Barrier::new(THREADS);
    let models: Vec<Arc<DomainModel>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    scope.domain_model().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(models.iter().all(|model| Arc::ptr_eq(model, &models[0])));
}

#[test]
fn close_all_closes_every_scope() {
    let manager = ScopeManager::new();
    let scopes: Vec<_> = (0..8)
        .map(|i| {
            manager
                .get_or_create(
                    ScopeKey::new("stress", format!("Close{i}")),
                    counting_producer(Arc::default()),
                    Arc::default(),
                )
                .unwrap()
        })
        .collect();

    assert_eq!(manager.close_all(), 8);
    assert!(manager.is_empty());
    assert!(scopes.iter().all(|scope| scope.phase() == ScopePhase::Closed));
    assert_eq!(manager.close_all(), 0);
}
