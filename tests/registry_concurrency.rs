//! Concurrent writers and readers against one registry.
//!
//! Readers must never observe zero or two default records, however the
//! writers interleave default swaps, disables and deletes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use domain_router::domain::NewDomain;
use domain_router::error::DomainError;
use domain_router::registry::Registry;
use domain_router::{RequestContext, Resolver};

const RECORDS: usize = 8;

fn populated() -> Arc<Registry> {
    let registry = Arc::new(Registry::in_memory());
    for i in 0..RECORDS {
        registry
            .create(NewDomain::new(format!("d{}", i), format!("d{}.example.com", i)), false)
            .unwrap();
    }
    registry
}

#[test]
fn test_exactly_one_default_under_concurrent_swaps() {
    let registry = populated();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut observed = 0usize;
                while !done.load(Ordering::Relaxed) {
                    let snapshot = registry.snapshot();
                    assert_eq!(snapshot.default_count(), 1);
                    let default = snapshot.default_record().unwrap();
                    assert!(default.status());
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = registry.clone();
            thread::spawn(move || {
                for round in 0..200 {
                    let id = format!("d{}", (w + round) % RECORDS);
                    match registry.set_default(&id) {
                        Ok(_) | Err(DomainError::CannotPromoteDisabled(_)) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                    let other = format!("d{}", (w * 3 + round) % RECORDS);
                    match registry.disable(&other) {
                        Ok(_) | Err(DomainError::CannotDisableDefault(_)) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                    let _ = registry.enable(&other);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(registry.snapshot().default_count(), 1);
    assert_eq!(registry.len(), RECORDS);
}

#[test]
fn test_resolution_never_fails_during_deletes() {
    let registry = populated();
    let resolver = Resolver::new(registry.clone());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let ctx = RequestContext::new("d3.example.com", "/");
                let record = resolver.get_active_domain(&ctx).unwrap();
                assert!(record.status());
            }
        })
    };

    for i in 0..RECORDS - 1 {
        let id = format!("d{}", i);
        if registry.default_domain().map(|r| r.id() == id).unwrap_or(false) {
            registry.set_default(&format!("d{}", RECORDS - 1)).unwrap();
        }
        registry.delete(&id).unwrap();
    }
    done.store(true, Ordering::Relaxed);
    reader.join().unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.default_domain().unwrap().id(), "d7");
}

#[test]
fn test_concurrent_creates_keep_hostnames_unique() {
    let registry = Arc::new(Registry::in_memory());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .create(NewDomain::new(format!("t{}", t), "Same.Example.com"), false)
                    .is_ok()
            })
        })
        .collect();

    let created = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
    assert_eq!(created, 1);
    assert_eq!(registry.snapshot().default_count(), 1);
}
