#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Registry behaviour under re-registration and concurrent access.

use std::sync::Arc;
use std::thread;

use function_broker::Registration;
use function_broker::domain::registry::Registry;

#[test]
fn reregistration_replaces_the_whole_entry() {
    let registry = Registry::new();
    registry
        .register(Registration::new(
            "mini-app-b",
            ["getUser", "getSettings"],
            ["http://localhost:3001", "http://backup:3001"],
        ))
        .unwrap();
    registry
        .register(Registration::new(
            "mini-app-b",
            ["getProfile"],
            ["http://localhost:4001"],
        ))
        .unwrap();

    let current = registry.lookup("mini-app-b").unwrap();
    assert!(current.exposes("getProfile"));
    assert!(!current.exposes("getUser"));
    assert_eq!(current.addresses, vec!["http://localhost:4001"]);
    assert_eq!(registry.len(), 1);
}

#[test]
fn identical_registration_is_idempotent() {
    let registry = Registry::new();
    let reg = Registration::new("a", ["f"], ["http://a"]);
    registry.register(reg.clone()).unwrap();
    registry.register(reg.clone()).unwrap();

    assert_eq!(*registry.lookup("a").unwrap(), reg);
    assert_eq!(registry.list().len(), 1);
}

#[test]
fn concurrent_writers_and_readers_never_see_partial_entries() {
    let registry = Arc::new(Registry::new());
    let mut handles = Vec::new();

    for i in 0..8 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            for round in 0..200 {
                let port = 3000 + round;
                registry
                    .register(Registration::new(
                        format!("app-{}", i % 2),
                        [format!("f{round}")],
                        [format!("http://host:{port}")],
                    ))
                    .unwrap();
            }
        }));
    }
    for _ in 0..4 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                if let Some(reg) = registry.lookup("app-0") {
                    assert_eq!(reg.functions.len(), 1);
                    assert_eq!(reg.addresses.len(), 1);
                    let function = reg.functions.iter().next().unwrap();
                    let round = function.trim_start_matches('f');
                    let port: u32 = round.parse::<u32>().unwrap() + 3000;
                    assert_eq!(reg.addresses[0], format!("http://host:{port}"));
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.len(), 2);
}
