/*!
 * Named Guard Tests
 */

use named_lock::{Guard, LockError, LockMode, NamedLock, NamedRwLock};
use pretty_assertions::assert_eq;
use std::thread;
use std::time::Duration;

#[test]
fn test_guard_metadata() {
    let locks = NamedLock::new();
    let guard = locks.acquire("meta").unwrap();

    assert_eq!(guard.resource_type(), "named_lock");
    assert_eq!(guard.metadata().resource_type, "named_lock");
    assert!(guard.is_active());
    assert_eq!(guard.name(), &"meta");

    let rw = NamedRwLock::new();
    let guard = rw.acquire_upgradable_read("meta").unwrap();
    assert_eq!(guard.resource_type(), "named_rwlock");
    assert_eq!(guard.mode(), LockMode::UpgradableRead);
}

#[test]
fn test_double_release_is_rejected() {
    let locks = NamedLock::new();
    let mut guard = locks.acquire("twice".to_string()).unwrap();
    let other = locks.clone();

    guard.release().unwrap();
    // Somebody else may take the name now
    let taken = other.try_acquire("twice".to_string()).unwrap();

    let err = guard.release().unwrap_err();
    assert_eq!(
        err,
        LockError::DoubleRelease {
            name: "twice".to_string()
        }
    );
    // The second release must not have touched the new holder's entry
    assert_eq!(locks.registry().holders(&"twice".to_string()), Some(1));

    drop(taken);
    drop(guard);
    assert!(locks.registry().is_empty());
}

#[test]
fn test_guard_released_on_another_thread() {
    let locks = NamedLock::new();
    let guard = locks.acquire(99u64).unwrap();

    thread::spawn(move || drop(guard)).join().unwrap();

    assert!(locks.registry().is_empty());
    assert!(locks.try_acquire(99u64).is_ok());
}

#[test]
fn test_guard_released_on_panic() {
    let locks = NamedLock::new();

    let worker = {
        let locks = locks.clone();
        thread::spawn(move || {
            let _guard = locks.acquire("panicky").unwrap();
            panic!("worker failed while holding the lock");
        })
    };
    assert!(worker.join().is_err());

    assert!(locks.registry().is_empty());
    let _guard = locks
        .acquire_timeout("panicky", Duration::from_millis(10))
        .unwrap();
}

#[test]
fn test_rw_guard_debug_output() {
    let locks = NamedRwLock::new();
    let guard = locks.acquire_write("dbg").unwrap();
    let rendered = format!("{:?}", guard);
    assert!(rendered.contains("\"dbg\""));
    assert!(rendered.contains("Write"));
    assert!(rendered.contains("active: true"));
}
