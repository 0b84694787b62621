/*!
 * Named Lock Demo
 *
 * Runs a contended exclusive workload and a mixed reader/writer workload on
 * shared names, then reports timings and registry statistics.
 */

use named_lock::monitoring::millis_field;
use named_lock::{init_tracing, LockConfig, NamedLock, NamedRwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const THREADS: usize = 24;
const HOLD: Duration = Duration::from_millis(5);

fn main() {
    init_tracing();

    let config = LockConfig::from_env();
    info!(
        default_timeout_ms = millis_field(config.default_timeout),
        "Named lock demo starting"
    );

    run_exclusive(config);
    run_read_write(config);
}

fn run_exclusive(config: LockConfig) {
    let locks = NamedLock::with_config(config);
    let counter = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let locks = locks.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                // Two names, so half the threads never contend with the other half
                let name = format!("account-{}", i % 2);
                match locks.acquire(name) {
                    Ok(_guard) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                        thread::sleep(HOLD);
                    }
                    Err(e) => warn!(error = %e, "Exclusive acquire failed"),
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            warn!("Exclusive worker panicked");
        }
    }

    let stats = locks.registry().stats();
    info!(
        elapsed_ms = millis_field(start.elapsed()),
        completed = counter.load(Ordering::Relaxed),
        live_entries = stats.entries,
        peak_entries = stats.peak_entries,
        created = stats.entries_created,
        timeouts = stats.timeouts,
        "Exclusive workload finished"
    );
}

fn run_read_write(config: LockConfig) {
    let locks = NamedRwLock::with_config(config);
    let start = Instant::now();

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let locks = locks.clone();
            thread::spawn(move || {
                let result = match i % 3 {
                    0 => locks.acquire_read("document"),
                    1 => locks.acquire_upgradable_read("document"),
                    _ => locks.acquire_write("document"),
                };
                match result {
                    Ok(_guard) => thread::sleep(HOLD),
                    Err(e) => warn!(error = %e, "Reader/writer acquire failed"),
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            warn!("Reader/writer worker panicked");
        }
    }

    let stats = locks.registry().stats();
    info!(
        elapsed_ms = millis_field(start.elapsed()),
        acquisitions = stats.acquisitions,
        live_entries = stats.entries,
        peak_entries = stats.peak_entries,
        timeouts = stats.timeouts,
        "Reader/writer workload finished"
    );
}
