mod common;

use launcher_content_sync::state::poll_state::{PollSupervisor, PollTick, PollerKey, TickOutcome};
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn counting(
    counter: &Arc<AtomicU64>,
) -> impl Fn(PollTick) -> Ready<TickOutcome> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |_tick| {
        counter.fetch_add(1, Ordering::SeqCst);
        ready(TickOutcome::Continue)
    }
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_run() {
    common::init_logging();
    let supervisor = PollSupervisor::new();
    let first = Arc::new(AtomicU64::new(0));
    let second = Arc::new(AtomicU64::new(0));

    supervisor.start(PollerKey::ModsWatcher, Duration::from_secs(1), counting(&first));
    supervisor.start(PollerKey::ModsWatcher, Duration::from_secs(1), counting(&second));

    sleep(Duration::from_millis(5500)).await;

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 5);
    assert!(supervisor.is_running(PollerKey::ModsWatcher));
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_one_interval() {
    let supervisor = PollSupervisor::new();
    let ticks = Arc::new(AtomicU64::new(0));

    supervisor.start(PollerKey::LogsRefresh, Duration::from_secs(2), counting(&ticks));

    sleep(Duration::from_millis(1900)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_drops_fingerprint_and_ticks() {
    let supervisor = PollSupervisor::new();
    let ticks = Arc::new(AtomicU64::new(0));

    supervisor.start_seeded(
        PollerKey::ModsWatcher,
        Duration::from_secs(1),
        Some("a.jar:false".to_string()),
        counting(&ticks),
    );
    assert_eq!(
        supervisor.fingerprint(PollerKey::ModsWatcher).await.as_deref(),
        Some("a.jar:false")
    );

    supervisor.stop(PollerKey::ModsWatcher);
    // Stopping an idle key again is harmless
    supervisor.stop(PollerKey::ModsWatcher);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    assert!(!supervisor.is_running(PollerKey::ModsWatcher));
    assert_eq!(supervisor.fingerprint(PollerKey::ModsWatcher).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_body_can_stop_itself() {
    let supervisor = PollSupervisor::new();
    let ticks = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&ticks);

    supervisor.start(PollerKey::LoginPoll, Duration::from_secs(1), move |tick| {
        counter.fetch_add(1, Ordering::SeqCst);
        let outcome = if tick.tick >= 3 {
            TickOutcome::Stop
        } else {
            TickOutcome::Continue
        };
        ready(outcome)
    });

    sleep(Duration::from_millis(5500)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 3);
    assert!(!supervisor.is_running(PollerKey::LoginPoll));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_tick_does_not_remove_newer_run() {
    let supervisor = PollSupervisor::new();
    let newer = Arc::new(AtomicU64::new(0));

    supervisor.start(PollerKey::LoginPoll, Duration::from_secs(1), |_tick| async {
        sleep(Duration::from_secs(2)).await;
        TickOutcome::Stop
    });

    // The first run is inside its slow tick here
    sleep(Duration::from_millis(1500)).await;
    supervisor.start(PollerKey::LoginPoll, Duration::from_secs(1), counting(&newer));

    sleep(Duration::from_millis(3200)).await;
    assert!(supervisor.is_running(PollerKey::LoginPoll));
    assert_eq!(newer.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_fingerprint_carries_between_ticks() {
    let supervisor = PollSupervisor::new();
    let changes = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&changes);

    supervisor.start_seeded(
        PollerKey::ModsWatcher,
        Duration::from_secs(1),
        Some("same".to_string()),
        move |tick| {
            let counter = Arc::clone(&counter);
            async move {
                let current = if tick.tick == 2 { "changed" } else { "same" };
                let previous = tick.replace_fingerprint(current.to_string()).await;
                if previous.as_deref() != Some(current) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                TickOutcome::Continue
            }
        },
    );

    sleep(Duration::from_millis(4500)).await;
    // tick 2 changed away, tick 3 changed back, ticks 1 and 4 matched
    assert_eq!(changes.load(Ordering::SeqCst), 2);
    supervisor.stop_all();
    assert!(!supervisor.is_running(PollerKey::ModsWatcher));
}
