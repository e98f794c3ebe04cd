//! Idle auto-leave tests
//!
//! Runs on paused tokio time so the five-minute timeout elapses instantly.

mod common;

use chorus_core::{GuildId, TrackRef};
use chorus_playback::IdleMonitor;
use common::harness;
use std::time::Duration;
use tokio::time::sleep;

const GUILD: GuildId = GuildId::new(3);
const TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::test(start_paused = true)]
async fn test_leaves_after_timeout_alone() {
    let h = harness();
    h.controller
        .enqueue_or_play(GUILD, TrackRef::new("a"))
        .await
        .unwrap();
    let monitor = IdleMonitor::new(h.controller.clone(), TIMEOUT);

    monitor.membership_changed(GUILD, true);
    assert!(monitor.is_armed(GUILD));

    sleep(Duration::from_secs(299)).await;
    assert!(h.controller.registry().contains(GUILD));
    assert!(h.sink.disconnects().is_empty());

    sleep(Duration::from_secs(2)).await;
    assert!(!h.controller.registry().contains(GUILD));
    assert_eq!(h.sink.disconnects(), vec![GUILD]);
    assert!(!monitor.is_armed(GUILD));
}

#[tokio::test(start_paused = true)]
async fn test_company_cancels_timer() {
    let h = harness();
    h.controller
        .enqueue_or_play(GUILD, TrackRef::new("a"))
        .await
        .unwrap();
    let monitor = IdleMonitor::new(h.controller.clone(), TIMEOUT);

    monitor.membership_changed(GUILD, true);
    sleep(Duration::from_secs(100)).await;
    monitor.membership_changed(GUILD, false);
    assert!(!monitor.is_armed(GUILD));

    sleep(Duration::from_secs(400)).await;
    assert!(h.controller.registry().contains(GUILD));
    assert!(h.sink.disconnects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_membership_change_restarts_timer() {
    let h = harness();
    let monitor = IdleMonitor::new(h.controller.clone(), TIMEOUT);

    monitor.membership_changed(GUILD, true);
    sleep(Duration::from_secs(200)).await;
    monitor.membership_changed(GUILD, true);

    sleep(Duration::from_secs(200)).await;
    assert!(h.sink.disconnects().is_empty());

    sleep(Duration::from_secs(101)).await;
    assert_eq!(h.sink.disconnects(), vec![GUILD]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_monitor_cancels_timers() {
    let h = harness();
    let monitor = IdleMonitor::new(h.controller.clone(), TIMEOUT);

    monitor.membership_changed(GUILD, true);
    drop(monitor);

    sleep(Duration::from_secs(600)).await;
    assert!(h.sink.disconnects().is_empty());
}
