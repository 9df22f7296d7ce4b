use std::time::Duration;

use rstest::rstest;

use super::{PlaybackSession, LOAD_ERROR_MESSAGE};
use crate::config::PlayerConfig;
use crate::player::events::{EngineErrorKind, EngineEvent, MediaEvent};
use crate::player::media::Route;
use crate::player::source::PlaybackSource;
use crate::player::state::RuntimeState;
use crate::player::testing::{Harness, HarnessOptions};
use crate::subscription::SubscriptionState;

const HLS: &str = "https://cdn.example.com/live/azam1/index.m3u8";
const OTHER_HLS: &str = "https://cdn.example.com/live/azam2/index.m3u8";

fn remaining(session: &PlaybackSession) -> u32 {
    session.countdown().map(|c| c.remaining).unwrap_or_default()
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_open_starts_loading_with_engine() {
    let mut h = Harness::new();
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));

    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Loading));
    assert!(h.session.render().loading);
    assert!(h.session.has_engine());
    assert_eq!(h.engines.created(), 1);
    assert_eq!(h.count(&format!("engine.load_source {}", HLS)), 1);
    assert_eq!(h.count("engine.attach_media"), 1);

    let config = h.engines.last_config().unwrap();
    assert!(config.enable_worker);
    assert!(config.low_latency);
    assert!(!config.with_credentials);
}

#[test]
fn test_manifest_parsed_clears_loading() {
    let mut h = Harness::new();
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));
    h.engines.emit(EngineEvent::ManifestParsed);
    h.session.poll();

    let render = h.session.render();
    assert!(!render.loading);
    assert_eq!(render.error, None);
    assert_eq!(render.runtime, Some(RuntimeState::ReadyPaused));
    assert!(render.show_center_play);
}

#[test]
fn test_native_hls_preferred_when_available() {
    let mut h = Harness::with(HarnessOptions {
        native_hls: true,
        ..Default::default()
    });
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));

    assert_eq!(h.engines.created(), 0);
    assert_eq!(h.count(&format!("media.set_source {}", HLS)), 1);
}

#[test]
fn test_engine_first_when_native_not_preferred() {
    let mut h = Harness::with(HarnessOptions {
        native_hls: true,
        config: PlayerConfig {
            prefer_native_hls: false,
            ..Default::default()
        },
        ..Default::default()
    });
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));

    assert_eq!(h.engines.created(), 1);
    assert_eq!(h.count(&format!("media.set_source {}", HLS)), 0);
}

#[test]
fn test_no_hls_support_is_an_immediate_error() {
    let mut h = Harness::with(HarnessOptions {
        native_hls: false,
        engine_supported: false,
        ..Default::default()
    });
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));

    let render = h.session.render();
    assert_eq!(render.runtime, Some(RuntimeState::Error));
    assert_eq!(render.error, Some(LOAD_ERROR_MESSAGE));
    assert!(!render.loading);
}

#[test]
fn test_direct_stream_goes_to_element() {
    let mut h = Harness::with(HarnessOptions {
        engine_supported: false,
        ..Default::default()
    });
    let url = "https://cdn.example.com/vod/final.mp4";
    h.session.open(PlaybackSource::new(url, "Final", "ch-9"));
    h.media.emit(MediaEvent::CanPlay);
    h.session.poll();

    assert_eq!(h.count(&format!("media.set_source {}", url)), 1);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPaused));
}

#[test]
fn test_media_error_sets_error() {
    let mut h = Harness::new();
    h.session.open(PlaybackSource::new("http://host/1.ts", "One", "c1"));
    h.media.emit(MediaEvent::Error("404".to_string()));
    h.session.poll();

    let render = h.session.render();
    assert_eq!(render.error, Some(LOAD_ERROR_MESSAGE));
    assert!(!render.loading);
}

#[test]
fn test_opening_equal_source_keeps_session() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(10);
    let id = h.session.session_id();

    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));

    assert_eq!(h.session.session_id(), id);
    assert_eq!(h.engines.created(), 1);
    assert_eq!(remaining(&h.session), 110);
}

// ============================================================================
// Trial countdown
// ============================================================================

#[rstest]
#[case(SubscriptionState::Active)]
#[case(SubscriptionState::Expired)]
fn test_non_pending_never_counts_down(#[case] subscription: SubscriptionState) {
    let mut h = Harness::new();
    h.session.set_subscription(subscription);
    h.open_playing(HLS);

    for _ in 0..300 {
        h.advance_secs(1);
    }

    let render = h.session.render();
    assert_eq!(remaining(&h.session), 120);
    assert!(!h.session.countdown().unwrap().running);
    assert_eq!(render.runtime, Some(RuntimeState::ReadyPlaying));
    assert!(!render.locked);
    assert_eq!(render.trial_banner, None);
    assert_eq!(h.count("media.pause"), 0);
}

#[test]
fn test_trial_ends_after_two_minutes_of_playback() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    assert_eq!(h.session.render().trial_banner.as_deref(), Some("2:00"));

    for _ in 0..119 {
        h.advance_secs(1);
    }
    assert_eq!(remaining(&h.session), 1);
    assert_eq!(h.session.render().trial_banner.as_deref(), Some("0:01"));
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPlaying));

    h.advance_secs(1);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
    assert_eq!(h.count("media.pause"), 1);

    let render = h.session.render();
    assert!(render.locked);
    assert_eq!(render.trial_banner, None);
    assert!(!render.show_center_play);

    // Nothing more happens, and play is refused
    h.advance_secs(60);
    h.session.toggle_play();
    h.session.poll();
    assert_eq!(h.count("media.pause"), 1);
    assert_eq!(h.count("media.play"), 1);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
}

#[test]
fn test_trial_end_in_one_long_poll() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(500);

    assert_eq!(remaining(&h.session), 0);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
    assert_eq!(h.count("media.pause"), 1);
    assert!(!h.session.has_pending_timers());
}

#[test]
fn test_pause_halts_countdown() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(30);
    assert_eq!(remaining(&h.session), 90);

    h.session.toggle_play();
    h.session.poll();
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPaused));

    h.advance_secs(60);
    assert_eq!(remaining(&h.session), 90);
    assert!(!h.session.countdown().unwrap().running);

    h.session.toggle_play();
    h.session.poll();
    h.advance_secs(10);
    assert_eq!(remaining(&h.session), 80);
}

#[test]
fn test_error_stops_countdown() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(5);
    h.engines.fatal(EngineErrorKind::Other);
    h.session.poll();

    h.advance_secs(30);
    assert_eq!(remaining(&h.session), 115);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Error));
}

#[test]
fn test_platform_play_after_trial_end_is_paused_again() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(120);
    assert_eq!(h.count("media.pause"), 1);

    h.media.emit(MediaEvent::Playing);
    h.session.poll();

    assert_eq!(h.count("media.pause"), 2);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
}

#[test]
fn test_element_error_after_trial_end_keeps_lock() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(120);

    h.media.emit(MediaEvent::Error("decode".to_string()));
    h.session.poll();

    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
    assert!(h.session.render().locked);
}

#[test]
fn test_subscription_activation_unlocks() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(120);
    assert!(h.session.render().locked);

    h.session.set_subscription(SubscriptionState::Active);
    h.session.poll();
    let render = h.session.render();
    assert!(!render.locked);
    assert_eq!(render.runtime, Some(RuntimeState::ReadyPaused));

    h.session.toggle_play();
    h.session.poll();
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPlaying));

    // Falling back to pending with the trial used up locks again
    h.session.set_subscription(SubscriptionState::Pending);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::TrialEnded));
}

// ============================================================================
// Source changes and teardown
// ============================================================================

#[test]
fn test_source_change_resets_countdown_and_ignores_stale_events() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(50);
    assert_eq!(remaining(&h.session), 70);

    let old_media = h.media.sink().unwrap();
    let old_engine = h.engines.sink().unwrap();
    let old_id = h.session.session_id();

    h.open_ready(OTHER_HLS);
    assert_ne!(h.session.session_id(), old_id);
    assert_eq!(remaining(&h.session), 120);
    assert_eq!(h.count("engine.destroy"), 1);

    // Old interval is gone
    h.advance_secs(10);
    assert_eq!(remaining(&h.session), 120);

    old_media.media(MediaEvent::Error("late".to_string()));
    old_media.media(MediaEvent::Playing);
    old_engine.engine(EngineEvent::Error {
        kind: EngineErrorKind::Other,
        fatal: true,
        details: "late".to_string(),
    });
    h.session.poll();

    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPaused));
    assert_eq!(h.count("engine.destroy"), 1);
    assert_eq!(h.session.render().error, None);
}

#[test]
fn test_teardown_order() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    assert!(h.session.has_pending_timers());
    h.clear_log();

    h.session.close();

    assert_eq!(
        h.calls(),
        vec!["engine.destroy", "media.unbind", "media.clear_source"]
    );
    assert_eq!(h.session.session_id(), None);
    assert_eq!(h.session.next_deadline(), None);
}

#[test]
fn test_drop_releases_session() {
    let mut h = Harness::new();
    h.open_ready(HLS);
    let Harness { session, log, .. } = h;

    drop(session);

    let calls = log.borrow();
    assert!(calls.iter().any(|c| c == "engine.destroy"));
    assert_eq!(calls.last().map(String::as_str), Some("media.clear_source"));
}

// ============================================================================
// Engine errors
// ============================================================================

#[test]
fn test_duplicate_other_error_destroys_once() {
    let mut h = Harness::new();
    h.open_ready(HLS);

    h.engines.fatal(EngineErrorKind::Other);
    h.engines.fatal(EngineErrorKind::Other);
    h.session.poll();

    assert_eq!(h.count("engine.destroy"), 1);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Error));
    assert!(!h.session.has_engine());

    h.session.close();
    assert_eq!(h.count("engine.destroy"), 1);
}

#[test]
fn test_network_error_recovers_in_place() {
    let mut h = Harness::new();
    h.session.open(PlaybackSource::new(HLS, "Azam Sports 1", "ch-1"));
    h.engines.fatal(EngineErrorKind::Network);
    h.session.poll();

    assert_eq!(h.count("engine.start_load"), 1);
    assert_eq!(h.session.render().error, Some(LOAD_ERROR_MESSAGE));

    h.engines.emit(EngineEvent::ManifestParsed);
    h.session.poll();

    let render = h.session.render();
    assert!(!render.loading);
    assert_eq!(render.error, None);
    assert_eq!(h.count("engine.destroy"), 0);
}

#[test]
fn test_element_error_during_recovery_is_final() {
    let mut h = Harness::new();
    h.open_ready(HLS);

    h.engines.fatal(EngineErrorKind::Network);
    h.session.poll();
    assert_eq!(h.count("engine.start_load"), 1);

    h.media.emit(MediaEvent::Error("decode failed".to_string()));
    h.session.poll();
    h.media.emit(MediaEvent::CanPlay);
    h.engines.emit(EngineEvent::ManifestParsed);
    h.media.emit(MediaEvent::Playing);
    h.session.poll();

    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Error));
    assert_eq!(h.session.render().error, Some(LOAD_ERROR_MESSAGE));
}

#[test]
fn test_network_error_keeps_countdown() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(20);

    h.engines.fatal(EngineErrorKind::Network);
    h.session.poll();
    h.engines.emit(EngineEvent::ManifestParsed);
    h.session.poll();

    assert_eq!(remaining(&h.session), 100);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPlaying));
}

#[test]
fn test_media_error_recovered_only_once() {
    let mut h = Harness::new();
    h.open_ready(HLS);

    h.engines.fatal(EngineErrorKind::Media);
    h.session.poll();
    assert_eq!(h.count("engine.recover_media_error"), 1);
    h.media.emit(MediaEvent::CanPlay);
    h.session.poll();
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPaused));

    h.engines.fatal(EngineErrorKind::Media);
    h.session.poll();
    assert_eq!(h.count("engine.recover_media_error"), 1);
    assert_eq!(h.count("engine.destroy"), 1);
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Error));

    // No recovery pending, a late manifest does not clear the error
    h.engines.emit(EngineEvent::ManifestParsed);
    h.session.poll();
    assert_eq!(h.session.runtime_state(), Some(RuntimeState::Error));
}

#[test]
fn test_non_fatal_error_is_ignored() {
    let mut h = Harness::new();
    h.open_ready(HLS);
    h.engines.emit(EngineEvent::Error {
        kind: EngineErrorKind::Network,
        fatal: false,
        details: "fragment retry".to_string(),
    });
    h.session.poll();

    assert_eq!(h.session.runtime_state(), Some(RuntimeState::ReadyPaused));
    assert_eq!(h.count("engine.start_load"), 0);
}

// ============================================================================
// Controls
// ============================================================================

#[test]
fn test_controls_hide_after_idle_playback() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    assert!(h.session.render().controls_visible);

    h.advance(Duration::from_millis(2900));
    assert!(h.session.render().controls_visible);

    h.advance(Duration::from_millis(100));
    assert!(!h.session.render().controls_visible);
}

#[test]
fn test_interaction_restarts_hide_timer() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(2);
    h.session.interact();

    h.advance_secs(2);
    assert!(h.session.render().controls_visible);

    h.advance_secs(1);
    assert!(!h.session.render().controls_visible);

    h.session.interact();
    assert!(h.session.render().controls_visible);
}

#[test]
fn test_controls_stay_visible_while_paused() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(5);
    assert!(!h.session.render().controls_visible);

    h.session.toggle_play();
    h.session.poll();
    h.advance_secs(30);
    assert!(h.session.render().controls_visible);
}

#[test]
fn test_toggle_mute() {
    let mut h = Harness::new();
    h.open_ready(HLS);
    h.session.toggle_mute();
    assert!(h.session.render().muted);
    assert_eq!(h.count("media.set_muted true"), 1);

    h.session.toggle_mute();
    assert!(!h.session.render().muted);
}

#[test]
fn test_fullscreen_follows_change_events() {
    let mut h = Harness::new();
    h.open_ready(HLS);

    h.session.toggle_fullscreen();
    assert_eq!(h.count("viewport.request_fullscreen"), 1);
    assert!(!h.session.render().fullscreen);

    h.session.on_fullscreen_change(true);
    assert!(h.session.render().fullscreen);

    h.session.toggle_fullscreen();
    assert_eq!(h.count("viewport.exit_fullscreen"), 1);
}

#[test]
fn test_denied_fullscreen_keeps_flag_false() {
    let mut h = Harness::with(HarnessOptions {
        deny_fullscreen: true,
        ..Default::default()
    });
    h.open_ready(HLS);
    h.session.toggle_fullscreen();

    assert_eq!(h.count("viewport.request_fullscreen"), 1);
    assert!(!h.session.render().fullscreen);
}

#[test]
fn test_upgrade_and_exit_navigate() {
    let mut h = Harness::new();
    h.open_playing(HLS);
    h.advance_secs(120);

    h.session.upgrade();
    h.session.exit();

    assert_eq!(*h.navigator.routes.borrow(), vec![Route::Upgrade, Route::Back]);
    assert_eq!(h.session.session_id(), None);
}
