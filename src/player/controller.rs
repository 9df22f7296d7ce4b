//! Playback session controller
//!
//! One `PlaybackSession` lives as long as the watch screen. Each call to
//! [`PlaybackSession::open`] with a new source starts a fresh session with
//! its own [`SessionId`]; media and engine callbacks are queued through an
//! [`EventSink`] and applied in [`PlaybackSession::poll`], after which due
//! timers fire in deadline order.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::subscription::SubscriptionState;

use super::clock::Clock;
use super::engine::{AdaptiveEngine, EngineFactory};
use super::events::{
    EngineErrorKind, EngineEvent, EventKind, EventSink, MediaEvent, SessionEvent, SessionId,
};
use super::media::{MediaElement, Navigator, Route, Viewport};
use super::source::{PlaybackSource, StreamKind};
use super::state::{format_trial_time, RuntimeState, TrialCountdown};

/// Shown for every load failure
pub const LOAD_ERROR_MESSAGE: &str = "Unable to load stream";
pub const LOAD_ERROR_HINT: &str = "Please check the stream URL or try again later";

const TICK: Duration = Duration::from_secs(1);

/// Everything the view needs to draw the player
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub title: String,
    pub runtime: Option<RuntimeState>,
    pub loading: bool,
    pub error: Option<&'static str>,
    /// Remaining trial time as `m:ss`, only while the trial applies
    pub trial_banner: Option<String>,
    /// Trial over, show the upgrade overlay
    pub locked: bool,
    pub controls_visible: bool,
    pub show_center_play: bool,
    pub playing: bool,
    pub muted: bool,
    pub fullscreen: bool,
}

/// Timers and the engine owned by one session
#[derive(Default)]
struct SessionResources {
    next_tick: Option<Instant>,
    hide_deadline: Option<Instant>,
    engine: Option<Box<dyn AdaptiveEngine>>,
}

impl SessionResources {
    /// Cancel the countdown, then the hide timeout, then destroy the engine
    fn release(&mut self) {
        self.next_tick = None;
        self.hide_deadline = None;
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }
}

struct ActiveSession {
    id: SessionId,
    source: PlaybackSource,
    state: RuntimeState,
    /// Last play state reported by the element
    element_playing: bool,
    countdown: TrialCountdown,
    controls_visible: bool,
    /// Set while a network or media recovery is in flight
    recovering: Option<EngineErrorKind>,
    media_recovery_used: bool,
    resources: SessionResources,
}

#[derive(Debug, Clone, Copy)]
enum Timer {
    Tick,
    HideControls,
}

pub struct PlaybackSession {
    config: PlayerConfig,
    clock: Box<dyn Clock>,
    media: Box<dyn MediaElement>,
    viewport: Box<dyn Viewport>,
    engines: Box<dyn EngineFactory>,
    navigator: Box<dyn Navigator>,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    last_id: u64,
    current: Option<ActiveSession>,
    subscription: SubscriptionState,
    muted: bool,
    fullscreen: bool,
}

impl PlaybackSession {
    pub fn new(
        config: PlayerConfig,
        clock: Box<dyn Clock>,
        media: Box<dyn MediaElement>,
        viewport: Box<dyn Viewport>,
        engines: Box<dyn EngineFactory>,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        let (tx, rx) = channel();
        Self {
            config,
            clock,
            media,
            viewport,
            engines,
            navigator,
            tx,
            rx,
            last_id: 0,
            current: None,
            subscription: SubscriptionState::Pending,
            muted: false,
            fullscreen: false,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.current.as_ref().map(|s| s.id)
    }

    pub fn runtime_state(&self) -> Option<RuntimeState> {
        self.current.as_ref().map(|s| s.state)
    }

    pub fn countdown(&self) -> Option<TrialCountdown> {
        self.current.as_ref().map(|s| s.countdown)
    }

    pub fn source(&self) -> Option<&PlaybackSource> {
        self.current.as_ref().map(|s| &s.source)
    }

    pub fn subscription(&self) -> SubscriptionState {
        self.subscription
    }

    pub fn has_engine(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.resources.engine.is_some())
    }

    pub fn has_pending_timers(&self) -> bool {
        self.current.as_ref().is_some_and(|s| {
            s.resources.next_tick.is_some() || s.resources.hide_deadline.is_some()
        })
    }

    /// Start playing `source`. An equal source keeps the current session.
    pub fn open(&mut self, source: PlaybackSource) {
        if self.current.as_ref().is_some_and(|s| s.source == source) {
            debug!(url = %source.stream_url, "source unchanged, keeping session");
            return;
        }

        self.teardown();

        self.last_id += 1;
        let id = SessionId(self.last_id);
        let sink = EventSink::new(id, self.tx.clone());
        let kind = source.kind();
        info!(session = id.0, url = %source.stream_url, ?kind, "opening stream");

        let mut session = ActiveSession {
            id,
            source,
            state: RuntimeState::Loading,
            element_playing: false,
            countdown: TrialCountdown::new(self.config.trial_duration_secs),
            controls_visible: true,
            recovering: None,
            media_recovery_used: false,
            resources: SessionResources::default(),
        };

        self.media.bind(sink.clone());
        self.media.set_muted(self.muted);

        let url = session.source.stream_url.clone();
        match kind {
            StreamKind::Direct => self.media.set_source(&url),
            StreamKind::Adaptive => {
                let native = self.media.can_play_native_hls();
                let engine_supported = self.engines.is_supported();
                let use_native = native && (self.config.prefer_native_hls || !engine_supported);

                if use_native {
                    debug!("using native HLS playback");
                    self.media.set_source(&url);
                } else if engine_supported {
                    debug!(config = ?self.config.engine, "using adaptive engine");
                    let mut engine = self.engines.create(&self.config.engine, sink);
                    engine.load_source(&url);
                    engine.attach_media(self.media.as_mut());
                    session.resources.engine = Some(engine);
                } else {
                    error!(url = %url, "no HLS playback available on this platform");
                    session.state = RuntimeState::Error;
                }
            }
        }

        self.current = Some(session);
    }

    /// Release the current session, if any
    pub fn close(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.current.take() {
            debug!(session = session.id.0, "tearing down session");
            session.resources.release();
            self.media.unbind();
            self.media.clear_source();
        }
    }

    pub fn set_subscription(&mut self, state: SubscriptionState) {
        if self.subscription == state {
            return;
        }
        info!(from = ?self.subscription, to = ?state, "subscription changed");
        self.subscription = state;

        if state != SubscriptionState::Pending
            && self.runtime_state() == Some(RuntimeState::TrialEnded)
        {
            let next = self.ready_state();
            self.transition(next);
        }
        let now = self.clock.now();
        self.sync_countdown(now);
    }

    /// Apply queued callbacks, then fire due timers
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
        self.fire_timers();
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        match self.session_id() {
            Some(id) if id == event.session => {}
            _ => {
                debug!(session = event.session.0, "dropping event from stale session");
                return;
            }
        }
        match event.kind {
            EventKind::Media(event) => self.on_media(event),
            EventKind::Engine(event) => self.on_engine(event),
        }
    }

    /// When the next timer is due, for hosts that sleep between polls
    pub fn next_deadline(&self) -> Option<Instant> {
        let resources = &self.current.as_ref()?.resources;
        match (resources.next_tick, resources.hide_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fire_timers(&mut self) {
        let now = self.clock.now();
        loop {
            let Some(session) = self.current.as_ref() else { return };
            let due = [
                session.resources.next_tick.map(|at| (at, Timer::Tick)),
                session.resources.hide_deadline.map(|at| (at, Timer::HideControls)),
            ]
            .into_iter()
            .flatten()
            .filter(|(at, _)| *at <= now)
            .min_by_key(|(at, _)| *at);

            let Some((at, timer)) = due else { return };
            match timer {
                Timer::Tick => self.on_tick(at),
                Timer::HideControls => {
                    if let Some(session) = self.current.as_mut() {
                        session.resources.hide_deadline = None;
                        session.controls_visible = false;
                    }
                }
            }
        }
    }

    fn on_tick(&mut self, at: Instant) {
        let Some(session) = self.current.as_mut() else { return };
        session.resources.next_tick = None;
        let reached_zero = session.countdown.tick();
        if reached_zero {
            self.end_trial();
        } else if session.countdown.running {
            session.resources.next_tick = Some(at + TICK);
        }
    }

    fn on_media(&mut self, event: MediaEvent) {
        let Some(session) = self.current.as_mut() else { return };
        let state = session.state;
        match event {
            MediaEvent::CanPlay => self.on_ready(),
            MediaEvent::Playing => {
                session.element_playing = true;
                match state {
                    RuntimeState::TrialEnded => {
                        debug!("play attempt after trial ended, pausing");
                        self.media.pause();
                    }
                    RuntimeState::Error if session.recovering.is_none() => {}
                    _ => {
                        session.recovering = None;
                        self.transition(RuntimeState::ReadyPlaying);
                    }
                }
            }
            MediaEvent::Paused | MediaEvent::Ended => {
                session.element_playing = false;
                if state == RuntimeState::ReadyPlaying {
                    self.transition(RuntimeState::ReadyPaused);
                }
            }
            MediaEvent::Error(details) => {
                // A recovery in flight cannot revive the session after this
                if let Some(kind) = session.recovering.take() {
                    warn!(?kind, "recovery failed");
                }
                self.fail(&details);
            }
        }
    }

    fn on_engine(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::ManifestParsed => {
                info!("HLS manifest loaded");
                self.on_ready();
            }
            EngineEvent::Error {
                fatal: false,
                kind,
                details,
            } => {
                warn!(?kind, %details, "non-fatal engine error");
            }
            EngineEvent::Error {
                fatal: true,
                kind,
                details,
            } => self.on_fatal(kind, &details),
        }
    }

    fn on_fatal(&mut self, kind: EngineErrorKind, details: &str) {
        let Some(session) = self.current.as_mut() else { return };
        if session.resources.engine.is_none() {
            debug!(?kind, "fatal error after engine destroyed, ignoring");
            return;
        }

        let kind = if kind == EngineErrorKind::Media && session.media_recovery_used {
            warn!("media error repeated, giving up");
            EngineErrorKind::Other
        } else {
            kind
        };

        self.fail(details);

        let Some(session) = self.current.as_mut() else { return };
        let Some(engine) = session.resources.engine.as_mut() else { return };
        match kind {
            EngineErrorKind::Network => {
                info!("network error, trying to recover");
                session.recovering = Some(kind);
                engine.start_load();
            }
            EngineErrorKind::Media => {
                info!("media error, trying to recover");
                session.recovering = Some(kind);
                session.media_recovery_used = true;
                engine.recover_media_error();
            }
            EngineErrorKind::Other => {
                session.recovering = None;
                engine.destroy();
                session.resources.engine = None;
            }
        }
    }

    /// `CanPlay` or `ManifestParsed`
    fn on_ready(&mut self) {
        let Some(session) = self.current.as_mut() else { return };
        match session.state {
            RuntimeState::Loading => {}
            RuntimeState::Error if session.recovering.is_some() => {
                info!(kind = ?session.recovering, "stream recovered");
                session.recovering = None;
            }
            _ => return,
        }
        let next = self.ready_state();
        self.transition(next);
    }

    fn fail(&mut self, details: &str) {
        let Some(session) = self.current.as_ref() else { return };
        match session.state {
            RuntimeState::Error => {}
            RuntimeState::TrialEnded => {
                debug!(%details, "error after trial ended");
            }
            _ => {
                error!(url = %session.source.stream_url, %details, "stream failed");
                self.transition(RuntimeState::Error);
            }
        }
    }

    fn ready_state(&self) -> RuntimeState {
        match self.current.as_ref() {
            Some(s) if s.element_playing => RuntimeState::ReadyPlaying,
            _ => RuntimeState::ReadyPaused,
        }
    }

    fn transition(&mut self, next: RuntimeState) {
        let now = self.clock.now();
        let hide_delay = self.config.controls_hide_delay();
        let Some(session) = self.current.as_mut() else { return };
        if session.state == next {
            return;
        }
        debug!(session = session.id.0, from = ?session.state, to = ?next, "state change");

        let was_playing = session.state == RuntimeState::ReadyPlaying;
        session.state = next;
        if next == RuntimeState::ReadyPlaying {
            session.controls_visible = true;
            session.resources.hide_deadline = Some(now + hide_delay);
        } else if was_playing {
            session.controls_visible = true;
            session.resources.hide_deadline = None;
        }

        self.sync_countdown(now);
    }

    /// Keep `running` equal to Pending && ReadyPlaying && remaining > 0
    fn sync_countdown(&mut self, now: Instant) {
        let pending = self.subscription == SubscriptionState::Pending;
        let Some(session) = self.current.as_mut() else { return };

        if pending && session.countdown.is_exhausted() && session.state.is_ready() {
            self.end_trial();
            return;
        }

        let should_run = pending
            && session.state == RuntimeState::ReadyPlaying
            && !session.countdown.is_exhausted();
        if should_run && !session.countdown.running {
            session.countdown.running = true;
            session.resources.next_tick = Some(now + TICK);
        } else if !should_run && session.countdown.running {
            session.countdown.running = false;
            session.resources.next_tick = None;
        }
    }

    fn end_trial(&mut self) {
        let Some(session) = self.current.as_mut() else { return };
        if session.state == RuntimeState::TrialEnded {
            return;
        }
        info!(title = %session.source.title, "free trial ended");
        session.countdown.running = false;
        session.resources.next_tick = None;
        session.element_playing = false;
        self.media.pause();
        self.transition(RuntimeState::TrialEnded);
    }

    pub fn toggle_play(&mut self) {
        self.interact();
        let Some(session) = self.current.as_ref() else { return };
        if session.state == RuntimeState::TrialEnded {
            return;
        }
        if session.element_playing {
            self.media.pause();
        } else {
            self.media.play();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.interact();
        self.muted = !self.muted;
        self.media.set_muted(self.muted);
    }

    /// The flag only follows `on_fullscreen_change`
    pub fn toggle_fullscreen(&mut self) {
        self.interact();
        if self.fullscreen {
            self.viewport.exit_fullscreen();
        } else if let Err(e) = self.viewport.request_fullscreen() {
            warn!("Error attempting fullscreen: {}", e);
        }
    }

    pub fn on_fullscreen_change(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    /// Pointer or key activity over the player
    pub fn interact(&mut self) {
        let now = self.clock.now();
        let delay = self.config.controls_hide_delay();
        let Some(session) = self.current.as_mut() else { return };
        session.controls_visible = true;
        if session.state == RuntimeState::ReadyPlaying {
            session.resources.hide_deadline = Some(now + delay);
        }
    }

    pub fn upgrade(&mut self) {
        self.navigator.navigate(Route::Upgrade);
    }

    pub fn exit(&mut self) {
        self.close();
        self.navigator.navigate(Route::Back);
    }

    pub fn render(&self) -> RenderState {
        let pending = self.subscription == SubscriptionState::Pending;
        let Some(session) = self.current.as_ref() else {
            return RenderState {
                title: String::new(),
                runtime: None,
                loading: false,
                error: None,
                trial_banner: None,
                locked: false,
                controls_visible: true,
                show_center_play: false,
                playing: false,
                muted: self.muted,
                fullscreen: self.fullscreen,
            };
        };

        let state = session.state;
        let playing = state == RuntimeState::ReadyPlaying;
        let ended = state == RuntimeState::TrialEnded;
        RenderState {
            title: session.source.title.clone(),
            runtime: Some(state),
            loading: state == RuntimeState::Loading,
            error: (state == RuntimeState::Error).then_some(LOAD_ERROR_MESSAGE),
            trial_banner: (pending && !ended)
                .then(|| format_trial_time(session.countdown.remaining)),
            locked: pending && ended,
            controls_visible: session.controls_visible || !playing,
            show_center_play: state == RuntimeState::ReadyPaused,
            playing,
            muted: self.muted,
            fullscreen: self.fullscreen,
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
