//! Fakes for driving a `PlaybackSession` in tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::PlayerConfig;
use crate::error::PlayerError;

use super::clock::ManualClock;
use super::controller::PlaybackSession;
use super::engine::{AdaptiveEngine, EngineConfig, EngineFactory};
use super::events::{EngineErrorKind, EngineEvent, EventSink, MediaEvent};
use super::media::{MediaElement, Navigator, Route, Viewport};
use super::source::PlaybackSource;

/// Calls made on any fake, in order
pub type CallLog = Rc<RefCell<Vec<String>>>;

fn record(log: &CallLog, call: &str) {
    log.borrow_mut().push(call.to_string());
}

/// Media element that answers `play`/`pause` with the matching event
#[derive(Clone)]
pub struct FakeMedia {
    log: CallLog,
    sink: Rc<RefCell<Option<EventSink>>>,
    native_hls: bool,
}

impl FakeMedia {
    pub fn sink(&self) -> Option<EventSink> {
        self.sink.borrow().clone()
    }

    pub fn emit(&self, event: MediaEvent) {
        if let Some(sink) = self.sink() {
            sink.media(event);
        }
    }
}

impl MediaElement for FakeMedia {
    fn bind(&mut self, sink: EventSink) {
        record(&self.log, "media.bind");
        *self.sink.borrow_mut() = Some(sink);
    }

    fn unbind(&mut self) {
        record(&self.log, "media.unbind");
        *self.sink.borrow_mut() = None;
    }

    fn set_source(&mut self, url: &str) {
        record(&self.log, &format!("media.set_source {}", url));
    }

    fn clear_source(&mut self) {
        record(&self.log, "media.clear_source");
    }

    fn play(&mut self) {
        record(&self.log, "media.play");
        self.emit(MediaEvent::Playing);
    }

    fn pause(&mut self) {
        record(&self.log, "media.pause");
        self.emit(MediaEvent::Paused);
    }

    fn set_muted(&mut self, muted: bool) {
        record(&self.log, &format!("media.set_muted {}", muted));
    }

    fn can_play_native_hls(&self) -> bool {
        self.native_hls
    }
}

#[derive(Clone)]
pub struct FakeEngineFactory {
    log: CallLog,
    supported: bool,
    sinks: Rc<RefCell<Vec<EventSink>>>,
    configs: Rc<RefCell<Vec<EngineConfig>>>,
}

impl FakeEngineFactory {
    /// Sink of the most recently created engine
    pub fn sink(&self) -> Option<EventSink> {
        self.sinks.borrow().last().cloned()
    }

    pub fn created(&self) -> usize {
        self.sinks.borrow().len()
    }

    pub fn last_config(&self) -> Option<EngineConfig> {
        self.configs.borrow().last().cloned()
    }

    pub fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.sink() {
            sink.engine(event);
        }
    }

    pub fn fatal(&self, kind: EngineErrorKind) {
        self.emit(EngineEvent::Error {
            kind,
            fatal: true,
            details: format!("{:?} failure", kind),
        });
    }
}

struct FakeEngine {
    log: CallLog,
}

impl AdaptiveEngine for FakeEngine {
    fn load_source(&mut self, url: &str) {
        record(&self.log, &format!("engine.load_source {}", url));
    }

    fn attach_media(&mut self, _media: &mut dyn MediaElement) {
        record(&self.log, "engine.attach_media");
    }

    fn start_load(&mut self) {
        record(&self.log, "engine.start_load");
    }

    fn recover_media_error(&mut self) {
        record(&self.log, "engine.recover_media_error");
    }

    fn destroy(&mut self) {
        record(&self.log, "engine.destroy");
    }
}

impl EngineFactory for FakeEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig, sink: EventSink) -> Box<dyn AdaptiveEngine> {
        self.sinks.borrow_mut().push(sink);
        self.configs.borrow_mut().push(config.clone());
        Box::new(FakeEngine {
            log: Rc::clone(&self.log),
        })
    }
}

#[derive(Clone)]
pub struct FakeViewport {
    log: CallLog,
    deny: bool,
}

impl Viewport for FakeViewport {
    fn request_fullscreen(&mut self) -> Result<(), PlayerError> {
        record(&self.log, "viewport.request_fullscreen");
        if self.deny {
            Err(PlayerError::FullscreenDenied("not allowed".to_string()))
        } else {
            Ok(())
        }
    }

    fn exit_fullscreen(&mut self) {
        record(&self.log, "viewport.exit_fullscreen");
    }
}

#[derive(Clone, Default)]
pub struct RecordingNavigator {
    pub routes: Rc<RefCell<Vec<Route>>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: Route) {
        self.routes.borrow_mut().push(route);
    }
}

/// Options for building a [`Harness`]
pub struct HarnessOptions {
    pub native_hls: bool,
    pub engine_supported: bool,
    pub deny_fullscreen: bool,
    pub config: PlayerConfig,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            native_hls: false,
            engine_supported: true,
            deny_fullscreen: false,
            config: PlayerConfig::default(),
        }
    }
}

/// A session wired to fakes plus handles to inspect them
pub struct Harness {
    pub session: PlaybackSession,
    pub clock: ManualClock,
    pub media: FakeMedia,
    pub engines: FakeEngineFactory,
    pub navigator: RecordingNavigator,
    pub log: CallLog,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(HarnessOptions::default())
    }

    pub fn with(options: HarnessOptions) -> Self {
        let log: CallLog = Rc::default();
        let clock = ManualClock::new();
        let media = FakeMedia {
            log: Rc::clone(&log),
            sink: Rc::default(),
            native_hls: options.native_hls,
        };
        let engines = FakeEngineFactory {
            log: Rc::clone(&log),
            supported: options.engine_supported,
            sinks: Rc::default(),
            configs: Rc::default(),
        };
        let viewport = FakeViewport {
            log: Rc::clone(&log),
            deny: options.deny_fullscreen,
        };
        let navigator = RecordingNavigator::default();

        let session = PlaybackSession::new(
            options.config,
            Box::new(clock.clone()),
            Box::new(media.clone()),
            Box::new(viewport),
            Box::new(engines.clone()),
            Box::new(navigator.clone()),
        );

        Self {
            session,
            clock,
            media,
            engines,
            navigator,
            log,
        }
    }

    /// Open an HLS source and let the manifest load
    pub fn open_ready(&mut self, url: &str) {
        self.session.open(PlaybackSource::new(url, "Azam Sports 1", "ch-1"));
        self.engines.emit(EngineEvent::ManifestParsed);
        self.media.emit(MediaEvent::CanPlay);
        self.session.poll();
    }

    /// Open, load and start playing
    pub fn open_playing(&mut self, url: &str) {
        self.open_ready(url);
        self.session.toggle_play();
        self.session.poll();
    }

    pub fn advance_secs(&mut self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.session.poll();
    }

    pub fn count(&self, call: &str) -> usize {
        self.log.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}
