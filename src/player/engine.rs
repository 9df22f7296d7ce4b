use serde::{Deserialize, Serialize};

use super::events::EventSink;
use super::media::MediaElement;

/// Settings handed to every engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub enable_worker: bool,
    pub low_latency: bool,
    pub with_credentials: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency: true,
            with_credentials: false,
        }
    }
}

/// Adaptive streaming engine for platforms without native HLS.
///
/// Emits `ManifestParsed` and categorized errors through the sink it was
/// created with.
pub trait AdaptiveEngine {
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self, media: &mut dyn MediaElement);
    /// Resume loading after a network failure
    fn start_load(&mut self);
    fn recover_media_error(&mut self);
    fn destroy(&mut self);
}

pub trait EngineFactory {
    fn is_supported(&self) -> bool;
    fn create(&self, config: &EngineConfig, sink: EventSink) -> Box<dyn AdaptiveEngine>;
}

/// Factory for hosts that have no adaptive engine at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAdaptiveEngine;

struct UnavailableEngine;

impl AdaptiveEngine for UnavailableEngine {
    fn load_source(&mut self, _url: &str) {}
    fn attach_media(&mut self, _media: &mut dyn MediaElement) {}
    fn start_load(&mut self) {}
    fn recover_media_error(&mut self) {}
    fn destroy(&mut self) {}
}

impl EngineFactory for NoAdaptiveEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self, _config: &EngineConfig, _sink: EventSink) -> Box<dyn AdaptiveEngine> {
        Box::new(UnavailableEngine)
    }
}
