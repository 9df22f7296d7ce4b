use crate::error::PlayerError;

use super::events::EventSink;

/// The element that actually renders video.
///
/// Implementations report `CanPlay`, `Playing`, `Paused`, `Ended` and
/// `Error` through the sink passed to [`MediaElement::bind`]. The controller
/// never assumes `play()` succeeded until the element says so.
pub trait MediaElement {
    fn bind(&mut self, sink: EventSink);
    fn unbind(&mut self);
    fn set_source(&mut self, url: &str);
    fn clear_source(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    /// Whether HLS manifests can be assigned directly as the source
    fn can_play_native_hls(&self) -> bool;
}

/// The surface the player is shown on
pub trait Viewport {
    fn request_fullscreen(&mut self) -> Result<(), PlayerError>;
    fn exit_fullscreen(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Subscription screen
    Upgrade,
    Back,
}

pub trait Navigator {
    fn navigate(&mut self, route: Route);
}
