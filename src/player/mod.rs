//! Trial-gated playback session
//!
//! The controller in [`controller`] owns one media element, an optional
//! adaptive streaming engine, the trial countdown and the controls-hide
//! timer. Everything it talks to sits behind the traits in [`media`] and
//! [`engine`] so the desktop shell and the tests can plug in their own.

pub mod clock;
pub mod controller;
pub mod engine;
pub mod events;
pub mod media;
pub mod source;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::SystemClock;
pub use controller::{PlaybackSession, RenderState};
pub use engine::{EngineConfig, NoAdaptiveEngine};
pub use events::{EventSink, MediaEvent};
pub use media::{MediaElement, Navigator, Route, Viewport};
pub use source::PlaybackSource;
