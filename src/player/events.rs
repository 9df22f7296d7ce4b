use std::sync::mpsc::Sender;

/// Identifies one opened session. Events carrying an older id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Notifications from the media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    CanPlay,
    Playing,
    Paused,
    Ended,
    Error(String),
}

/// Fatal engine errors are grouped the way they are recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

/// Notifications from the adaptive streaming engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ManifestParsed,
    Error {
        kind: EngineErrorKind,
        fatal: bool,
        details: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Media(MediaEvent),
    Engine(EngineEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub kind: EventKind,
}

/// Handed to the media element and engine so they can report back.
/// Cloneable and `Send`, decoder threads keep their own copy.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: Sender<SessionEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: Sender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn media(&self, event: MediaEvent) {
        self.send(EventKind::Media(event));
    }

    pub fn engine(&self, event: EngineEvent) {
        self.send(EventKind::Engine(event));
    }

    fn send(&self, kind: EventKind) {
        // Receiver is gone once the controller is dropped
        let _ = self.tx.send(SessionEvent {
            session: self.session,
            kind,
        });
    }
}
