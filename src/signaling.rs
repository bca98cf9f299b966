//! Application side collaborators.
//!
//! Both are held as [`Weak`][std::sync::Weak] references. The application keeps them
//! alive for as long as the session exists.

use crate::desc::JsepDescription;
use crate::factory::MediaSessionOptions;
use crate::ice::IceCandidate;

/// What kind of media the application asks for in an offer or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaHints {
    /// Offer or accept audio.
    pub audio: bool,
    /// Offer or accept video.
    pub video: bool,
}

impl Default for MediaHints {
    fn default() -> Self {
        MediaHints {
            audio: true,
            video: true,
        }
    }
}

impl MediaHints {
    /// Hints for the media kinds.
    pub fn new(audio: bool, video: bool) -> Self {
        MediaHints { audio, video }
    }
}

/// Tracks local and remote media streams for the application.
pub trait StreamSignaling: Send + Sync {
    /// The media and streams to put in the next offer or answer.
    fn session_options(&self, hints: &MediaHints) -> MediaSessionOptions;

    /// A new remote description was applied.
    fn update_remote_streams(&self, remote: &JsepDescription);
}

/// Receives local ICE candidates as they are gathered.
pub trait IceObserver: Send + Sync {
    /// A local candidate to send to the remote peer.
    fn on_ice_candidate(&self, candidate: &IceCandidate);

    /// Candidate gathering finished.
    fn on_ice_complete(&self);
}
