//! The transport layer the session drives.
//!
//! The session never touches sockets. It tells a [`Transport`] what to do, and the
//! transport reports back through [`TransportEvent`] fed into
//! [`Session::handle_input()`][crate::Session::handle_input].

use thiserror::Error;

use crate::desc::ContentGroup;
use crate::ice::Candidate;

/// Errors a [`Transport`] reports when it can't use remote candidates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// There is no transport for the content.
    #[error("No transport for content: {0}")]
    UnknownContent(String),

    /// The transport refused the candidate.
    #[error("Unusable candidate: {0}")]
    UnusableCandidate(String),
}

/// Per content transport channels with ICE underneath.
pub trait Transport {
    /// Begin connectivity checks and candidate gathering on every transport channel.
    fn connect_channels(&mut self);

    /// Hand remote candidates to the transport of the named content.
    ///
    /// Errors when the transport doesn't recognize the content or the candidates.
    fn apply_remote_candidates(
        &mut self,
        content_name: &str,
        candidates: &[Candidate],
    ) -> Result<(), TransportError>;

    /// Tear down the transport of the named content. Returns false if there was none.
    fn destroy_transport(&mut self, content_name: &str) -> bool;

    /// Whether content is already multiplexed over one transport.
    fn is_muxed(&self) -> bool;

    /// Multiplex the contents of `group` over the transport of its first content.
    fn enable_muxing(&mut self, group: &ContentGroup) -> bool;

    /// Whether candidate allocation may share one port across bundled content.
    fn set_bundle_allocation(&mut self, enabled: bool);

    /// The session is ready for the transport of the named content to signal candidates.
    fn on_signaling_ready(&mut self, content_name: &str);
}

/// State of a transport as reported with [`TransportEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    /// Content the transport belongs to.
    pub content_name: String,
    /// The transport has at least one channel.
    pub has_channels: bool,
    /// The transport can send.
    pub writable: bool,
}

/// Things a [`Transport`] reports back to the session.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The transport wants to start signaling candidates.
    RequestSignaling {
        /// Content the transport belongs to.
        content_name: String,
    },
    /// A transport channel started connecting.
    Connecting(TransportStatus),
    /// Writability of a transport changed.
    WritableChanged(TransportStatus),
    /// New local candidates were gathered.
    CandidatesReady {
        /// Content the candidates belong to.
        content_name: String,
        /// The gathered candidates.
        candidates: Vec<Candidate>,
    },
    /// Gathering is complete for all transports.
    CandidatesAllocationDone,
}
