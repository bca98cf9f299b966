use thiserror::Error;

mod candidate;
pub use candidate::{Candidate, CandidateKind, IceCandidate, Protocol};

mod coordinator;
pub(crate) use coordinator::CandidateCoordinator;

mod timer;
pub(crate) use timer::WritableTimer;

/// Errors from candidate handling.
#[derive(Debug, Error)]
pub enum IceError {
    /// A candidate line that doesn't parse.
    #[error("ICE bad candidate: {0}")]
    BadCandidate(String),
}
