//! Session states and the offer/answer transition table.

use std::fmt;

/// State of the offer/answer negotiation.
///
/// ```text
/// offerer:  Init -(local offer)-> SentOffer -(remote answer)-> ReceivedAnswer
/// answerer: Init -(remote offer)-> ReceivedOffer -(local answer)-> SentAnswer
/// ```
///
/// Provisional answers add `SentPrAnswer` / `ReceivedPrAnswer` in between. After an
/// answer either side may start a new offer. No description can be applied in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No description has been applied.
    #[default]
    Init,
    /// A local offer is applied, waiting for the answer.
    SentOffer,
    /// A remote offer is applied, waiting for the local answer.
    ReceivedOffer,
    /// A local provisional answer is applied.
    SentPrAnswer,
    /// A remote provisional answer is applied.
    ReceivedPrAnswer,
    /// A local final answer is applied.
    SentAnswer,
    /// A remote final answer is applied.
    ReceivedAnswer,
    /// Negotiated and the transport is writable.
    InProgress,
    /// The session failed and can't recover.
    ///
    /// Not entered by a transport failure, that is reported with
    /// `SessionEvent::Error` and leaves the state as it was.
    Error,
}

impl SessionState {
    /// All states, in declaration order.
    pub const ALL: [SessionState; 9] = [
        SessionState::Init,
        SessionState::SentOffer,
        SessionState::ReceivedOffer,
        SessionState::SentPrAnswer,
        SessionState::ReceivedPrAnswer,
        SessionState::SentAnswer,
        SessionState::ReceivedAnswer,
        SessionState::InProgress,
        SessionState::Error,
    ];
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SessionState::Init => "init",
            SessionState::SentOffer => "sent-offer",
            SessionState::ReceivedOffer => "received-offer",
            SessionState::SentPrAnswer => "sent-pranswer",
            SessionState::ReceivedPrAnswer => "received-pranswer",
            SessionState::SentAnswer => "sent-answer",
            SessionState::ReceivedAnswer => "received-answer",
            SessionState::InProgress => "in-progress",
            SessionState::Error => "error",
        };
        write!(f, "{x}")
    }
}

/// What a description is, when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// An offer, new or updated.
    Offer,
    /// The final answer to an offer.
    Answer,
    /// A provisional answer, a final one is to follow.
    ProvisionalAnswer,
}

impl Action {
    /// All actions, in declaration order.
    pub const ALL: [Action; 3] = [Action::Offer, Action::Answer, Action::ProvisionalAnswer];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Action::Offer => "offer",
            Action::Answer => "answer",
            Action::ProvisionalAnswer => "pranswer",
        };
        write!(f, "{x}")
    }
}

/// Which side a description belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Created by this session.
    Local,
    /// Received from the remote peer.
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => write!(f, "local"),
            Side::Remote => write!(f, "remote"),
        }
    }
}

use Action::*;
use SessionState::*;

type Transition = (Action, &'static [SessionState], SessionState);

const LOCAL_TRANSITIONS: &[Transition] = &[
    // new offer, update of our own offer, or renegotiation of a running session
    (
        Offer,
        &[Init, SentOffer, ReceivedAnswer, SentAnswer, InProgress],
        SentOffer,
    ),
    // accept remote offer
    (Answer, &[ReceivedOffer, SentPrAnswer], SentAnswer),
    (ProvisionalAnswer, &[ReceivedOffer, SentPrAnswer], SentPrAnswer),
];

const REMOTE_TRANSITIONS: &[Transition] = &[
    (
        Offer,
        &[Init, ReceivedOffer, ReceivedAnswer, SentAnswer, InProgress],
        ReceivedOffer,
    ),
    // accept local offer
    (Answer, &[SentOffer, ReceivedPrAnswer], ReceivedAnswer),
    (ProvisionalAnswer, &[SentOffer, ReceivedPrAnswer], ReceivedPrAnswer),
];

/// Looks up the state reached by applying a description.
///
/// Returns `None` for pairs that are not legal.
pub fn next_state(side: Side, action: Action, current: SessionState) -> Option<SessionState> {
    let table = match side {
        Side::Local => LOCAL_TRANSITIONS,
        Side::Remote => REMOTE_TRANSITIONS,
    };

    table
        .iter()
        .find(|(a, from, _)| *a == action && from.contains(&current))
        .map(|(_, _, next)| *next)
}
