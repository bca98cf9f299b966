use std::fmt;

use crate::ice::{Candidate, IceCandidate};
use crate::SessionError;

use super::SessionDescription;

/// The type of a description in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdpType {
    /// `offer`
    Offer,
    /// `pranswer`
    PrAnswer,
    /// `answer`
    Answer,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SdpType::Offer => "offer",
            SdpType::PrAnswer => "pranswer",
            SdpType::Answer => "answer",
        };
        write!(f, "{x}")
    }
}

/// A session description as exchanged between peers.
///
/// Holds the negotiated [`SessionDescription`], the o= line session id and version,
/// and the ICE candidates known for each content section. Once created, only the
/// candidates can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsepDescription {
    sdp_type: SdpType,
    session_id: String,
    session_version: String,
    description: SessionDescription,
    /// One collection per content section, same order as the contents.
    candidates: Vec<Vec<IceCandidate>>,
}

impl JsepDescription {
    /// Wraps a description. The candidate collections start out empty.
    pub fn new(
        sdp_type: SdpType,
        description: SessionDescription,
        session_id: impl Into<String>,
        session_version: impl Into<String>,
    ) -> Self {
        let candidates = vec![vec![]; description.contents.len()];
        JsepDescription {
            sdp_type,
            session_id: session_id.into(),
            session_version: session_version.into(),
            description,
            candidates,
        }
    }

    /// Offer, provisional answer or answer.
    pub fn sdp_type(&self) -> SdpType {
        self.sdp_type
    }

    /// Session id of the o= line.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Session version of the o= line.
    pub fn session_version(&self) -> &str {
        &self.session_version
    }

    /// The negotiated content.
    pub fn description(&self) -> &SessionDescription {
        &self.description
    }

    /// Number of content sections, one candidate collection each.
    pub fn number_of_mediasections(&self) -> usize {
        self.candidates.len()
    }

    /// Candidates for the content section at `mediasection_index`.
    pub fn candidates(&self, mediasection_index: usize) -> &[IceCandidate] {
        self.candidates
            .get(mediasection_index)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of candidates across all content sections.
    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().map(|v| v.len()).sum()
    }

    /// Adds a candidate to the section it targets.
    ///
    /// The section is found by mid first, then by m-line index. Returns `Ok(false)`
    /// when an equivalent candidate is already present.
    pub fn add_candidate(&mut self, candidate: &IceCandidate) -> Result<bool, SessionError> {
        let Some(index) = self.resolve_index(candidate) else {
            return Err(SessionError::CandidateRejected(format!(
                "no media section for mid '{}' index {} (of {})",
                candidate.sdp_mid(),
                candidate.sdp_mline_index(),
                self.candidates.len()
            )));
        };

        if self.contains(index, candidate.candidate()) {
            trace!("Candidate already present: {:?}", candidate.candidate());
            return Ok(false);
        }

        let mut candidate = candidate.clone().with_index(index);
        if candidate.sdp_mid().is_empty() {
            let name = self.description.contents[index].name.clone();
            candidate = IceCandidate::new(name, index, candidate.candidate().clone());
        }

        self.candidates[index].push(candidate);
        Ok(true)
    }

    /// Copy every candidate of `source` that is not already present into this description.
    ///
    /// Sections are matched by position. Sections `source` has beyond our own are skipped.
    pub fn copy_candidates_from(&mut self, source: &JsepDescription) -> usize {
        let mut added = 0;
        for (m, source_candidates) in source.candidates.iter().enumerate() {
            if m >= self.candidates.len() {
                debug!("Skip candidates for media section {} not in target", m);
                break;
            }
            for c in source_candidates {
                if !self.contains(m, c.candidate()) {
                    let name = self.description.contents[m].name.clone();
                    self.candidates[m].push(IceCandidate::new(name, m, c.candidate().clone()));
                    added += 1;
                }
            }
        }
        added
    }

    fn contains(&self, index: usize, candidate: &Candidate) -> bool {
        self.candidates[index]
            .iter()
            .any(|c| c.candidate().is_equivalent(candidate))
    }

    fn resolve_index(&self, candidate: &IceCandidate) -> Option<usize> {
        if !candidate.sdp_mid().is_empty() {
            if let Some(index) = self.description.content_index(candidate.sdp_mid()) {
                return Some(index);
            }
        }
        let index = candidate.sdp_mline_index();
        (index < self.candidates.len()).then_some(index)
    }
}
