use crate::ice::IceCandidate;

use super::JsepDescription;

/// Current local and remote descriptions, and remote candidates that
/// arrived before there was a remote description to put them in.
#[derive(Debug, Default)]
pub(crate) struct DescriptionStore {
    local: Option<JsepDescription>,
    remote: Option<JsepDescription>,
    saved_candidates: Vec<IceCandidate>,
}

impl DescriptionStore {
    pub fn local(&self) -> Option<&JsepDescription> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&JsepDescription> {
        self.remote.as_ref()
    }

    pub fn local_mut(&mut self) -> Option<&mut JsepDescription> {
        self.local.as_mut()
    }

    pub fn remote_mut(&mut self) -> Option<&mut JsepDescription> {
        self.remote.as_mut()
    }

    /// Replace the local description, the previous one is dropped.
    pub fn set_local(&mut self, desc: JsepDescription) {
        self.local = Some(desc);
    }

    /// Replace the remote description, the previous one is dropped.
    pub fn set_remote(&mut self, desc: JsepDescription) {
        self.remote = Some(desc);
    }

    pub fn has_both(&self) -> bool {
        self.local.is_some() && self.remote.is_some()
    }

    pub fn save_candidate(&mut self, candidate: IceCandidate) {
        self.saved_candidates.push(candidate);
    }

    pub fn saved_candidates(&self) -> &[IceCandidate] {
        &self.saved_candidates
    }

    /// Hands over the saved candidates, leaving the queue empty.
    pub fn take_saved_candidates(&mut self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.saved_candidates)
    }
}
