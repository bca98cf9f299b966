use std::time::{Duration, Instant};

use crate::desc::{DescriptionStore, JsepDescription, SessionDescription};
use crate::signaling::IceObserver;
use crate::transport::{Transport, TransportStatus};
use crate::util::Pii;
use crate::SessionError;

use super::{Candidate, IceCandidate, WritableTimer};

/// Coordinates ICE between the descriptions and the transport.
///
/// Starts connectivity checks once, applies remote candidates, routes gathered
/// local candidates and watches over the transport becoming writable.
#[derive(Debug)]
pub(crate) struct CandidateCoordinator {
    /// Set once by [`CandidateCoordinator::start`], never reset.
    ice_started: bool,
    timer: WritableTimer,
}

impl CandidateCoordinator {
    pub fn new(call_setup_timeout: Duration) -> Self {
        CandidateCoordinator {
            ice_started: false,
            timer: WritableTimer::new(call_setup_timeout),
        }
    }

    pub fn ice_started(&self) -> bool {
        self.ice_started
    }

    /// Start connecting all transport channels. Returns false if already started.
    pub fn start(&mut self, transport: &mut dyn Transport) -> bool {
        if self.ice_started {
            return false;
        }
        transport.connect_channels();
        self.ice_started = true;
        true
    }

    /// Both descriptions exist and ICE has started.
    pub fn ready_to_bundle(&self, store: &DescriptionStore) -> bool {
        self.ice_started && store.has_both()
    }

    /// Check every candidate of `desc` targets one of its content sections.
    pub fn check_indices(&self, desc: &JsepDescription) -> Result<(), SessionError> {
        let len = desc.description().contents.len();
        for m in 0..desc.number_of_mediasections() {
            if let Some(c) = desc.candidates(m).iter().find(|c| c.sdp_mline_index() >= len) {
                return Err(SessionError::InvalidCandidateIndex(c.sdp_mline_index(), len));
            }
        }
        Ok(())
    }

    /// Hand every candidate of the remote description to the transport.
    pub fn apply(
        &self,
        transport: &mut dyn Transport,
        remote: &JsepDescription,
    ) -> Result<(), SessionError> {
        let all = (0..remote.number_of_mediasections()).flat_map(|m| remote.candidates(m));
        self.apply_candidates(transport, remote.description(), all)
    }

    /// Hand candidates to the transport of the content they target in `remote`.
    ///
    /// Fails on the first candidate whose m-line index is outside the description.
    /// The transport refusing a candidate is only logged.
    pub fn apply_candidates<'a>(
        &self,
        transport: &mut dyn Transport,
        remote: &SessionDescription,
        candidates: impl IntoIterator<Item = &'a IceCandidate>,
    ) -> Result<(), SessionError> {
        let contents = &remote.contents;

        for c in candidates {
            let index = c.sdp_mline_index();
            let Some(content) = contents.get(index) else {
                error!("Invalid candidate media index: {}", index);
                return Err(SessionError::InvalidCandidateIndex(index, contents.len()));
            };

            let candidate = [c.candidate().clone()];
            if let Err(e) = transport.apply_remote_candidates(&content.name, &candidate) {
                warn!(
                    "Failed to use candidate {} for {}: {}",
                    Pii(c.candidate().addr()),
                    content.name,
                    e
                );
            }
        }

        Ok(())
    }

    /// Route freshly gathered local candidates to the observer and the local description.
    pub fn on_new_local_candidates(
        &self,
        store: &mut DescriptionStore,
        observer: Option<&dyn IceObserver>,
        content_name: &str,
        candidates: Vec<Candidate>,
    ) {
        let index = store
            .local()
            .and_then(|l| l.description().content_index(content_name));

        let Some(index) = index else {
            error!("Local candidates for unknown content: {}", content_name);
            return;
        };

        for candidate in candidates {
            let candidate = IceCandidate::new(content_name, index, candidate);

            if let Some(observer) = observer {
                observer.on_ice_candidate(&candidate);
            }

            if let Some(local) = store.local_mut() {
                // The index was just resolved against this description.
                if let Err(e) = local.add_candidate(&candidate) {
                    debug!("Local candidate not added: {}", e);
                }
            }
        }
    }

    /// Follow the transport status, arming the timer while it can't write.
    pub fn update_writable(&mut self, now: Instant, status: &TransportStatus) {
        // Start afresh from every report.
        self.timer.clear();

        if status.has_channels && !status.writable {
            self.timer.arm(now);
        }
    }

    pub fn poll_timeout(&self) -> Option<Instant> {
        self.timer.poll_timeout()
    }

    /// True once when the transport failed to become writable in time.
    pub fn handle_timeout(&mut self, now: Instant) -> bool {
        self.timer.handle_timeout(now)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;
    use crate::desc::{ContentGroup, ContentInfo, MediaContent, MediaKind};
    use crate::desc::SdpType;
    use crate::transport::TransportError;

    #[derive(Default)]
    struct FakeTransport {
        connects: usize,
        applied: Vec<(String, Candidate)>,
        unknown: Vec<String>,
    }

    impl Transport for FakeTransport {
        fn connect_channels(&mut self) {
            self.connects += 1;
        }

        fn apply_remote_candidates(
            &mut self,
            content_name: &str,
            candidates: &[Candidate],
        ) -> Result<(), TransportError> {
            if self.unknown.iter().any(|n| n == content_name) {
                return Err(TransportError::UnknownContent(content_name.into()));
            }
            for c in candidates {
                self.applied.push((content_name.to_string(), c.clone()));
            }
            Ok(())
        }

        fn destroy_transport(&mut self, _: &str) -> bool {
            true
        }

        fn is_muxed(&self) -> bool {
            false
        }

        fn enable_muxing(&mut self, _: &ContentGroup) -> bool {
            true
        }

        fn set_bundle_allocation(&mut self, _: bool) {}

        fn on_signaling_ready(&mut self, _: &str) {}
    }

    #[derive(Default)]
    struct FakeObserver(Mutex<Vec<IceCandidate>>);

    impl IceObserver for FakeObserver {
        fn on_ice_candidate(&self, candidate: &IceCandidate) {
            self.0.lock().unwrap().push(candidate.clone());
        }

        fn on_ice_complete(&self) {}
    }

    fn desc(sdp_type: SdpType) -> JsepDescription {
        let d = SessionDescription::new()
            .with_content(ContentInfo::new("audio", MediaContent::new(MediaKind::Audio)))
            .with_content(ContentInfo::new("video", MediaContent::new(MediaKind::Video)));
        JsepDescription::new(sdp_type, d, "1", "1")
    }

    fn host(port: u16) -> Candidate {
        Candidate::host(([10, 0, 0, 1], port).into(), "udp").unwrap()
    }

    #[test]
    fn start_once() {
        let mut t = FakeTransport::default();
        let mut c = CandidateCoordinator::new(Duration::from_secs(30));

        assert!(c.start(&mut t));
        assert!(!c.start(&mut t));
        assert!(c.ice_started());
        assert_eq!(t.connects, 1);
    }

    #[test]
    fn ready_to_bundle_needs_both_and_started() {
        let mut t = FakeTransport::default();
        let mut c = CandidateCoordinator::new(Duration::from_secs(30));
        let mut store = DescriptionStore::default();

        store.set_local(desc(SdpType::Offer));
        store.set_remote(desc(SdpType::Answer));
        assert!(!c.ready_to_bundle(&store));

        c.start(&mut t);
        assert!(c.ready_to_bundle(&store));
    }

    #[test]
    fn apply_tolerates_unknown_transport() {
        let mut t = FakeTransport {
            unknown: vec!["audio".into()],
            ..Default::default()
        };
        let c = CandidateCoordinator::new(Duration::from_secs(30));

        let mut remote = desc(SdpType::Offer);
        remote
            .add_candidate(&IceCandidate::new("audio", 0, host(1000)))
            .unwrap();
        remote
            .add_candidate(&IceCandidate::new("video", 1, host(1002)))
            .unwrap();

        c.apply(&mut t, &remote).unwrap();
        assert_eq!(t.applied.len(), 1);
        assert_eq!(t.applied[0].0, "video");
    }

    #[test]
    fn apply_fails_on_index_out_of_range() {
        let mut t = FakeTransport::default();
        let c = CandidateCoordinator::new(Duration::from_secs(30));
        let remote = desc(SdpType::Offer);

        let stray = IceCandidate::new("data", 2, host(1004));
        let err = c
            .apply_candidates(&mut t, remote.description(), [&stray])
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidCandidateIndex(2, 2)));
        assert!(t.applied.is_empty());
    }

    #[test]
    fn check_indices_accepts_normalized() {
        let c = CandidateCoordinator::new(Duration::from_secs(30));
        let mut remote = desc(SdpType::Offer);
        remote
            .add_candidate(&IceCandidate::new("video", 7, host(1002)))
            .unwrap();
        assert!(c.check_indices(&remote).is_ok());
    }

    #[test]
    fn local_candidates_reach_observer_and_description() {
        let c = CandidateCoordinator::new(Duration::from_secs(30));
        let observer = FakeObserver::default();
        let mut store = DescriptionStore::default();
        store.set_local(desc(SdpType::Offer));

        c.on_new_local_candidates(&mut store, Some(&observer), "video", vec![host(2000)]);

        let seen = observer.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].sdp_mline_index(), 1);
        assert_eq!(store.local().unwrap().candidates(1).len(), 1);
    }

    #[test]
    fn local_candidates_for_unknown_content_dropped() {
        let c = CandidateCoordinator::new(Duration::from_secs(30));
        let observer = FakeObserver::default();
        let mut store = DescriptionStore::default();
        store.set_local(desc(SdpType::Offer));

        c.on_new_local_candidates(&mut store, Some(&observer), "data", vec![host(2000)]);

        assert!(observer.0.lock().unwrap().is_empty());
        assert_eq!(store.local().unwrap().candidate_count(), 0);
    }

    #[test]
    fn writable_timer_follows_status() {
        let now = Instant::now();
        let mut c = CandidateCoordinator::new(Duration::from_secs(30));

        let mut status = TransportStatus {
            content_name: "audio".into(),
            has_channels: true,
            writable: false,
        };
        c.update_writable(now, &status);
        assert_eq!(c.poll_timeout(), Some(now + Duration::from_secs(30)));

        status.writable = true;
        c.update_writable(now + Duration::from_secs(1), &status);
        assert_eq!(c.poll_timeout(), None);
    }
}
