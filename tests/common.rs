#![allow(unused)]

use std::sync::{Arc, Mutex, MutexGuard, Once, Weak};
use std::time::Instant;

use jsep_session::{Action, Candidate, CaptureDevice, ChannelManager, IceCandidate};
use jsep_session::{DescriptionFactory, IceObserver, MediaChannel, MediaHints, MediaKind};
use jsep_session::{JsepDescription, MediaSessionDescriptionFactory, MediaSessionOptions};
use jsep_session::{Output, SdpType, SecurePolicy, Session, SessionConfig, SessionError};
use jsep_session::{SessionEvent, SessionState, Ssrc, StreamSignaling, Transport};
use jsep_session::{TransportError, TransportEvent, TransportStatus, VideoCodec};

use jsep_session::desc::ContentGroup;

pub fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    static START: Once = Once::new();

    START.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter)
            .init();
    });
}

/// Everything the fakes observed, and knobs to make them fail.
#[derive(Debug, Default)]
pub struct Recorded {
    // channel manager
    pub created: Vec<(MediaKind, String)>,
    pub video_with_voice: Option<bool>,
    pub destroyed: Vec<(MediaKind, String)>,
    pub enabled: Vec<String>,
    pub muted: Vec<(String, bool)>,
    pub playout: Vec<(String, Ssrc, bool)>,
    pub capturer: Vec<Option<String>>,
    pub capture: Vec<bool>,
    pub encoder: Vec<VideoCodec>,
    pub fail_voice: bool,
    pub fail_video: bool,
    pub fail_capturer: bool,

    // transport
    pub connects: usize,
    pub applied: Vec<(String, Candidate)>,
    pub reject_content: Vec<String>,
    pub destroyed_transports: Vec<String>,
    pub muxed: bool,
    pub mux_groups: Vec<Vec<String>>,
    pub bundle_allocation: Vec<bool>,
    pub signaling_ready: Vec<String>,

    // application
    pub remote_updates: usize,
    pub ice_candidates: Vec<IceCandidate>,
    pub ice_complete: usize,
}

pub type Shared = Arc<Mutex<Recorded>>;

pub struct FakeChannel {
    kind: MediaKind,
    name: String,
    enabled: bool,
    rec: Shared,
}

impl MediaChannel for FakeChannel {
    fn content_name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.rec.lock().unwrap().enabled.push(self.name.clone());
        }
    }

    fn mute(&mut self, muted: bool) -> bool {
        self.rec.lock().unwrap().muted.push((self.name.clone(), muted));
        true
    }

    fn set_playout(&mut self, ssrc: Ssrc, enabled: bool) -> bool {
        self.rec
            .lock()
            .unwrap()
            .playout
            .push((self.name.clone(), ssrc, enabled));
        true
    }
}

pub struct FakeChannelManager(pub Shared);

impl FakeChannelManager {
    fn channel(&self, kind: MediaKind, name: &str) -> Box<dyn MediaChannel> {
        self.0
            .lock()
            .unwrap()
            .created
            .push((kind, name.to_string()));
        Box::new(FakeChannel {
            kind,
            name: name.to_string(),
            enabled: false,
            rec: self.0.clone(),
        })
    }
}

impl ChannelManager for FakeChannelManager {
    fn create_voice_channel(&mut self, name: &str, _rtcp: bool) -> Option<Box<dyn MediaChannel>> {
        if self.0.lock().unwrap().fail_voice {
            return None;
        }
        Some(self.channel(MediaKind::Audio, name))
    }

    fn create_video_channel(
        &mut self,
        name: &str,
        _rtcp: bool,
        voice: Option<&dyn MediaChannel>,
    ) -> Option<Box<dyn MediaChannel>> {
        {
            let mut rec = self.0.lock().unwrap();
            rec.video_with_voice = Some(voice.is_some());
            if rec.fail_video {
                return None;
            }
        }
        Some(self.channel(MediaKind::Video, name))
    }

    fn destroy_voice_channel(&mut self, channel: Box<dyn MediaChannel>) {
        let name = channel.content_name().to_string();
        self.0.lock().unwrap().destroyed.push((MediaKind::Audio, name));
    }

    fn destroy_video_channel(&mut self, channel: Box<dyn MediaChannel>) {
        let name = channel.content_name().to_string();
        self.0.lock().unwrap().destroyed.push((MediaKind::Video, name));
    }

    fn set_video_capturer(&mut self, device: Option<&CaptureDevice>) -> bool {
        let mut rec = self.0.lock().unwrap();
        rec.capturer.push(device.map(|d| d.name.clone()));
        !rec.fail_capturer
    }

    fn set_video_capture(&mut self, capture: bool) -> bool {
        self.0.lock().unwrap().capture.push(capture);
        true
    }

    fn set_default_video_encoder_config(&mut self, codec: &VideoCodec) {
        self.0.lock().unwrap().encoder.push(codec.clone());
    }
}

pub struct FakeTransport(pub Shared);

impl Transport for FakeTransport {
    fn connect_channels(&mut self) {
        self.0.lock().unwrap().connects += 1;
    }

    fn apply_remote_candidates(
        &mut self,
        content_name: &str,
        candidates: &[Candidate],
    ) -> Result<(), TransportError> {
        let mut rec = self.0.lock().unwrap();
        if rec.reject_content.iter().any(|n| n == content_name) {
            return Err(TransportError::UnusableCandidate(content_name.into()));
        }
        for c in candidates {
            rec.applied.push((content_name.to_string(), c.clone()));
        }
        Ok(())
    }

    fn destroy_transport(&mut self, content_name: &str) -> bool {
        let mut rec = self.0.lock().unwrap();
        rec.destroyed_transports.push(content_name.to_string());
        rec.created.iter().any(|(_, n)| n == content_name)
    }

    fn is_muxed(&self) -> bool {
        self.0.lock().unwrap().muxed
    }

    fn enable_muxing(&mut self, group: &ContentGroup) -> bool {
        let mut rec = self.0.lock().unwrap();
        rec.mux_groups.push(group.content_names.clone());
        rec.muxed = true;
        true
    }

    fn set_bundle_allocation(&mut self, enabled: bool) {
        self.0.lock().unwrap().bundle_allocation.push(enabled);
    }

    fn on_signaling_ready(&mut self, content_name: &str) {
        self.0
            .lock()
            .unwrap()
            .signaling_ready
            .push(content_name.to_string());
    }
}

pub struct FakeSignaling {
    pub options: Mutex<MediaSessionOptions>,
    rec: Shared,
}

impl StreamSignaling for FakeSignaling {
    fn session_options(&self, hints: &MediaHints) -> MediaSessionOptions {
        let mut options = self.options.lock().unwrap().clone();
        options.has_audio = hints.audio;
        options.has_video = hints.video;
        options.streams.retain(|s| match s.kind {
            MediaKind::Audio => hints.audio,
            MediaKind::Video => hints.video,
        });
        options
    }

    fn update_remote_streams(&self, _remote: &JsepDescription) {
        self.rec.lock().unwrap().remote_updates += 1;
    }
}

pub struct FakeObserver(Shared);

impl IceObserver for FakeObserver {
    fn on_ice_candidate(&self, candidate: &IceCandidate) {
        self.0.lock().unwrap().ice_candidates.push(candidate.clone());
    }

    fn on_ice_complete(&self) {
        self.0.lock().unwrap().ice_complete += 1;
    }
}

/// The local streams every test session sends.
pub fn local_options() -> MediaSessionOptions {
    let mut options = MediaSessionOptions {
        has_audio: true,
        has_video: true,
        ..Default::default()
    };
    options.add_stream(MediaKind::Audio, "audio_track", "local_stream");
    options.add_stream(MediaKind::Video, "video_track", "local_stream");
    options
}

pub struct TestSession {
    pub session: Session,
    pub rec: Shared,
    pub signaling: Arc<FakeSignaling>,
    pub observer: Arc<FakeObserver>,
}

impl TestSession {
    pub fn new(policy: SecurePolicy) -> Self {
        Self::with_config(SessionConfig::new(), policy)
    }

    pub fn with_config(config: SessionConfig, policy: SecurePolicy) -> Self {
        init_log();

        let rec: Shared = Default::default();

        let signaling = Arc::new(FakeSignaling {
            options: Mutex::new(local_options()),
            rec: rec.clone(),
        });
        let observer = Arc::new(FakeObserver(rec.clone()));

        let s: Arc<dyn StreamSignaling> = signaling.clone();
        let o: Arc<dyn IceObserver> = observer.clone();

        let mut session = config.build(
            Box::new(FakeChannelManager(rec.clone())),
            Box::new(FakeTransport(rec.clone())),
            Arc::downgrade(&s),
        );
        session.set_ice_observer(Arc::downgrade(&o));
        session.initialize(policy).unwrap();

        TestSession {
            session,
            rec,
            signaling,
            observer,
        }
    }

    pub fn rec(&self) -> MutexGuard<'_, Recorded> {
        self.rec.lock().unwrap()
    }

    /// Drain all pending events.
    pub fn events(&mut self) -> Vec<SessionEvent> {
        let mut events = vec![];
        while let Output::Event(e) = self.session.poll_output() {
            events.push(e);
        }
        events
    }

    pub fn next_timeout(&mut self) -> Instant {
        loop {
            if let Output::Timeout(t) = self.session.poll_output() {
                return t;
            }
        }
    }

    /// Local offer applied, waiting for the answer.
    pub fn local_offer(&mut self) -> Result<JsepDescription, SessionError> {
        let offer = self.session.create_offer(&MediaHints::default())?;
        self.session
            .set_local_description(Action::Offer, offer.clone())?;
        Ok(offer)
    }

    /// Remote offer applied and answered locally.
    pub fn local_answer(&mut self, action: Action) -> Result<JsepDescription, SessionError> {
        let offer = remote_offer(true, true, true);
        self.session
            .set_remote_description(Action::Offer, offer.clone())?;
        let answer = self.session.create_answer(&MediaHints::default(), &offer)?;
        self.session.set_local_description(action, answer.clone())?;
        Ok(answer)
    }

    pub fn transport(&mut self, now: Instant, event: TransportEvent) {
        self.session
            .handle_input(jsep_session::Input::Transport(now, event));
    }
}

/// A status for transport events.
pub fn status(content_name: &str, writable: bool) -> TransportStatus {
    TransportStatus {
        content_name: content_name.into(),
        has_channels: true,
        writable,
    }
}

fn remote_factory(crypto: bool) -> MediaSessionDescriptionFactory {
    let mut f = MediaSessionDescriptionFactory::new();
    f.set_secure(if crypto {
        SecurePolicy::Required
    } else {
        SecurePolicy::Disabled
    });
    f.set_add_legacy_streams(false);
    f
}

fn remote_options(audio: bool, video: bool) -> MediaSessionOptions {
    let mut options = MediaSessionOptions {
        has_audio: audio,
        has_video: video,
        ..Default::default()
    };
    options.add_stream(MediaKind::Audio, "remote_audio", "remote_stream");
    options.add_stream(MediaKind::Video, "remote_video", "remote_stream");
    options
}

/// An offer as a remote peer would send it.
pub fn remote_offer(crypto: bool, audio: bool, video: bool) -> JsepDescription {
    let desc = remote_factory(crypto)
        .create_offer(&remote_options(audio, video), None)
        .unwrap();
    JsepDescription::new(SdpType::Offer, desc, "4242", "1")
}

/// The remote peer's answer to `offer`.
pub fn remote_answer(
    offer: &JsepDescription,
    sdp_type: SdpType,
    audio: bool,
    video: bool,
) -> JsepDescription {
    let desc = remote_factory(true)
        .create_answer(offer.description(), &remote_options(audio, video), None)
        .unwrap();
    JsepDescription::new(sdp_type, desc, "4242", "2")
}

pub fn host(port: u16) -> Candidate {
    Candidate::host(([192, 168, 1, 2], port).into(), "udp").unwrap()
}

pub fn ice_candidate(mid: &str, index: usize, port: u16) -> IceCandidate {
    IceCandidate::new(mid, index, host(port))
}
