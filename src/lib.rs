//! JSEP offer/answer session negotiation in Rust.
//!
//! This is a [Sans I/O][sansio] implementation of the signaling half of a WebRTC
//! session. The [`Session`] negotiates session descriptions with a remote peer,
//! creates and destroys the media channels the negotiated content needs, and
//! coordinates ICE candidates between the descriptions and the transport. It has
//! no internal threads or timers and never reads the clock. Everything happens from
//! the calls of the public API.
//!
//! The session owns its collaborators through traits:
//!
//! * [`ChannelManager`] creates the voice and video [`MediaChannel`]s.
//! * [`Transport`] carries the ICE transports and reports back with [`TransportEvent`].
//! * [`DescriptionFactory`] produces offers and answers. The default is
//!   [`MediaSessionDescriptionFactory`].
//!
//! The application is reached through [`StreamSignaling`] and [`IceObserver`], held
//! as [`Weak`] references that must stay alive as long as the session.
//!
//! # Offerer
//!
//! ```text
//! session.initialize(SecurePolicy::Required)?;
//! let offer = session.create_offer(&MediaHints::default())?;
//! session.set_local_description(Action::Offer, offer.clone())?;
//! session.start_ice()?;
//! // send offer to the remote peer, receive answer
//! session.set_remote_description(Action::Answer, answer)?;
//! ```
//!
//! # Answerer
//!
//! ```text
//! session.set_remote_description(Action::Offer, offer)?;
//! let answer = session.create_answer(&MediaHints::default(), &offer)?;
//! session.set_local_description(Action::Answer, answer)?;
//! ```
//!
//! # Run loop
//!
//! ```text
//! loop {
//!     let timeout = match session.poll_output() {
//!         Output::Timeout(t) => t,
//!         Output::Event(e) => { /* handle event */ continue; }
//!     };
//!
//!     let input: Input = todo!(); // wait for a transport event or the timeout.
//!     session.handle_input(input);
//! }
//! ```
//!
//! [sansio]: https://sans-io.readthedocs.io

#![forbid(unsafe_code)]
#![allow(clippy::new_without_default)]
#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use thiserror::Error;

mod util;
use util::{not_happening, random_numeric_id};

mod state;
pub use state::{next_state, Action, SessionState, Side};

pub mod desc;
use desc::{DescriptionStore, GROUP_TYPE_BUNDLE};
pub use desc::{JsepDescription, MediaKind, SdpType, SessionDescription, Ssrc};

mod ice;
use ice::CandidateCoordinator;
pub use ice::{Candidate, CandidateKind, IceCandidate, IceError, Protocol};

mod channel;
use channel::ChannelLifecycle;
pub use channel::{CaptureDevice, ChannelManager, MediaChannel, VideoCodec};

mod bundle;
use bundle::BundleNegotiator;

mod transport;
pub use transport::{Transport, TransportError, TransportEvent, TransportStatus};

mod factory;
pub use factory::{DescriptionFactory, MediaSessionDescriptionFactory};
pub use factory::{MediaSessionOptions, MediaStreamOption, SecurePolicy};

mod signaling;
pub use signaling::{IceObserver, MediaHints, StreamSignaling};

mod config;
pub use config::{SessionConfig, DEFAULT_CALL_SETUP_TIMEOUT};

/// Errors for the whole session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The requested streams use the same name more than once.
    #[error("Invalid streams, duplicate name: {0}")]
    InvalidStreams(String),

    /// The operation is not allowed in the current state.
    #[error("{0} not allowed in state {1}")]
    IllegalState(String, SessionState),

    /// A description without content, or the factory produced none.
    #[error("Missing description: {0}")]
    MissingDescription(String),

    /// Crypto is required but a content section has none.
    #[error("{0} description without crypto while crypto is required")]
    SecurityPolicyViolation(Side),

    /// The channel manager failed to create a channel.
    #[error("Failed to create {0} channel")]
    ChannelCreationFailed(MediaKind),

    /// A candidate targets a content section the description doesn't have.
    #[error("Candidate m-line index {0} out of range for {1} contents")]
    InvalidCandidateIndex(usize, usize),

    /// A candidate that can't be added to a description.
    #[error("Candidate rejected: {0}")]
    CandidateRejected(String),

    /// Something that must happen first hasn't.
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    /// No stream with the name in the relevant description.
    #[error("No {kind} stream named: {name}")]
    StreamNotFound {
        /// The kind of media looked in.
        kind: MediaKind,
        /// The stream name looked for.
        name: String,
    },

    /// No channel for the media kind.
    #[error("No {0} channel")]
    NoChannel(MediaKind),

    /// Failed to set or start the capture device.
    #[error("Capture device: {0}")]
    Capture(String),

    /// Candidate parsing errors.
    #[error("{0}")]
    Ice(#[from] IceError),
}

/// Events produced by [`Session::poll_output()`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionEvent {
    /// The session entered a new state.
    StateChange(SessionState),

    /// The session failed and won't recover on its own.
    Error(SessionFailure),
}

/// Reason for a [`SessionEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionFailure {
    /// A connecting transport did not become writable within the call setup timeout.
    TransportNotWritable,
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionFailure::TransportNotWritable => write!(f, "transport not writable"),
        }
    }
}

/// Input as expected by [`Session::handle_input()`]. Either a transport event or a timeout.
#[derive(Debug)]
pub enum Input {
    /// A timeout without any transport event.
    Timeout(Instant),
    /// Something reported by the [`Transport`].
    Transport(Instant, TransportEvent),
}

/// Output produced by [`Session::poll_output()`].
#[derive(Debug)]
pub enum Output {
    /// When the [`Session`] instance expects an [`Input::Timeout`].
    Timeout(Instant),

    /// Something the application should know about.
    Event(SessionEvent),
}

/// Instance that does the offer/answer negotiation.
///
/// All calls happen on one thread of control, the "signaling context". The
/// collaborators are owned or weakly referenced, see the crate docs.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    session_id: String,
    /// Last allocated o= line version. Only ever increments.
    session_version: u64,
    factory: Box<dyn DescriptionFactory>,
    channel_manager: Box<dyn ChannelManager>,
    transport: Box<dyn Transport>,
    stream_signaling: Weak<dyn StreamSignaling>,
    ice_observer: Option<Weak<dyn IceObserver>>,
    store: DescriptionStore,
    channels: ChannelLifecycle,
    coordinator: CandidateCoordinator,
    bundle: BundleNegotiator,
    events: VecDeque<SessionEvent>,
}

impl Session {
    /// Creates a config builder that configures a [`Session`] instance.
    ///
    /// ```no_run
    /// # use std::sync::Weak;
    /// # use jsep_session::{Session, ChannelManager, Transport, StreamSignaling};
    /// # fn f(cm: Box<dyn ChannelManager>, t: Box<dyn Transport>, s: Weak<dyn StreamSignaling>) {
    /// let session = Session::builder()
    ///     .set_bundle(false)
    ///     .build(cm, t, s);
    /// # }
    /// ```
    pub fn builder() -> SessionConfig {
        SessionConfig::new()
    }

    pub(crate) fn new_from_config(
        config: SessionConfig,
        channel_manager: Box<dyn ChannelManager>,
        transport: Box<dyn Transport>,
        stream_signaling: Weak<dyn StreamSignaling>,
        factory: Box<dyn DescriptionFactory>,
    ) -> Self {
        let coordinator = CandidateCoordinator::new(config.call_setup_timeout);
        let session_id = random_numeric_id();
        debug!("New session: {}", session_id);

        Session {
            config,
            state: SessionState::Init,
            session_id,
            session_version: 0,
            factory,
            channel_manager,
            transport,
            stream_signaling,
            ice_observer: None,
            store: DescriptionStore::default(),
            channels: ChannelLifecycle::default(),
            coordinator,
            bundle: BundleNegotiator,
            events: VecDeque::new(),
        }
    }

    /// Apply the security policy and push defaults to the collaborators.
    ///
    /// Must be called before negotiating. Offers and answers only carry the
    /// streams that are negotiated, no default streams.
    pub fn initialize(&mut self, policy: SecurePolicy) -> Result<(), SessionError> {
        if self.state != SessionState::Init {
            error!("Initialize called in state: {}", self.state);
            return Err(SessionError::IllegalState(
                "initialize".into(),
                self.state,
            ));
        }

        self.factory.set_secure(policy);
        self.factory.set_add_legacy_streams(false);
        self.channel_manager
            .set_default_video_encoder_config(&self.config.default_video_codec);

        info!("Session {} initialized, secure: {:?}", self.session_id, policy);
        Ok(())
    }

    /// Set the observer of local ICE candidates.
    ///
    /// The observer must outlive the session.
    pub fn set_ice_observer(&mut self, observer: Weak<dyn IceObserver>) {
        self.ice_observer = Some(observer);
    }

    /// Current negotiation state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The o= line session id. Stable for the life of the session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The version of the last created offer or answer. 0 before the first.
    pub fn session_version(&self) -> u64 {
        self.session_version
    }

    /// The current local description.
    pub fn local_description(&self) -> Option<&JsepDescription> {
        self.store.local()
    }

    /// The current remote description.
    pub fn remote_description(&self) -> Option<&JsepDescription> {
        self.store.remote()
    }

    /// Remote candidates waiting for a remote description.
    pub fn saved_candidates(&self) -> &[IceCandidate] {
        self.store.saved_candidates()
    }

    /// Whether ICE has been started by [`Session::start_ice()`].
    pub fn ice_started(&self) -> bool {
        self.coordinator.ice_started()
    }

    /// Whether there is a channel for the media kind.
    pub fn has_channel(&self, kind: MediaKind) -> bool {
        self.channels.has(kind)
    }

    /// Create an offer for the media the stream signaling wants.
    ///
    /// Every call allocates a new version, also when the offer is later thrown away.
    /// Candidates already gathered for the local description are carried over.
    pub fn create_offer(&mut self, hints: &MediaHints) -> Result<JsepDescription, SessionError> {
        let options = self.session_options(hints)?;

        let desc = self
            .factory
            .create_offer(&options, self.store.local().map(|l| l.description()));

        self.jsep_description(SdpType::Offer, desc)
    }

    /// Create an answer to `offer` for the media the stream signaling wants.
    ///
    /// Allocates a version and carries over candidates like [`Session::create_offer()`].
    pub fn create_answer(
        &mut self,
        hints: &MediaHints,
        offer: &JsepDescription,
    ) -> Result<JsepDescription, SessionError> {
        let options = self.session_options(hints)?;

        let desc = self.factory.create_answer(
            offer.description(),
            &options,
            self.store.local().map(|l| l.description()),
        );

        self.jsep_description(SdpType::Answer, desc)
    }

    fn session_options(&self, hints: &MediaHints) -> Result<MediaSessionOptions, SessionError> {
        let signaling = self.stream_signaling()?;
        let mut options = signaling.session_options(hints);
        options.bundle_enabled &= self.config.bundle;

        if let Some(name) = options.duplicate_stream_name() {
            error!("Invalid media streams, duplicate name: {}", name);
            return Err(SessionError::InvalidStreams(name.to_string()));
        }

        Ok(options)
    }

    fn jsep_description(
        &mut self,
        sdp_type: SdpType,
        desc: Option<SessionDescription>,
    ) -> Result<JsepDescription, SessionError> {
        // The version is spent even if there is no description to carry it.
        let version = self.next_version();

        let Some(desc) = desc else {
            error!("Description factory failed to create {}", sdp_type);
            return Err(SessionError::MissingDescription(format!(
                "factory created no {sdp_type}"
            )));
        };

        let mut jsep = JsepDescription::new(sdp_type, desc, &self.session_id, version.to_string());

        if let Some(local) = self.store.local() {
            let n = jsep.copy_candidates_from(local);
            trace!("Carried {} local candidates into {}", n, sdp_type);
        }

        debug!("Created {} version {}", sdp_type, version);
        Ok(jsep)
    }

    fn next_version(&mut self) -> u64 {
        self.session_version += 1;
        self.session_version
    }

    /// Apply a local offer, answer or provisional answer.
    ///
    /// On failure the description is dropped and the state is unchanged. A channel
    /// created before a failing channel creation is kept.
    pub fn set_local_description(
        &mut self,
        action: Action,
        desc: JsepDescription,
    ) -> Result<(), SessionError> {
        let next = self.expect_transition(Side::Local, action)?;
        self.validate(Side::Local, &desc)?;

        self.channels.ensure_channels(
            &mut *self.channel_manager,
            desc.description(),
            self.config.rtcp,
        )?;

        if !desc.description().has_group(GROUP_TYPE_BUNDLE) {
            self.transport.set_bundle_allocation(false);
        }

        self.store.set_local(desc);

        match action {
            Action::Offer => {}
            Action::Answer => {
                self.prune_channels(Side::Local);
                self.maybe_enable_bundle();
                self.channels.enable_all();
            }
            Action::ProvisionalAnswer => self.channels.enable_all(),
        }

        self.set_state(next);
        Ok(())
    }

    /// Apply a remote offer, answer or provisional answer.
    ///
    /// Candidates received before there was any remote description are added to it.
    /// When ICE has started, the candidates of the description are handed to the
    /// transport, and a candidate for a content section the description doesn't
    /// have fails the whole call.
    pub fn set_remote_description(
        &mut self,
        action: Action,
        mut desc: JsepDescription,
    ) -> Result<(), SessionError> {
        let next = self.expect_transition(Side::Remote, action)?;
        self.validate(Side::Remote, &desc)?;
        let signaling = self.stream_signaling()?;

        for saved in self.store.saved_candidates() {
            if let Err(e) = desc.add_candidate(saved) {
                warn!("Dropping saved candidate: {}", e);
            }
        }

        let ice_started = self.coordinator.ice_started();
        if ice_started {
            if let Err(e) = self.coordinator.check_indices(&desc) {
                error!("Remote {} contains invalid candidates: {}", action, e);
                return Err(e);
            }
        }

        self.channels.ensure_channels(
            &mut *self.channel_manager,
            desc.description(),
            self.config.rtcp,
        )?;

        // Only the candidates of the new description are handed to the transport,
        // the ones carried over from the previous description already were.
        let fresh: Vec<IceCandidate> = if ice_started {
            (0..desc.number_of_mediasections())
                .flat_map(|m| desc.candidates(m).iter().cloned())
                .collect()
        } else {
            vec![]
        };

        if let Some(previous) = self.store.remote() {
            desc.copy_candidates_from(previous);
        }

        let flushed = self.store.take_saved_candidates().len();
        if flushed > 0 {
            debug!("Flushed {} saved candidates into remote {}", flushed, action);
        }

        self.store.set_remote(desc);

        match action {
            Action::Offer => {}
            Action::Answer => {
                self.prune_channels(Side::Remote);
                self.maybe_enable_bundle();
                self.channels.enable_all();
            }
            Action::ProvisionalAnswer => self.channels.enable_all(),
        }

        self.set_state(next);

        if let Some(remote) = self.store.remote() {
            signaling.update_remote_streams(remote);

            if ice_started {
                self.coordinator
                    .apply_candidates(&mut *self.transport, remote.description(), &fresh)?;
            }
        }

        Ok(())
    }

    /// Take a remote candidate.
    ///
    /// Before there is a remote description, the candidate is saved for later.
    pub fn process_ice_message(&mut self, candidate: IceCandidate) -> Result<(), SessionError> {
        let Some(remote) = self.store.remote_mut() else {
            info!("Remote description not set, save the candidate for later use");
            self.store.save_candidate(candidate);
            return Ok(());
        };

        if let Err(e) = remote.add_candidate(&candidate) {
            error!("Candidate can't be used: {}", e);
            return Err(e);
        }

        if self.coordinator.ice_started() {
            if let Some(remote) = self.store.remote() {
                self.coordinator.apply(&mut *self.transport, remote)?;
            }
        }

        Ok(())
    }

    /// Start ICE on all transports.
    ///
    /// Needs a local description. Calling it again is a no-op.
    pub fn start_ice(&mut self) -> Result<(), SessionError> {
        if self.store.local().is_none() {
            error!("start_ice called before set_local_description");
            return Err(SessionError::PreconditionNotMet(
                "start_ice needs a local description".into(),
            ));
        }

        if !self.coordinator.start(&mut *self.transport) {
            return Ok(());
        }

        info!("ICE started for session {}", self.session_id);

        self.maybe_enable_bundle();

        if let Some(remote) = self.store.remote() {
            if let Err(e) = self.coordinator.apply(&mut *self.transport, remote) {
                warn!("Can't use candidates in remote description: {}", e);
            }
        }

        Ok(())
    }

    /// Turn playout of the named remote audio stream on or off.
    pub fn set_audio_playout(&mut self, name: &str, enable: bool) -> Result<(), SessionError> {
        let channel = self
            .channels
            .get_mut(MediaKind::Audio)
            .ok_or(SessionError::NoChannel(MediaKind::Audio))?;
        let ssrc = ssrc_by_name(self.store.remote(), MediaKind::Audio, name)?;

        if !channel.set_playout(ssrc, enable) {
            warn!("Failed to set audio playout for {}", name);
        }
        Ok(())
    }

    /// Start or stop sending the named local audio stream.
    pub fn set_audio_send(&mut self, name: &str, enable: bool) -> Result<(), SessionError> {
        let channel = self
            .channels
            .get_mut(MediaKind::Audio)
            .ok_or(SessionError::NoChannel(MediaKind::Audio))?;
        ssrc_by_name(self.store.local(), MediaKind::Audio, name)?;

        // TODO: mute per SSRC once channels carry more than one sending track.
        if !channel.mute(!enable) {
            warn!("Failed to set audio send for {}", name);
        }
        Ok(())
    }

    /// Turn playout of the named remote video stream on or off.
    ///
    /// Disabling a stream that isn't in the remote description is fine.
    pub fn set_video_playout(&mut self, name: &str, enable: bool) -> Result<(), SessionError> {
        let channel = self
            .channels
            .get_mut(MediaKind::Video)
            .ok_or(SessionError::NoChannel(MediaKind::Video))?;

        match ssrc_by_name(self.store.remote(), MediaKind::Video, name) {
            Ok(ssrc) => {
                if !channel.set_playout(ssrc, enable) {
                    warn!("Failed to set video playout for {}", name);
                }
                Ok(())
            }
            Err(_) if !enable => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Start or stop sending the named local video stream.
    pub fn set_video_send(&mut self, name: &str, enable: bool) -> Result<(), SessionError> {
        let channel = self
            .channels
            .get_mut(MediaKind::Video)
            .ok_or(SessionError::NoChannel(MediaKind::Video))?;
        ssrc_by_name(self.store.local(), MediaKind::Video, name)?;

        if !channel.mute(!enable) {
            warn!("Failed to set video send for {}", name);
        }
        Ok(())
    }

    /// Use `device` as the source of the named local video stream.
    ///
    /// `None` stops capturing, and then the name doesn't need to exist.
    pub fn set_capture_device(
        &mut self,
        name: &str,
        device: Option<CaptureDevice>,
    ) -> Result<(), SessionError> {
        let found = ssrc_by_name(self.store.local(), MediaKind::Video, name);
        if let (Err(e), Some(_)) = (found, &device) {
            error!("Trying to set capture device on unknown stream: {}", name);
            return Err(e);
        }

        if !self.channel_manager.set_video_capturer(device.as_ref()) {
            return Err(SessionError::Capture("failed to set capture device".into()));
        }

        if !self.channel_manager.set_video_capture(device.is_some()) {
            return Err(SessionError::Capture("failed to start capture".into()));
        }

        Ok(())
    }

    /// Input to the session, either a transport event or a timeout.
    ///
    /// ```text
    /// loop {
    ///     let timeout: Instant = todo!(); // session.poll_output() until we get a timeout.
    ///
    ///     let input: Input = todo!(); // wait for a transport event or the timeout.
    ///     session.handle_input(input);
    /// }
    /// ```
    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Timeout(now) => self.handle_timeout(now),
            Input::Transport(now, event) => {
                self.handle_transport(now, event);
                self.handle_timeout(now);
            }
        }
    }

    /// Poll the session for output.
    ///
    /// Drain events first. Once there are none, the next timeout is returned.
    pub fn poll_output(&mut self) -> Output {
        if let Some(event) = self.events.pop_front() {
            return Output::Event(event);
        }

        let timeout = self.coordinator.poll_timeout().unwrap_or_else(not_happening);
        Output::Timeout(timeout)
    }

    fn handle_timeout(&mut self, now: Instant) {
        if !self.coordinator.handle_timeout(now) {
            return;
        }

        // The state is left alone, the caller renegotiates or tears down.
        error!("Transport is not in writable state");
        self.events
            .push_back(SessionEvent::Error(SessionFailure::TransportNotWritable));
    }

    fn handle_transport(&mut self, now: Instant, event: TransportEvent) {
        match event {
            TransportEvent::RequestSignaling { content_name } => {
                self.transport.on_signaling_ready(&content_name);
            }
            TransportEvent::Connecting(status) | TransportEvent::WritableChanged(status) => {
                self.coordinator.update_writable(now, &status);

                let answered = matches!(
                    self.state,
                    SessionState::SentAnswer | SessionState::ReceivedAnswer
                );
                if status.writable && answered {
                    self.set_state(SessionState::InProgress);
                }
            }
            TransportEvent::CandidatesReady {
                content_name,
                candidates,
            } => {
                let observer = self.ice_observer();
                self.coordinator.on_new_local_candidates(
                    &mut self.store,
                    observer.as_deref(),
                    &content_name,
                    candidates,
                );
            }
            TransportEvent::CandidatesAllocationDone => {
                if let Some(observer) = self.ice_observer() {
                    observer.on_ice_complete();
                }
            }
        }
    }

    fn expect_transition(&self, side: Side, action: Action) -> Result<SessionState, SessionError> {
        let Some(next) = next_state(side, action, self.state) else {
            error!(
                "Set {} description called with action in wrong state, action: {} state: {}",
                side, action, self.state
            );
            return Err(SessionError::IllegalState(
                format!("{side} {action}"),
                self.state,
            ));
        };
        Ok(next)
    }

    fn validate(&self, side: Side, desc: &JsepDescription) -> Result<(), SessionError> {
        if desc.description().contents.is_empty() {
            error!("Set {} description called without content", side);
            return Err(SessionError::MissingDescription(format!(
                "{side} {} has no content",
                desc.sdp_type()
            )));
        }

        if self.factory.secure() == SecurePolicy::Required && !desc.description().has_crypto() {
            error!("Set {} description without crypto enabled", side);
            return Err(SessionError::SecurityPolicyViolation(side));
        }

        Ok(())
    }

    fn prune_channels(&mut self, side: Side) {
        let answer = match side {
            Side::Local => self.store.local(),
            Side::Remote => self.store.remote(),
        };

        if let Some(answer) = answer {
            self.channels.prune(
                &mut *self.channel_manager,
                &mut *self.transport,
                answer.description(),
            );
        }
    }

    fn maybe_enable_bundle(&mut self) -> bool {
        let ready = self.coordinator.ready_to_bundle(&self.store);
        self.bundle
            .maybe_enable(ready, &mut *self.transport, &self.store)
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        debug!("Session state change: {} -> {}", self.state, state);
        self.state = state;
        self.events.push_back(SessionEvent::StateChange(state));
    }

    fn stream_signaling(&self) -> Result<Arc<dyn StreamSignaling>, SessionError> {
        self.stream_signaling
            .upgrade()
            .ok_or_else(|| SessionError::PreconditionNotMet("stream signaling dropped".into()))
    }

    fn ice_observer(&self) -> Option<Arc<dyn IceObserver>> {
        self.ice_observer.as_ref().and_then(|o| o.upgrade())
    }
}

fn ssrc_by_name(
    desc: Option<&JsepDescription>,
    kind: MediaKind,
    name: &str,
) -> Result<Ssrc, SessionError> {
    desc.and_then(|d| d.description().first_content(kind))
        .and_then(|c| c.media.stream_by_name(name))
        .and_then(|s| s.first_ssrc())
        .ok_or_else(|| SessionError::StreamNotFound {
            kind,
            name: name.to_string(),
        })
}

impl Drop for Session {
    fn drop(&mut self) {
        self.channels.release_all(&mut *self.channel_manager);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("session_version", &self.session_version)
            .field("ice_started", &self.coordinator.ice_started())
            .field("channels", &self.channels)
            .finish()
    }
}
