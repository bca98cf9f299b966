use std::sync::Weak;
use std::time::Duration;

use crate::channel::{ChannelManager, VideoCodec};
use crate::factory::{DescriptionFactory, MediaSessionDescriptionFactory};
use crate::signaling::StreamSignaling;
use crate::transport::Transport;
use crate::Session;

/// How long the transport may stay unwritable before the session fails.
pub const DEFAULT_CALL_SETUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Customized config for creating a [`Session`] instance.
///
/// ```no_run
/// # use std::sync::Weak;
/// # use std::time::Duration;
/// # use jsep_session::{Session, ChannelManager, Transport, StreamSignaling};
/// # fn f(cm: Box<dyn ChannelManager>, t: Box<dyn Transport>, s: Weak<dyn StreamSignaling>) {
/// let session = Session::builder()
///     .set_call_setup_timeout(Duration::from_secs(10))
///     .build(cm, t, s);
/// # }
/// ```
///
/// Configs implement [`Clone`] to help create multiple `Session` instances.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub(crate) call_setup_timeout: Duration,
    pub(crate) bundle: bool,
    pub(crate) rtcp: bool,
    pub(crate) default_video_codec: VideoCodec,
}

impl SessionConfig {
    /// Creates a new default config.
    pub fn new() -> Self {
        SessionConfig::default()
    }

    /// Time allowed for a connecting transport to become writable.
    pub fn call_setup_timeout(&self) -> Duration {
        self.call_setup_timeout
    }

    /// Set the time allowed for a connecting transport to become writable.
    ///
    /// Defaults to 30 seconds.
    pub fn set_call_setup_timeout(mut self, timeout: Duration) -> Self {
        self.call_setup_timeout = timeout;
        self
    }

    /// Whether offers and answers carry a BUNDLE group.
    pub fn bundle(&self) -> bool {
        self.bundle
    }

    /// Toggle BUNDLE groups in offers and answers.
    ///
    /// Defaults to `true`. When disabled, no BUNDLE group is created even if the
    /// stream signaling asks for one.
    pub fn set_bundle(mut self, enabled: bool) -> Self {
        self.bundle = enabled;
        self
    }

    /// Whether channels are created with RTCP.
    pub fn rtcp(&self) -> bool {
        self.rtcp
    }

    /// Toggle RTCP for created channels. Defaults to `true`.
    pub fn set_rtcp(mut self, enabled: bool) -> Self {
        self.rtcp = enabled;
        self
    }

    /// Video encoder config pushed to the channel manager on initialize.
    pub fn default_video_codec(&self) -> &VideoCodec {
        &self.default_video_codec
    }

    /// Codec pushed to the channel manager as the default encoder config
    /// on [`Session::initialize()`].
    ///
    /// Defaults to VP8 640x480 at 30 fps, payload type 100.
    pub fn set_default_video_codec(mut self, codec: VideoCodec) -> Self {
        self.default_video_codec = codec;
        self
    }

    /// Create a [`Session`] with the default description factory.
    pub fn build(
        self,
        channel_manager: Box<dyn ChannelManager>,
        transport: Box<dyn Transport>,
        stream_signaling: Weak<dyn StreamSignaling>,
    ) -> Session {
        self.build_with_factory(
            channel_manager,
            transport,
            stream_signaling,
            Box::new(MediaSessionDescriptionFactory::new()),
        )
    }

    /// Create a [`Session`] using `factory` for offers and answers.
    pub fn build_with_factory(
        self,
        channel_manager: Box<dyn ChannelManager>,
        transport: Box<dyn Transport>,
        stream_signaling: Weak<dyn StreamSignaling>,
        factory: Box<dyn DescriptionFactory>,
    ) -> Session {
        Session::new_from_config(self, channel_manager, transport, stream_signaling, factory)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            call_setup_timeout: DEFAULT_CALL_SETUP_TIMEOUT,
            bundle: true,
            rtcp: true,
            default_video_codec: VideoCodec::default(),
        }
    }
}
