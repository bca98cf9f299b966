//! Voice and video channels backing negotiated content.

use std::fmt;

use crate::desc::{MediaKind, SessionDescription, Ssrc};
use crate::transport::Transport;
use crate::SessionError;

/// A video codec as used for the default encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCodec {
    /// RTP payload type.
    pub id: u8,
    /// Codec name, i.e. `VP8`.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frames per second.
    pub framerate: u32,
}

impl VideoCodec {
    /// Codec with resolution and framerate.
    pub fn new(id: u8, name: impl Into<String>, width: u32, height: u32, framerate: u32) -> Self {
        VideoCodec {
            id,
            name: name.into(),
            width,
            height,
            framerate,
        }
    }
}

impl Default for VideoCodec {
    fn default() -> Self {
        VideoCodec::new(100, "VP8", 640, 480, 30)
    }
}

/// A camera or other video source known to the channel manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    /// Human readable name.
    pub name: String,
    /// Identifier unique to the device.
    pub id: String,
}

impl CaptureDevice {
    /// Device from its name and id.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        CaptureDevice {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// A media channel, owned by the session while it exists.
pub trait MediaChannel {
    /// The content this channel carries.
    fn content_name(&self) -> &str;

    /// Whether media flows in the channel.
    fn enabled(&self) -> bool;

    /// Turn media flow on or off.
    fn enable(&mut self, enabled: bool);

    /// Stop (or resume) sending.
    fn mute(&mut self, muted: bool) -> bool;

    /// Start or stop playing out the received stream with the given SSRC.
    fn set_playout(&mut self, ssrc: Ssrc, enabled: bool) -> bool;
}

/// Creates and destroys media channels, and controls video capture.
pub trait ChannelManager {
    /// New audio channel for the content. `None` if it can't be created.
    fn create_voice_channel(
        &mut self,
        content_name: &str,
        rtcp: bool,
    ) -> Option<Box<dyn MediaChannel>>;

    /// `voice` is the audio channel to share transport resources with, if any.
    fn create_video_channel(
        &mut self,
        content_name: &str,
        rtcp: bool,
        voice: Option<&dyn MediaChannel>,
    ) -> Option<Box<dyn MediaChannel>>;

    /// Give back an audio channel.
    fn destroy_voice_channel(&mut self, channel: Box<dyn MediaChannel>);

    /// Give back a video channel.
    fn destroy_video_channel(&mut self, channel: Box<dyn MediaChannel>);

    /// Select the video source, `None` to unset.
    fn set_video_capturer(&mut self, device: Option<&CaptureDevice>) -> bool;

    /// Start or stop capturing.
    fn set_video_capture(&mut self, capture: bool) -> bool;

    /// Encoder settings for video channels created from now on.
    fn set_default_video_encoder_config(&mut self, codec: &VideoCodec);
}

/// At most one voice and one video channel.
#[derive(Default)]
pub(crate) struct ChannelLifecycle {
    voice: Option<Box<dyn MediaChannel>>,
    video: Option<Box<dyn MediaChannel>>,
}

impl ChannelLifecycle {
    pub fn has(&self, kind: MediaKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn get(&self, kind: MediaKind) -> Option<&dyn MediaChannel> {
        match kind {
            MediaKind::Audio => self.voice.as_deref(),
            MediaKind::Video => self.video.as_deref(),
        }
    }

    pub fn get_mut(&mut self, kind: MediaKind) -> Option<&mut (dyn MediaChannel + 'static)> {
        match kind {
            MediaKind::Audio => self.voice.as_deref_mut(),
            MediaKind::Video => self.video.as_deref_mut(),
        }
    }

    /// Create channels for accepted content that has none yet.
    ///
    /// A channel created before a later failure is kept.
    pub fn ensure_channels(
        &mut self,
        manager: &mut dyn ChannelManager,
        desc: &SessionDescription,
        rtcp: bool,
    ) -> Result<(), SessionError> {
        let voice = desc.first_content(MediaKind::Audio).filter(|c| !c.rejected);
        let video = desc.first_content(MediaKind::Video).filter(|c| !c.rejected);

        if let Some(content) = voice {
            if self.voice.is_none() {
                let Some(channel) = manager.create_voice_channel(&content.name, rtcp) else {
                    error!("Failed to create voice channel: {}", content.name);
                    return Err(SessionError::ChannelCreationFailed(MediaKind::Audio));
                };
                debug!("Created voice channel: {}", content.name);
                self.voice = Some(channel);
            }
        }

        if let Some(content) = video {
            if self.video.is_none() {
                let channel =
                    manager.create_video_channel(&content.name, rtcp, self.voice.as_deref());
                let Some(channel) = channel else {
                    error!("Failed to create video channel: {}", content.name);
                    return Err(SessionError::ChannelCreationFailed(MediaKind::Video));
                };
                debug!("Created video channel: {}", content.name);
                self.video = Some(channel);
            }
        }

        Ok(())
    }

    pub fn enable_all(&mut self) {
        for channel in [self.voice.as_deref_mut(), self.video.as_deref_mut()]
            .into_iter()
            .flatten()
        {
            if !channel.enabled() {
                channel.enable(true);
            }
        }
    }

    /// Destroy channels and transports for content missing or rejected in the answer.
    pub fn prune(
        &mut self,
        manager: &mut dyn ChannelManager,
        transport: &mut dyn Transport,
        answer: &SessionDescription,
    ) {
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let content = answer.first_content(kind);
            if content.map(|c| !c.rejected).unwrap_or(false) {
                continue;
            }

            let channel = match kind {
                MediaKind::Audio => self.voice.take(),
                MediaKind::Video => self.video.take(),
            };

            // Absent content has no name of its own, fall back on the channel's.
            let name = content
                .map(|c| c.name.clone())
                .or_else(|| channel.as_ref().map(|c| c.content_name().to_string()));

            if let Some(channel) = channel {
                debug!("Destroy {} channel: {}", kind, channel.content_name());
                match kind {
                    MediaKind::Audio => manager.destroy_voice_channel(channel),
                    MediaKind::Video => manager.destroy_video_channel(channel),
                }
            }

            let Some(name) = name else {
                continue;
            };

            if !transport.destroy_transport(&name) {
                warn!("No transport to destroy for {} content: {}", kind, name);
            }
        }
    }

    /// Hand every channel back to the manager.
    pub fn release_all(&mut self, manager: &mut dyn ChannelManager) {
        if let Some(channel) = self.voice.take() {
            manager.destroy_voice_channel(channel);
        }
        if let Some(channel) = self.video.take() {
            manager.destroy_video_channel(channel);
        }
    }
}

impl fmt::Debug for ChannelLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelLifecycle")
            .field("voice", &self.voice.as_ref().map(|c| c.content_name()))
            .field("video", &self.video.as_ref().map(|c| c.content_name()))
            .finish()
    }
}
