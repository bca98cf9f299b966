//! Building local offers and answers from the desired media.

use crate::desc::{ContentGroup, ContentInfo, CryptoParams, MediaContent, MediaKind};
use crate::desc::{SessionDescription, Ssrc, StreamParams, GROUP_TYPE_BUNDLE};
use crate::util::random_chars;

const CS_AES_CM_128_HMAC_SHA1_80: &str = "AES_CM_128_HMAC_SHA1_80";
const CS_AES_CM_128_HMAC_SHA1_32: &str = "AES_CM_128_HMAC_SHA1_32";
const SUPPORTED_SUITES: &[&str] = &[CS_AES_CM_128_HMAC_SHA1_80, CS_AES_CM_128_HMAC_SHA1_32];

/// 30 bytes of key and salt, base64 is 40 chars.
const INLINE_KEY_LEN: usize = 40;

/// Whether media must, may or must not be protected with SDES crypto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurePolicy {
    /// No crypto is offered or accepted.
    Disabled,
    /// Crypto is offered and used if the other side agrees.
    Enabled,
    /// Every content section must carry crypto.
    #[default]
    Required,
}

/// One media stream the application wants to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStreamOption {
    /// Audio or video.
    pub kind: MediaKind,
    /// The track name. Must be unique across all streams of a session.
    pub name: String,
    /// The media stream the track belongs to.
    pub sync_label: String,
}

impl MediaStreamOption {
    /// Stream of the kind, name and sync label.
    pub fn new(kind: MediaKind, name: impl Into<String>, sync_label: impl Into<String>) -> Self {
        MediaStreamOption {
            kind,
            name: name.into(),
            sync_label: sync_label.into(),
        }
    }
}

/// What to put in an offer or answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSessionOptions {
    /// Include an audio section.
    pub has_audio: bool,
    /// Include a video section.
    pub has_video: bool,
    /// Offer (or accept) bundling of all content on one transport.
    pub bundle_enabled: bool,
    /// Streams to send, in order.
    pub streams: Vec<MediaStreamOption>,
}

impl Default for MediaSessionOptions {
    fn default() -> Self {
        MediaSessionOptions {
            has_audio: true,
            has_video: false,
            bundle_enabled: true,
            streams: vec![],
        }
    }
}

impl MediaSessionOptions {
    /// Whether a section of the kind is wanted.
    pub fn has_kind(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.has_audio,
            MediaKind::Video => self.has_video,
        }
    }

    /// Add a stream to send.
    pub fn add_stream(&mut self, kind: MediaKind, name: &str, sync_label: &str) {
        self.streams
            .push(MediaStreamOption::new(kind, name, sync_label));
    }

    /// Tells whether every stream has a unique name.
    pub fn has_unique_stream_names(&self) -> bool {
        self.duplicate_stream_name().is_none()
    }

    /// First stream name that is used more than once.
    pub fn duplicate_stream_name(&self) -> Option<&str> {
        let mut names: Vec<&str> = self.streams.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
            .windows(2)
            .find(|w| w[0] == w[1])
            .map(|w| w[0])
    }
}

/// Produces the session descriptions for local offers and answers.
pub trait DescriptionFactory {
    /// The current security policy.
    fn secure(&self) -> SecurePolicy;

    /// Change the security policy for descriptions created from now on.
    fn set_secure(&mut self, policy: SecurePolicy);

    /// Whether to add a default stream for media without any streams.
    fn set_add_legacy_streams(&mut self, enabled: bool);

    /// Creates an offer. `current` is the current local description, if any.
    fn create_offer(
        &mut self,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> Option<SessionDescription>;

    /// Creates an answer to `offer`. `current` is the current local description, if any.
    fn create_answer(
        &mut self,
        offer: &SessionDescription,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> Option<SessionDescription>;
}

/// Default [`DescriptionFactory`] for one audio and one video section.
#[derive(Debug, Clone)]
pub struct MediaSessionDescriptionFactory {
    secure: SecurePolicy,
    add_legacy_streams: bool,
}

impl Default for MediaSessionDescriptionFactory {
    fn default() -> Self {
        MediaSessionDescriptionFactory {
            secure: SecurePolicy::Disabled,
            add_legacy_streams: true,
        }
    }
}

impl MediaSessionDescriptionFactory {
    /// Factory with crypto disabled and legacy streams on.
    pub fn new() -> Self {
        Self::default()
    }

    fn media_content(
        &self,
        kind: MediaKind,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> MediaContent {
        let mut media = MediaContent::new(kind);

        let previous = current
            .and_then(|c| c.first_content(kind))
            .map(|c| &c.media);

        for stream in options.streams.iter().filter(|s| s.kind == kind) {
            // Keep the SSRC stable across re-offers.
            let ssrc = previous
                .and_then(|p| p.stream_by_name(&stream.name))
                .and_then(|s| s.first_ssrc())
                .unwrap_or_else(Ssrc::new);
            media
                .streams
                .push(StreamParams::new(&stream.name, &stream.sync_label, ssrc));
        }

        if media.streams.is_empty() && self.add_legacy_streams {
            let ssrc = previous
                .and_then(|p| p.streams.first())
                .and_then(|s| s.first_ssrc())
                .unwrap_or_else(Ssrc::new);
            media
                .streams
                .push(StreamParams::new(kind.to_string(), "default", ssrc));
        }

        media
    }
}

impl DescriptionFactory for MediaSessionDescriptionFactory {
    fn secure(&self) -> SecurePolicy {
        self.secure
    }

    fn set_secure(&mut self, policy: SecurePolicy) {
        self.secure = policy;
    }

    fn set_add_legacy_streams(&mut self, enabled: bool) {
        self.add_legacy_streams = enabled;
    }

    fn create_offer(
        &mut self,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> Option<SessionDescription> {
        let mut offer = SessionDescription::new();

        for kind in [MediaKind::Audio, MediaKind::Video] {
            let existing = current.and_then(|c| c.first_content(kind));
            let wanted = options.has_kind(kind);

            // An m-line once negotiated can't go away, only be rejected.
            if !wanted && existing.is_none() {
                continue;
            }

            let name = existing
                .map(|c| c.name.clone())
                .unwrap_or_else(|| kind.to_string());

            let mut media = if wanted {
                self.media_content(kind, options, current)
            } else {
                MediaContent::new(kind)
            };

            if self.secure != SecurePolicy::Disabled {
                media.cryptos.push(new_crypto(1, CS_AES_CM_128_HMAC_SHA1_80));
            }

            let content = ContentInfo::new(name, media);
            offer.contents.push(if wanted { content } else { content.rejected() });
        }

        if options.bundle_enabled {
            let mut group = ContentGroup::new(GROUP_TYPE_BUNDLE);
            for c in offer.contents.iter().filter(|c| !c.rejected) {
                group.add_content_name(&c.name);
            }
            if !group.content_names.is_empty() {
                offer.groups.push(group);
            }
        }

        Some(offer)
    }

    fn create_answer(
        &mut self,
        offer: &SessionDescription,
        options: &MediaSessionOptions,
        current: Option<&SessionDescription>,
    ) -> Option<SessionDescription> {
        let mut answer = SessionDescription::new();

        for offered in &offer.contents {
            let kind = offered.kind();

            let crypto = match self.secure {
                SecurePolicy::Disabled => None,
                _ => select_crypto(&offered.media.cryptos),
            };

            let crypto_ok = crypto.is_some() || self.secure != SecurePolicy::Required;
            let accepted = !offered.rejected && options.has_kind(kind) && crypto_ok;

            let mut media = if accepted {
                self.media_content(kind, options, current)
            } else {
                MediaContent::new(kind)
            };

            if let Some(crypto) = crypto {
                media.cryptos.push(crypto);
            }

            if !crypto_ok {
                debug!(
                    "Reject content {} without acceptable crypto",
                    offered.name
                );
            }

            let content = ContentInfo::new(&offered.name, media);
            answer
                .contents
                .push(if accepted { content } else { content.rejected() });
        }

        if options.bundle_enabled {
            if let Some(offer_group) = offer.group(GROUP_TYPE_BUNDLE) {
                let mut group = ContentGroup::new(GROUP_TYPE_BUNDLE);
                for c in answer.contents.iter().filter(|c| !c.rejected) {
                    if offer_group.has_content_name(&c.name) {
                        group.add_content_name(&c.name);
                    }
                }
                if !group.content_names.is_empty() {
                    answer.groups.push(group);
                }
            }
        }

        Some(answer)
    }
}

fn new_crypto(tag: u32, suite: &str) -> CryptoParams {
    let key = format!("inline:{}", random_chars(INLINE_KEY_LEN));
    CryptoParams::new(tag, suite, key)
}

/// First offered crypto we support, answered with a fresh key.
fn select_crypto(offered: &[CryptoParams]) -> Option<CryptoParams> {
    offered
        .iter()
        .find(|c| SUPPORTED_SUITES.contains(&c.cipher_suite.as_str()))
        .map(|c| new_crypto(c.tag, &c.cipher_suite))
}
