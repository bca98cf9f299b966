//! Session description data model.
//!
//! This is the negotiated content of a session, independent of how it travels
//! as SDP text. Parsing and serializing SDP is left to the application.

use std::fmt;
use std::ops::Deref;

mod jsep;
pub use jsep::{JsepDescription, SdpType};

mod store;
pub(crate) use store::DescriptionStore;

/// Semantics of the a=group line used for bundling.
pub const GROUP_TYPE_BUNDLE: &str = "BUNDLE";

/// Kind of media in a content section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Audio, `m=audio`.
    Audio,
    /// Video, `m=video`.
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Synchronization source identifier of one media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ssrc(u32);

impl Ssrc {
    /// Random SSRC.
    pub fn new() -> Self {
        Ssrc(fastrand::u32(1..))
    }
}

impl Default for Ssrc {
    fn default() -> Self {
        Ssrc::new()
    }
}

impl Deref for Ssrc {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Ssrc {
    fn from(v: u32) -> Self {
        Ssrc(v)
    }
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SDES crypto parameters, `a=crypto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoParams {
    /// Tag identifying the line, echoed in the answer.
    pub tag: u32,
    /// Crypto suite, i.e. `AES_CM_128_HMAC_SHA1_80`.
    pub cipher_suite: String,
    /// Key parameters, `inline:<key>`.
    pub key_params: String,
    /// Optional session parameters, empty when absent.
    pub session_params: String,
}

impl CryptoParams {
    /// Crypto line for the given suite with an `inline:` key.
    pub fn new(tag: u32, cipher_suite: impl Into<String>, key_params: impl Into<String>) -> Self {
        CryptoParams {
            tag,
            cipher_suite: cipher_suite.into(),
            key_params: key_params.into(),
            session_params: String::new(),
        }
    }
}

/// One media stream within a content section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    /// Name of the stream, i.e. the track label.
    pub name: String,
    /// Media stream label the track belongs to.
    pub sync_label: String,
    /// SSRCs of the stream, the first is the primary.
    pub ssrcs: Vec<Ssrc>,
}

impl StreamParams {
    /// Stream with a single SSRC.
    pub fn new(name: impl Into<String>, sync_label: impl Into<String>, ssrc: Ssrc) -> Self {
        StreamParams {
            name: name.into(),
            sync_label: sync_label.into(),
            ssrcs: vec![ssrc],
        }
    }

    /// The primary SSRC.
    pub fn first_ssrc(&self) -> Option<Ssrc> {
        self.ssrcs.first().copied()
    }
}

/// The media part of a content section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContent {
    /// Audio or video.
    pub kind: MediaKind,
    /// Crypto lines, in order of preference.
    pub cryptos: Vec<CryptoParams>,
    /// Streams sent in this section.
    pub streams: Vec<StreamParams>,
}

impl MediaContent {
    /// Empty media of the kind, no crypto and no streams.
    pub fn new(kind: MediaKind) -> Self {
        MediaContent {
            kind,
            cryptos: vec![],
            streams: vec![],
        }
    }

    /// Add a crypto line.
    pub fn with_crypto(mut self, crypto: CryptoParams) -> Self {
        self.cryptos.push(crypto);
        self
    }

    /// Add a stream.
    pub fn with_stream(mut self, stream: StreamParams) -> Self {
        self.streams.push(stream);
        self
    }

    /// Find a stream by its name.
    pub fn stream_by_name(&self, name: &str) -> Option<&StreamParams> {
        self.streams.iter().find(|s| s.name == name)
    }
}

/// A negotiable content section (one m-line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    /// The content name, doubles as the media identifier (mid).
    pub name: String,
    /// Whether this section is rejected (port 0).
    pub rejected: bool,
    /// What the section negotiates.
    pub media: MediaContent,
}

impl ContentInfo {
    /// An accepted section.
    pub fn new(name: impl Into<String>, media: MediaContent) -> Self {
        ContentInfo {
            name: name.into(),
            rejected: false,
            media,
        }
    }

    /// Mark the section rejected.
    pub fn rejected(mut self) -> Self {
        self.rejected = true;
        self
    }

    /// Kind of the media in the section.
    pub fn kind(&self) -> MediaKind {
        self.media.kind
    }
}

/// An a=group line, i.e. `a=group:BUNDLE audio video`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGroup {
    /// Group semantics, i.e. [`GROUP_TYPE_BUNDLE`].
    pub semantics: String,
    /// Names of the grouped content sections, in order.
    pub content_names: Vec<String>,
}

impl ContentGroup {
    /// Empty group.
    pub fn new(semantics: impl Into<String>) -> Self {
        ContentGroup {
            semantics: semantics.into(),
            content_names: vec![],
        }
    }

    /// Add a content name, once.
    pub fn add_content_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_content_name(&name) {
            self.content_names.push(name);
        }
    }

    /// Whether the group holds the content name.
    pub fn has_content_name(&self, name: &str) -> bool {
        self.content_names.iter().any(|n| n == name)
    }
}

/// The negotiable part of a session description: ordered content sections and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDescription {
    /// Content sections in m-line order.
    pub contents: Vec<ContentInfo>,
    /// a=group lines.
    pub groups: Vec<ContentGroup>,
}

impl SessionDescription {
    /// Description without content.
    pub fn new() -> Self {
        SessionDescription::default()
    }

    /// Append a content section.
    pub fn with_content(mut self, content: ContentInfo) -> Self {
        self.contents.push(content);
        self
    }

    /// Add a group.
    pub fn with_group(mut self, group: ContentGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Position of the content section with the given name.
    pub fn content_index(&self, name: &str) -> Option<usize> {
        self.contents.iter().position(|c| c.name == name)
    }

    /// First content section of the given kind, rejected or not.
    pub fn first_content(&self, kind: MediaKind) -> Option<&ContentInfo> {
        self.contents.iter().find(|c| c.kind() == kind)
    }

    /// The first group with the semantics.
    pub fn group(&self, semantics: &str) -> Option<&ContentGroup> {
        self.groups.iter().find(|g| g.semantics == semantics)
    }

    /// Whether there is a group with the semantics.
    pub fn has_group(&self, semantics: &str) -> bool {
        self.group(semantics).is_some()
    }

    /// Every content section carries at least one crypto line.
    ///
    /// A description without any sections has nothing to protect and passes.
    pub fn has_crypto(&self) -> bool {
        self.contents.iter().all(|c| !c.media.cryptos.is_empty())
    }
}
