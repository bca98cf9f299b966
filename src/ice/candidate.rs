use combine::error::*;
use combine::parser::char::*;
use combine::parser::combinator::*;
use combine::stream::StreamErrorFor;
use combine::*;
use combine::{ParseError, Parser, Stream};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use super::IceError;

/// ICE candidates are network addresses used to connect to a peer.
///
/// There are different kinds of ICE candidates. The simplest kind is a
/// host candidate which is a socket address on a local (host) network interface.
///
/// Two candidates are equal when they describe the same transport path:
/// component, protocol, address, kind, related address, generation and ufrag.
/// The foundation and priority are deliberately left out, they are calculated
/// per agent and two agents may disagree.
#[derive(Clone)]
pub struct Candidate {
    /// Groups similar candidates in the freezing algorithm.
    ///
    /// For remote, this is communicated, and locally it's calculated.
    foundation: String,

    /// 1 for RTP, 2 for RTCP.
    component_id: u16,

    /// Protocol for the candidate.
    proto: Protocol,

    /// Priority.
    prio: u32,

    /// The actual address to use. This might be a host address, server reflex, relay etc.
    addr: SocketAddr,

    /// Type of candidate.
    kind: CandidateKind,

    /// Related address, for reflexive and relayed candidates.
    raddr: Option<SocketAddr>,

    /// Bumped on every ICE restart by the gathering side.
    generation: Option<u32>,

    /// Ties the candidate to a specific ICE session.
    ufrag: Option<String>,
}

impl Candidate {
    #[allow(clippy::too_many_arguments)]
    fn new(
        foundation: Option<String>,
        component_id: u16,
        proto: Protocol,
        prio: Option<u32>,
        addr: SocketAddr,
        kind: CandidateKind,
        raddr: Option<SocketAddr>,
        generation: Option<u32>,
        ufrag: Option<String>,
    ) -> Self {
        let prio = prio.unwrap_or_else(|| calculate_prio(kind, component_id));
        let foundation = foundation.unwrap_or_else(|| calculate_foundation(kind, addr, proto));

        Candidate {
            foundation,
            component_id,
            proto,
            prio,
            addr,
            kind,
            raddr,
            generation,
            ufrag,
        }
    }

    /// Creates a host ICE candidate.
    ///
    /// Host candidates are local sockets directly on the host.
    pub fn host(addr: SocketAddr, proto: impl TryInto<Protocol>) -> Result<Self, IceError> {
        if !is_valid_ip(addr.ip()) {
            return Err(IceError::BadCandidate(format!("invalid ip {}", addr.ip())));
        }

        Ok(Candidate::new(
            None,
            1, // only RTP
            parse_proto(proto)?,
            None,
            addr,
            CandidateKind::Host,
            None,
            None,
            None,
        ))
    }

    /// Creates a server reflexive ICE candidate.
    ///
    /// Server reflexive candidates are addresses as seen from a STUN server, `base`
    /// is the local interface address the mapping was obtained from.
    pub fn server_reflexive(
        addr: SocketAddr,
        base: SocketAddr,
        proto: impl TryInto<Protocol>,
    ) -> Result<Self, IceError> {
        if !is_valid_ip(addr.ip()) {
            return Err(IceError::BadCandidate(format!("invalid ip {}", addr.ip())));
        }

        Ok(Candidate::new(
            None,
            1,
            parse_proto(proto)?,
            None,
            addr,
            CandidateKind::ServerReflexive,
            Some(base),
            None,
            None,
        ))
    }

    /// Creates a relayed ICE candidate.
    ///
    /// Relayed candidates are allocations on a TURN server.
    pub fn relayed(
        addr: SocketAddr,
        mapped: SocketAddr,
        proto: impl TryInto<Protocol>,
    ) -> Result<Self, IceError> {
        if !is_valid_ip(addr.ip()) {
            return Err(IceError::BadCandidate(format!("invalid ip {}", addr.ip())));
        }

        Ok(Candidate::new(
            None,
            1,
            parse_proto(proto)?,
            None,
            addr,
            CandidateKind::Relayed,
            Some(mapped),
            None,
            None,
        ))
    }

    /// Parses the value of an `a=candidate` attribute.
    ///
    /// The `a=` prefix and a trailing line end are accepted but not required.
    ///
    /// ```
    /// # use jsep_session::Candidate;
    /// let c = Candidate::from_sdp_string(
    ///     "candidate:1 1 udp 2113929471 203.0.113.100 10100 typ host generation 0",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(c.addr().port(), 10100);
    /// assert_eq!(c.generation(), Some(0));
    /// ```
    pub fn from_sdp_string(s: &str) -> Result<Self, IceError> {
        let s = s.strip_prefix("a=").unwrap_or(s).trim_end();
        candidate()
            .parse(s)
            .map(|(c, _)| c)
            .map_err(|e| IceError::BadCandidate(e.to_string()))
    }

    /// Creates a new ICE candidate string.
    ///
    /// Output is compatible with `a=candidate` without the `a=` prefix.
    pub fn to_sdp_string(&self) -> String {
        let mut s = format!(
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component_id,
            self.proto,
            self.prio,
            self.addr.ip(),
            self.addr.port(),
            self.kind
        );
        if let Some(raddr) = &self.raddr {
            s.push_str(&format!(" raddr {} rport {}", raddr.ip(), raddr.port()))
        }
        if let Some(generation) = self.generation {
            s.push_str(&format!(" generation {}", generation));
        }
        if let Some(ufrag) = &self.ufrag {
            s.push_str(&format!(" ufrag {}", ufrag));
        }
        s
    }

    /// Tells whether `other` describes the same transport path as `self`.
    pub fn is_equivalent(&self, other: &Candidate) -> bool {
        self == other
    }

    /// Candidate foundation.
    pub fn foundation(&self) -> &str {
        &self.foundation
    }

    /// Component id, 1 for RTP and 2 for RTCP.
    pub fn component_id(&self) -> u16 {
        self.component_id
    }

    /// Protocol the candidate is using.
    pub fn proto(&self) -> Protocol {
        self.proto
    }

    /// Candidate priority.
    pub fn prio(&self) -> u32 {
        self.prio
    }

    /// Returns the address for this candidate.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the kind of this candidate.
    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    /// Related address, if any.
    pub fn raddr(&self) -> Option<SocketAddr> {
        self.raddr
    }

    /// The ICE generation, if communicated.
    pub fn generation(&self) -> Option<u32> {
        self.generation
    }

    /// Set the ICE generation.
    pub fn set_generation(&mut self, generation: u32) {
        self.generation = Some(generation);
    }

    /// Returns the ufrag of this candidate, if any.
    pub fn ufrag(&self) -> Option<&str> {
        self.ufrag.as_deref()
    }

    /// Set the ufrag of this candidate.
    pub fn set_ufrag(&mut self, ufrag: &str) {
        self.ufrag = Some(ufrag.into());
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.component_id == other.component_id
            && self.proto == other.proto
            && self.addr == other.addr
            && self.kind == other.kind
            && self.raddr == other.raddr
            && self.generation == other.generation
            && self.ufrag == other.ufrag
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component_id.hash(state);
        self.proto.hash(state);
        self.addr.hash(state);
        self.kind.hash(state);
        self.raddr.hash(state);
        self.generation.hash(state);
        self.ufrag.hash(state);
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidate({}={}/{}", self.kind, self.addr, self.proto)?;
        if let Some(raddr) = self.raddr {
            write!(f, " raddr={raddr}")?;
        }
        write!(f, " prio={}", self.prio)?;
        if let Some(generation) = self.generation {
            write!(f, " gen={generation}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sdp_string())
    }
}

/// Type of candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// Host (local network interface)
    Host,
    /// Prflx (Peer reflexive)
    PeerReflexive,
    /// Srflx (STUN)
    ServerReflexive,
    /// Relay (TURN)
    Relayed,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            CandidateKind::Host => "host",
            CandidateKind::PeerReflexive => "prflx",
            CandidateKind::ServerReflexive => "srflx",
            CandidateKind::Relayed => "relay",
        };
        write!(f, "{x}")
    }
}

/// Transport protocol of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// UDP
    Udp,
    /// TCP (See RFC 4571 for framing)
    Tcp,
    /// TCP with fixed SSL Hello Exchange
    SslTcp,
    /// TLS (only used via relay)
    Tls,
}

impl TryFrom<&str> for Protocol {
    type Error = ();

    fn try_from(proto: &str) -> Result<Self, Self::Error> {
        let proto = proto.to_lowercase();
        match proto.as_str() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            "ssltcp" => Ok(Protocol::SslTcp),
            "tls" => Ok(Protocol::Tls),
            _ => Err(()),
        }
    }
}

impl From<Protocol> for &str {
    fn from(proto: Protocol) -> Self {
        match proto {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::SslTcp => "ssltcp",
            Protocol::Tls => "tls",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x: &str = (*self).into();
        write!(f, "{}", x)
    }
}

/// A candidate tied to a media section of a session description.
///
/// This is what travels over the signaling channel when trickling candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    sdp_mid: String,
    sdp_mline_index: usize,
    candidate: Candidate,
}

impl IceCandidate {
    /// Creates a new candidate for the media section identified by `sdp_mid`
    /// and/or `sdp_mline_index`.
    pub fn new(sdp_mid: impl Into<String>, sdp_mline_index: usize, candidate: Candidate) -> Self {
        IceCandidate {
            sdp_mid: sdp_mid.into(),
            sdp_mline_index,
            candidate,
        }
    }

    /// Parses a trickled candidate line for the given media section.
    pub fn parse(
        sdp_mid: impl Into<String>,
        sdp_mline_index: usize,
        candidate: &str,
    ) -> Result<Self, IceError> {
        let candidate = Candidate::from_sdp_string(candidate)?;
        Ok(IceCandidate::new(sdp_mid, sdp_mline_index, candidate))
    }

    /// The media identifier (content name) this candidate belongs to.
    pub fn sdp_mid(&self) -> &str {
        &self.sdp_mid
    }

    /// Position of the media section this candidate belongs to.
    pub fn sdp_mline_index(&self) -> usize {
        self.sdp_mline_index
    }

    /// The candidate itself.
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.sdp_mline_index = index;
        self
    }
}

/// Serialize [IceCandidate] into candidate info.
///
/// e.g. serde_json would produce:
/// ```json
/// {
///  "candidate": "candidate:12044049749558888150 1 udp 2130706175 1.2.3.4 1234 typ host",
///  "sdpMid": "audio",
///  "sdpMLineIndex": 0,
///  "usernameFragment": null
/// }
/// ```
impl Serialize for IceCandidate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut o = serializer.serialize_struct("CandidateInfo", 4)?;
        o.serialize_field("candidate", &self.candidate.to_sdp_string())?;
        o.serialize_field("sdpMid", &self.sdp_mid)?;
        o.serialize_field("sdpMLineIndex", &self.sdp_mline_index)?;
        o.serialize_field("usernameFragment", &self.candidate.ufrag())?;
        o.end()
    }
}

impl<'de> Deserialize<'de> for IceCandidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CandidateInfo {
            candidate: String,
            #[serde(default)]
            sdp_mid: Option<String>,
            #[serde(rename = "sdpMLineIndex", default)]
            sdp_mline_index: Option<usize>,
            #[serde(default)]
            username_fragment: Option<String>,
        }

        let CandidateInfo {
            candidate,
            sdp_mid,
            sdp_mline_index,
            username_fragment,
        } = CandidateInfo::deserialize(deserializer)?;

        let mut candidate =
            Candidate::from_sdp_string(&candidate).map_err(serde::de::Error::custom)?;

        if let Some(ufrag) = username_fragment {
            candidate.set_ufrag(&ufrag);
        }

        Ok(IceCandidate::new(
            sdp_mid.unwrap_or_default(),
            sdp_mline_index.unwrap_or(0),
            candidate,
        ))
    }
}

fn parse_proto(proto: impl TryInto<Protocol>) -> Result<Protocol, IceError> {
    proto
        .try_into()
        .map_err(|_| IceError::BadCandidate("invalid protocol".into()))
}

fn is_valid_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v) => {
            !v.is_link_local() && !v.is_broadcast() && !v.is_multicast() && !v.is_unspecified()
        }
        IpAddr::V6(v) => !v.is_multicast() && !v.is_unspecified(),
    }
}

// RFC 8445 5.1.2.1
fn calculate_prio(kind: CandidateKind, component_id: u16) -> u32 {
    let type_preference: u32 = match kind {
        CandidateKind::Host => 126,
        CandidateKind::PeerReflexive => 110,
        CandidateKind::ServerReflexive => 100,
        CandidateKind::Relayed => 0,
    };
    let local_preference: u32 = 65535;

    (type_preference << 24) + (local_preference << 8) + (256 - component_id.min(256) as u32)
}

fn calculate_foundation(kind: CandidateKind, addr: SocketAddr, proto: Protocol) -> String {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    addr.ip().hash(&mut hasher);
    proto.hash(&mut hasher);
    hasher.finish().to_string()
}

/// Parser for a candidate line without the attribute prefix (a=).
///
/// ```text
/// candidate:<foundation> <component> <transport> <priority> <address> <port> typ <kind> *(<name> <value>)
/// ```
fn candidate<Input>() -> impl Parser<Input, Output = Candidate>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let proto = not_sp::<Input>().and_then(|s| {
        Protocol::try_from(s.as_str()).map_err(|_| {
            StreamErrorFor::<Input>::message_format(format!("invalid protocol: {}", s))
        })
    });

    let kind = choice((
        string("host").map(|_| CandidateKind::Host),
        string("prflx").map(|_| CandidateKind::PeerReflexive),
        string("srflx").map(|_| CandidateKind::ServerReflexive),
        string("relay").map(|_| CandidateKind::Relayed),
    ));

    // raddr/rport, generation, ufrag and friends, in any order.
    let extension = (
        attempt(token(' ').with(not_sp::<Input>())),
        token(' ').with(not_sp::<Input>()),
    );

    (
        string("candidate:").with(not_sp::<Input>()),
        spaced::<Input, u16>(),
        token(' ').with(proto),
        spaced::<Input, u32>(),
        spaced::<Input, IpAddr>(),
        spaced::<Input, u16>(),
        string(" typ ").with(kind),
        many::<Vec<(String, String)>, Input, _>(extension),
    )
        .and_then(
            |(foundation, component_id, proto, prio, ip, port, kind, extensions)| {
                let ext = Extensions::collect(extensions)
                    .map_err(StreamErrorFor::<Input>::message_format)?;

                Ok::<_, StreamErrorFor<Input>>(Candidate::new(
                    Some(foundation),
                    component_id,
                    proto,
                    Some(prio),
                    SocketAddr::from((ip, port)),
                    kind,
                    ext.raddr,
                    ext.generation,
                    ext.ufrag,
                ))
            },
        )
}

/// The `<name> <value>` pairs after the candidate type.
#[derive(Default)]
struct Extensions {
    raddr: Option<SocketAddr>,
    generation: Option<u32>,
    ufrag: Option<String>,
}

impl Extensions {
    fn collect(pairs: Vec<(String, String)>) -> Result<Self, String> {
        let mut ext = Extensions::default();
        let mut related_ip = None;
        let mut related_port = None;

        for (name, value) in pairs {
            match name.as_str() {
                "raddr" => {
                    let ip = value.parse::<IpAddr>().map_err(|e| format!("raddr: {e}"))?;
                    related_ip = Some(ip);
                }
                "rport" => {
                    let port = value.parse::<u16>().map_err(|e| format!("rport: {e}"))?;
                    related_port = Some(port);
                }
                "generation" => ext.generation = value.parse().ok(),
                "ufrag" => ext.ufrag = Some(value),
                // tcptype, network-id, network-cost
                _ => {}
            }
        }

        ext.raddr = match (related_ip, related_port) {
            (Some(ip), Some(port)) => Some(SocketAddr::from((ip, port))),
            (None, None) => None,
            _ => return Err("raddr without rport".into()),
        };

        Ok(ext)
    }
}

/// A space followed by a value parsed with [`FromStr`].
fn spaced<Input, T>() -> impl Parser<Input, Output = T>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
    T: FromStr,
    T::Err: fmt::Display,
{
    token(' ').with(
        not_sp::<Input>()
            .and_then(|s| s.parse::<T>().map_err(StreamErrorFor::<Input>::message_format)),
    )
}

fn not_sp<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(satisfy(|c| c != ' ' && c != '\r' && c != '\n'))
}
