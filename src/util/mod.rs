use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

mod pii;
pub(crate) use pii::Pii;

/// An instant far enough ahead to mean "no timeout".
pub(crate) fn not_happening() -> Instant {
    const YEARS_100: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);
    static FUTURE: Lazy<Instant> = Lazy::new(|| Instant::now() + YEARS_100);
    *FUTURE
}

// deliberate subset of ice-char, etc that are "safe"
const CHARS: &[u8] = b"abcdefghijklmnopqrstuvxyzABCDEFGHIJKLMNOPQRSTUVXYZ0123456789";

/// Random string of `len` "safe" ice-chars.
pub(crate) fn random_chars(len: usize) -> String {
    (0..len)
        .map(|_| CHARS[fastrand::usize(..CHARS.len())] as char)
        .collect()
}

/// Random numeric id, rendered as decimal.
///
/// RFC 4566 suggests an NTP timestamp for the o= session id, a random
/// number is just as good and keeps us clock free.
pub(crate) fn random_numeric_id() -> String {
    // Keep within a signed 63 bit range, the o= line requires that.
    (fastrand::u64(..) >> 2).to_string()
}
