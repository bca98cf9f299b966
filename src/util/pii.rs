//! Log redaction for network addresses and other identifying values.
//!
//! Candidates carry host and reflexive addresses of both peers. Anything
//! wrapped in `Pii` is printed as `{REDACTED}` when the `pii` feature is
//! enabled, and as the plain value otherwise.
//!
//! Use it for debug level and above. Trace logs are left alone.

use core::fmt;
use core::ops::Deref;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pii<T>(pub T);

impl<T: fmt::Display> fmt::Display for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if cfg!(feature = "pii") {
            write!(f, "{{REDACTED}}")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if cfg!(feature = "pii") {
            write!(f, "{{REDACTED}}")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl<T> Deref for Pii<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
