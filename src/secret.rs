//! Scoped-lifetime credential material.
//!
//! Authentication secrets live only in memory for the duration of a run and
//! are zeroed when dropped. They are deliberately kept out of `Debug` output,
//! error messages, and serialized reports.

use std::fmt;

use zeroize::Zeroize;

/// An in-memory credential value that zeroes its backing storage on drop.
///
/// `Debug` prints a redacted placeholder. There is intentionally no `Display`
/// implementation and no serde support: the only way to read the value is an
/// explicit [`expose`](Secret::expose) call at the point of use.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value.
    ///
    /// Call sites should borrow for as short a time as possible and never
    /// copy the value into longer-lived storage.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}
