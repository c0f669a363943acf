//! A wrapper that keeps credentials out of log output.
//!
//! The server's configuration (which holds the JWT signing secret) gets logged at startup, so the secret is stored
//! behind [`Secret`], whose `Debug` and `Display` output is a mask. The real value only escapes through an explicit
//! [`Secret::reveal`] or, for string secrets, [`Secret::as_bytes`] at the point the signing key is derived.

use std::{
    fmt,
    fmt::{Debug, Display},
};

#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Hands out the wrapped value. Keep the result out of log statements.
    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// The raw bytes of a string secret, in the form key-derivation APIs take them.
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
