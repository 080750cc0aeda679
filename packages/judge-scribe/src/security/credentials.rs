//! API keys and access tokens wrapped in `secrecy`.
//!
//! Values are trimmed on the way in (keys are usually pasted) and only
//! leave the wrapper through [`SecretString::expose`], at the point a
//! request is built.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// A credential value that formats as `[REDACTED]`.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(SecretBox::new(Box::from(value.as_ref().trim())))
    }

    /// The raw value. Use only when building a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Empty values count as unset.
    pub fn is_blank(&self) -> bool {
        self.expose().is_empty()
    }

    /// Last four characters, for confirming which key is stored.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.expose().chars().collect();
        if chars.len() <= 8 {
            return REDACTED.to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("…{}", tail)
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretString").field(&REDACTED).finish()
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
