// Envelope status token
//
// The controller reports success as `meta.rc`. Some controller builds
// double-encode the field (`"rc": "\"ok\""`), so parsing and comparison
// both normalize away stray quoting before looking at the value.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Characters stripped from both operands before comparison.
const NOISE: &[char] = &['"', ' ', '\t', '\r', '\n'];

/// Case-insensitive status token carried in `meta.rc`.
///
/// Two values are recognized ([`OK`](Self::OK) and [`ERROR`](Self::ERROR));
/// anything else is preserved verbatim and compares unequal to both.
#[derive(Debug, Clone, Default)]
pub struct ResponseCode(Cow<'static, str>);

impl ResponseCode {
    /// The success token.
    pub const OK: Self = Self(Cow::Borrowed("ok"));
    /// The generic failure token.
    pub const ERROR: Self = Self(Cow::Borrowed("error"));

    /// Parse a raw wire token, stripping one layer of leading and
    /// trailing `"` characters.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('"').unwrap_or(raw);
        let raw = raw.strip_suffix('"').unwrap_or(raw);
        Self(Cow::Owned(raw.to_owned()))
    }

    /// The stored token, as received (minus the stripped quote layer).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }

    pub fn is_error(&self) -> bool {
        *self == Self::ERROR
    }

    /// `true` when the server sent nothing usable (missing or blank `rc`).
    pub fn is_empty(&self) -> bool {
        normalized(&self.0).is_empty()
    }
}

fn normalized(raw: &str) -> &str {
    raw.trim_matches(NOISE)
}

impl PartialEq for ResponseCode {
    fn eq(&self, other: &Self) -> bool {
        normalized(&self.0).eq_ignore_ascii_case(normalized(&other.0))
    }
}

impl Eq for ResponseCode {}

impl PartialEq<str> for ResponseCode {
    fn eq(&self, other: &str) -> bool {
        normalized(&self.0).eq_ignore_ascii_case(normalized(other))
    }
}

impl PartialEq<&str> for ResponseCode {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResponseCode {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ResponseCode {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl FromStr for ResponseCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
