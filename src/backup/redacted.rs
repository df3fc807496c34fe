//! Database password that stays out of logs.
//!
//! Target descriptors are logged and attached to errors in Debug form, so the
//! password only leaves this type through [`RedactedString::expose`], which the
//! dump command uses to build its `-p` argument.

use derive_more::From;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Formatter};
use std::result;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder shown instead of the actual password in Debug and serialized output
pub static REDACTED_PASSWORD: &str = "###REDACTED_PASSWORD###";

/// A missing password deserializes to the empty string.
#[derive(Clone, Default, PartialEq, Eq, From, Zeroize, ZeroizeOnDrop)]
pub struct RedactedString(String);

impl RedactedString {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RedactedString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Debug for RedactedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED_PASSWORD)
    }
}

impl Serialize for RedactedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED_PASSWORD)
    }
}

impl<'de> Deserialize<'de> for RedactedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}
