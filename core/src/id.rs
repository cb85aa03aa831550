use std::{fmt, ops::Deref};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Backend-assigned camera identifier, stable across polls.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize
)]
#[serde(transparent)]
pub struct CameraId(CompactString);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CameraId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for CameraId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl Deref for CameraId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<str> for CameraId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CameraId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
