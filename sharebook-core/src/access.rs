// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three access levels a grantee can hold on an address book.
///
/// Greater levels are numerically greater; the resolver's merge fold relies
/// on this ordering. An explicit `None` row is meaningful: it records that a
/// grantee opted out of a share and must not be silently re-granted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    /// No access.
    None,

    /// Permission to read the books contents.
    Read,

    /// Permission to read and modify the books contents.
    Write,
}

impl AccessLevel {
    /// Wire representation as a small integer.
    pub fn as_u8(&self) -> u8 {
        match self {
            AccessLevel::None => 0,
            AccessLevel::Read => 1,
            AccessLevel::Write => 2,
        }
    }

    /// Parse the small-integer wire representation.
    pub fn from_u8(value: u8) -> Result<Self, UnknownAccessLevel> {
        match value {
            0 => Ok(AccessLevel::None),
            1 => Ok(AccessLevel::Read),
            2 => Ok(AccessLevel::Write),
            other => Err(UnknownAccessLevel(other)),
        }
    }

    /// Access level is None.
    pub fn is_none(&self) -> bool {
        matches!(self, AccessLevel::None)
    }

    /// Access level is Read.
    pub fn is_read(&self) -> bool {
        matches!(self, AccessLevel::Read)
    }

    /// Access level is Write.
    pub fn is_write(&self) -> bool {
        matches!(self, AccessLevel::Write)
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessLevel::None => "none",
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        };

        write!(f, "{}", s)
    }
}

/// The wire integer does not name a known access level.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("unknown access level: {0}")]
pub struct UnknownAccessLevel(pub u8);
