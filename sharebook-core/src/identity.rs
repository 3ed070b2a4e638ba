// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Numeric id of a user account.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric id of a group.
///
/// `GroupId::DIRECT` (zero) is the sentinel marking a grant that was created
/// by a direct share rather than materialised from group membership.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Provenance marker for grants created by a direct share.
    pub const DIRECT: GroupId = GroupId(0);

    /// Return true if this id is the direct-share sentinel.
    pub fn is_direct(&self) -> bool {
        *self == GroupId::DIRECT
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable numeric id of an owned address book.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(pub u64);

impl Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric id of a tenant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub u64);

/// Durable public identifier of a user, used as the grantee principal in
/// persisted grant rows. Survives renames of the numeric account.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicId(String);

impl PublicId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PublicId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PublicId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a contact record.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(String);

impl ContactId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The subject of a desired share: a single user or a whole group.
///
/// Group principals never reach the grant table as such; the reconciler
/// materialises them into per-member rows tagged with the group id.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Principal {
    User(PublicId),
    Group(GroupId),
}

impl Principal {
    /// Return true if this principal is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Principal::Group(_))
    }

    /// Return true if this principal is an individual user.
    pub fn is_user(&self) -> bool {
        !self.is_group()
    }
}
