// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;
use crate::address::{BookRef, VirtualAddress};
use crate::identity::{GroupId, PublicId, UserId};

/// One persisted sharing row: a grantee's access to one owned address book.
///
/// Grants are the only state the sharing core owns. Group shares are
/// materialised as one row per member, tagged with the originating group id;
/// there is never a single group-level row.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Durable public identifier of the individual grantee.
    pub grantee: PublicId,

    /// Owner of the granted book.
    pub owner: UserId,

    /// The granted book, or the owner's personal storage.
    pub book: BookRef,

    pub access: AccessLevel,

    /// `GroupId::DIRECT` for a direct share, otherwise the group this row
    /// was materialised from.
    pub group_id: GroupId,
}

impl Grant {
    /// Canonical identity of this row within its book.
    pub fn key(&self) -> GrantKey {
        GrantKey {
            grantee: self.grantee.clone(),
            group_id: self.group_id,
        }
    }

    /// Return true if this row exists because of group membership.
    pub fn is_group_derived(&self) -> bool {
        !self.group_id.is_direct()
    }

    /// Stable URI of the granted book, recorded alongside the row as grant
    /// provenance.
    pub fn book_uri(&self) -> String {
        VirtualAddress::shared_book(self.owner, self.book).encode()
    }
}

/// Canonical identity of a grant row within one book.
///
/// The reconciler diffs desired shares against stored rows on this key; a
/// direct share and a group-derived row for the same grantee are distinct
/// rows on purpose.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantKey {
    pub grantee: PublicId,
    pub group_id: GroupId,
}

#[cfg(test)]
mod tests {
    use crate::access::AccessLevel;
    use crate::address::BookRef;
    use crate::identity::{BookId, GroupId, PublicId, UserId};

    use super::Grant;

    fn grant(group_id: GroupId) -> Grant {
        Grant {
            grantee: PublicId::new("bob@example.org"),
            owner: UserId(3),
            book: BookRef::Book(BookId(17)),
            access: AccessLevel::Read,
            group_id,
        }
    }

    #[test]
    fn provenance() {
        assert!(!grant(GroupId::DIRECT).is_group_derived());
        assert!(grant(GroupId(9)).is_group_derived());
    }

    #[test]
    fn direct_and_group_rows_have_distinct_keys() {
        assert_ne!(grant(GroupId::DIRECT).key(), grant(GroupId(9)).key());
        assert_eq!(grant(GroupId(9)).key(), grant(GroupId(9)).key());
    }

    #[test]
    fn book_uri_is_the_encoded_address() {
        assert_eq!(grant(GroupId::DIRECT).book_uri(), "shared-3-17");
    }
}
