// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sharebook_core::{
    AccessLevel, BookRef, ContactId, Grant, GroupId, PublicId, UserId, VirtualAddress,
};
use sharebook_store::{BookRegistry, ContactStorage, ContactStore, Directory, GrantStore, SyncScope};
use tracing::debug;

use crate::Sharing;
use crate::error::SharingError;
use crate::hooks::Decision;

/// Display name of the implicit personal storage.
pub(crate) const PERSONAL_BOOK_NAME: &str = "Personal";

/// One merged, viewer-visible shared book.
///
/// Never stored; recomputed on every query from the live grant rows and the
/// book registry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SharedBookEntry {
    /// The virtual address naming this shared view.
    pub address: VirtualAddress,

    /// Public identifier of the book's owner.
    pub owner: PublicId,

    /// Merged access level across all contributing grant rows.
    pub access: AccessLevel,

    /// Provenance of the row that decided the merged level;
    /// `GroupId::DIRECT` for a direct share.
    pub group_id: GroupId,

    pub book: BookRef,
    pub display_name: String,

    /// Change counter of the book, for sync clients.
    pub ctag: u64,
}

/// Fold one more grant row into the running access aggregate for a book.
///
/// An individual row overwrites the aggregate unconditionally. Group rows
/// follow the historical precedence: a non-Read row wins when the aggregate
/// is greater or the row is None, a Read row raises anything below Write.
/// The fold is order sensitive: a Write row never raises an aggregate that
/// is already below Write, and a None row always lowers it. Callers must
/// not replace this with a symmetric max/min.
fn fold_access(aggregate: &mut AccessLevel, provenance: &mut GroupId, row: &Grant) {
    if !row.is_group_derived() {
        *aggregate = row.access;
        *provenance = row.group_id;
        return;
    }

    match row.access {
        AccessLevel::Read => {
            if !aggregate.is_write() {
                *aggregate = AccessLevel::Read;
                *provenance = row.group_id;
            }
        }
        incoming => {
            if *aggregate > incoming || incoming.is_none() {
                *aggregate = incoming;
                *provenance = row.group_id;
            }
        }
    }
}

/// Merge a batch of rows for one concrete book, left to right.
fn merge_rows(rows: &[Grant]) -> Option<(AccessLevel, GroupId)> {
    let mut rows = rows.iter();
    let first = rows.next()?;
    let mut aggregate = first.access;
    let mut provenance = first.group_id;
    for row in rows {
        fold_access(&mut aggregate, &mut provenance, row);
    }
    Some((aggregate, provenance))
}

/// Map an access requirement against a merged grant level.
///
/// An explicit `None` level denies. With no requirement given, any other
/// level allows. With a requirement given, only `Write == Write` allows; in
/// particular a Write grant does not satisfy a Read requirement. This
/// equality rule is behaviour compatibility, not policy.
fn decide(granted: AccessLevel, required: Option<AccessLevel>) -> Decision {
    if granted.is_none() {
        return Decision::Deny;
    }

    match required {
        Some(required) => {
            if required.is_write() && granted.is_write() {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }
        None => Decision::Allow,
    }
}

impl<S> Sharing<S>
where
    S: GrantStore + Directory + BookRegistry,
{
    /// All books shared with the viewer, de-duplicated per concrete book
    /// with access levels merged across the contributing grant rows.
    ///
    /// Entries whose merged access is `None` are dropped. Rows pointing at
    /// books or owners that no longer exist resolve to nothing, not an
    /// error.
    pub fn list_shared_books(&self, viewer: UserId) -> Result<Vec<SharedBookEntry>, SharingError> {
        let Some(user) = self.store().user_by_id(viewer)? else {
            return Ok(Vec::new());
        };

        let rows = self.store().grants_by_grantee(&user.public_id)?;

        // Bucket rows by concrete (owner, book), preserving first-seen
        // order; the merge fold within a bucket runs in row order.
        let mut order: Vec<(UserId, BookRef)> = Vec::new();
        let mut buckets: HashMap<(UserId, BookRef), Vec<Grant>> = HashMap::new();
        for row in rows {
            let target = (row.owner, row.book);
            match buckets.get_mut(&target) {
                Some(bucket) => bucket.push(row),
                None => {
                    order.push(target);
                    buckets.insert(target, vec![row]);
                }
            }
        }

        let mut entries = Vec::new();
        for target in order {
            let Some((access, group_id)) = merge_rows(&buckets[&target]) else {
                continue;
            };
            if access.is_none() {
                continue;
            }

            let (owner_id, book) = target;
            let Some(owner) = self.store().user_by_id(owner_id)? else {
                continue;
            };
            let display_name = match book {
                BookRef::Personal => PERSONAL_BOOK_NAME.to_string(),
                BookRef::Book(id) => {
                    let Some(record) = self.store().book_by_id(id)? else {
                        continue;
                    };
                    if record.owner != owner_id {
                        continue;
                    }
                    record.display_name
                }
            };
            let ctag = self.store().change_tag(owner_id, SyncScope::from(book))?;

            entries.push(SharedBookEntry {
                address: VirtualAddress::shared_book(owner_id, book),
                owner: owner.public_id,
                access,
                group_id,
                book,
                display_name,
                ctag,
            });
        }

        debug!(viewer = %viewer, entries = entries.len(), "resolved shared books");
        Ok(entries)
    }

    /// Check the viewer's access to one specific book.
    ///
    /// The viewer's own books always allow. Otherwise the grant rows for
    /// the book decide; with no row at all the check abstains so the
    /// surrounding pipeline can fall through to other checks.
    pub fn check_book_access(
        &self,
        viewer: UserId,
        owner: UserId,
        book: BookRef,
        required: Option<AccessLevel>,
    ) -> Result<Decision, SharingError> {
        if viewer == owner {
            return Ok(Decision::Allow);
        }

        let Some(user) = self.store().user_by_id(viewer)? else {
            return Ok(Decision::Abstain);
        };

        let rows = self.store().grants_for(&user.public_id, owner, book)?;
        match merge_rows(&rows) {
            Some((granted, _)) => Ok(decide(granted, required)),
            None => Ok(Decision::Abstain),
        }
    }
}

impl<S> Sharing<S>
where
    S: GrantStore + Directory + BookRegistry + ContactStore,
{
    /// Check the viewer's access to one contact record.
    ///
    /// Records owned by the viewer always allow. Records in the tenant-wide
    /// shared pool allow within the same tenant (or for a super
    /// administrator) and deny across tenants. Records in another user's
    /// personal or specific book are decided by the grant rows, with an
    /// abstention when no row exists.
    pub fn check_object_access(
        &self,
        viewer: UserId,
        contact_id: &ContactId,
        required: Option<AccessLevel>,
    ) -> Result<Decision, SharingError> {
        let Some(contact) = self.store().contact(contact_id, viewer)? else {
            return Ok(Decision::Abstain);
        };

        if contact.user_id == viewer {
            return Ok(Decision::Allow);
        }

        if contact.storage == ContactStorage::Shared {
            let Some(user) = self.store().user_by_id(viewer)? else {
                return Ok(Decision::Abstain);
            };
            return Ok(if user.tenant == contact.tenant || user.super_admin {
                Decision::Allow
            } else {
                Decision::Deny
            });
        }

        let target = match &contact.storage {
            ContactStorage::Personal => Some((contact.user_id, BookRef::Personal)),
            ContactStorage::AddressBook => contact
                .address_book
                .map(|id| (contact.user_id, BookRef::Book(id))),
            ContactStorage::Virtual(VirtualAddress::SharedBook { owner, book }) => {
                Some((*owner, *book))
            }
            ContactStorage::Virtual(VirtualAddress::LegacyBook { book }) => {
                Some((contact.user_id, BookRef::Book(*book)))
            }
            ContactStorage::Virtual(VirtualAddress::Shared) | ContactStorage::Shared => None,
        };
        let Some((owner, book)) = target else {
            return Ok(Decision::Abstain);
        };

        self.check_book_access(viewer, owner, book, required)
    }
}
