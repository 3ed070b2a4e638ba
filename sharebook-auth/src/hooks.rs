// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher-facing surface of the sharing service.
//!
//! The surrounding system dispatches requests to an ordered list of named
//! hook implementations; this module holds the plain functions those hooks
//! delegate to, plus the tagged [`Decision`] result the access-check
//! pipeline folds over.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sharebook_core::{BookRef, GroupId, Principal, TenantId, UserId, VirtualAddress};
use sharebook_store::{
    BookRegistry, Directory, GrantStore, StorageKind, TransactionalGrantStore,
};
use tracing::warn;

use crate::Sharing;
use crate::error::SharingError;
use crate::reconcile::ShareEntry;
use crate::resolver::{PERSONAL_BOOK_NAME, SharedBookEntry};

/// Outcome of an access check.
///
/// `Allow` and `Deny` are definitive: the surrounding check pipeline stops
/// at the first definitive outcome and no later check gets to overrule it.
/// `Abstain` expresses no opinion and lets the next check run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Allow,
    Deny,
    Abstain,
}

impl Decision {
    /// Return true if this outcome stops the check pipeline.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, Decision::Abstain)
    }

    /// Return true if access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Storage selector of a contact-listing request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageQuery {
    /// Contacts from every storage the viewer can see.
    All,

    Kind(StorageKind),
}

/// Predicate fragment appended to a contact query under construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterClause {
    /// Every inner clause must hold.
    All(Vec<FilterClause>),

    TenantIs(TenantId),

    StorageIs(StorageKind),

    /// The record lives in a book the viewer can see through sharing.
    VisibleBook { owner: UserId, book: BookRef },
}

/// One row of the address-book list returned to clients.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AddressBookItem {
    /// A book the viewer owns, with its current share list attached for
    /// management UIs.
    Owned {
        owner: UserId,
        book: BookRef,
        display_name: String,
        shares: Vec<ShareEntry>,
    },

    /// A book shared with the viewer.
    Shared(SharedBookEntry),
}

impl<S> Sharing<S> {
    /// Append the shared storage kind to the caller's list of kinds.
    pub fn storage_kinds(&self, kinds: &mut Vec<StorageKind>) {
        if !kinds.contains(&StorageKind::Shared) {
            kinds.push(StorageKind::Shared);
        }
    }
}

impl<S> Sharing<S>
where
    S: GrantStore + Directory + BookRegistry,
{
    /// Append the sharing predicates to a contact query.
    ///
    /// Applies to the `shared` storage and to `all`; other storages are
    /// not this module's concern and the filter list is left untouched.
    pub fn storage_filter(
        &self,
        viewer: UserId,
        query: StorageQuery,
        filters: &mut Vec<FilterClause>,
    ) -> Result<(), SharingError> {
        let applies = matches!(
            query,
            StorageQuery::All | StorageQuery::Kind(StorageKind::Shared)
        );
        if !applies {
            return Ok(());
        }

        let Some(user) = self.store().user_by_id(viewer)? else {
            return Ok(());
        };

        filters.push(FilterClause::All(vec![
            FilterClause::TenantIs(user.tenant),
            FilterClause::StorageIs(StorageKind::Shared),
        ]));

        for entry in self.list_shared_books(viewer)? {
            if let VirtualAddress::SharedBook { owner, book } = entry.address {
                filters.push(FilterClause::VisibleBook { owner, book });
            }
        }

        Ok(())
    }

    /// The viewer's address-book list: personal storage and owned books
    /// first, each with its current share list, then the books shared with
    /// the viewer.
    pub fn address_books(&self, viewer: UserId) -> Result<Vec<AddressBookItem>, SharingError> {
        let mut items = Vec::new();
        if self.store().user_by_id(viewer)?.is_none() {
            return Ok(items);
        }

        items.push(AddressBookItem::Owned {
            owner: viewer,
            book: BookRef::Personal,
            display_name: PERSONAL_BOOK_NAME.to_string(),
            shares: self.share_list(viewer, BookRef::Personal)?,
        });
        for book in self.store().books_owned_by(viewer)? {
            items.push(AddressBookItem::Owned {
                owner: viewer,
                book: BookRef::Book(book.id),
                display_name: book.display_name,
                shares: self.share_list(viewer, BookRef::Book(book.id))?,
            });
        }

        for entry in self.list_shared_books(viewer)? {
            items.push(AddressBookItem::Shared(entry));
        }

        Ok(items)
    }

    /// Current share list of one owned book, with materialised group rows
    /// collapsed back into one group entry each.
    fn share_list(&self, owner: UserId, book: BookRef) -> Result<Vec<ShareEntry>, SharingError> {
        let mut shares = Vec::new();
        let mut seen_groups: HashSet<GroupId> = HashSet::new();
        for row in self.store().grants_for_book(owner, book)? {
            if row.is_group_derived() {
                if seen_groups.insert(row.group_id) {
                    shares.push(ShareEntry::new(
                        Principal::Group(row.group_id),
                        row.access,
                    ));
                }
            } else {
                shares.push(ShareEntry::new(Principal::User(row.grantee), row.access));
            }
        }
        Ok(shares)
    }
}

impl<S> Sharing<S>
where
    S: TransactionalGrantStore + Directory + BookRegistry,
{
    /// Boolean-reporting wrapper around
    /// [`set_shares`](Self::set_shares) for the dispatcher: failures are
    /// logged here and reported as `false`, never surfaced as partial
    /// state.
    pub fn update_shares(&mut self, owner: UserId, book: BookRef, desired: &[ShareEntry]) -> bool {
        match self.set_shares(owner, book, desired) {
            Ok(()) => true,
            Err(err) => {
                warn!(owner = %owner, error = %err, "share update failed");
                false
            }
        }
    }
}
