// SPDX-License-Identifier: MIT OR Apache-2.0

use sharebook_core::{
    AccessLevel, BookId, BookRef, ContactId, Grant, GrantKey, GroupId, PublicId, TenantId, UserId,
};
use thiserror::Error;

use crate::types::{Book, Contact, Group, SyncScope, User};

/// Store of persisted grant rows.
///
/// Query methods return rows in a stable order (the memory store uses
/// insertion order); the resolver's access merge is order sensitive and
/// relies on this.
pub trait GrantStore {
    /// All rows held by a grantee, direct and group-tagged alike.
    fn grants_by_grantee(&self, grantee: &PublicId) -> Result<Vec<Grant>, StoreError>;

    /// All rows on one book.
    fn grants_for_book(&self, owner: UserId, book: BookRef) -> Result<Vec<Grant>, StoreError>;

    /// All rows materialised from one group.
    fn grants_for_group(&self, group_id: GroupId) -> Result<Vec<Grant>, StoreError>;

    /// All rows a grantee holds on one specific book.
    fn grants_for(
        &self,
        grantee: &PublicId,
        owner: UserId,
        book: BookRef,
    ) -> Result<Vec<Grant>, StoreError>;

    /// Distinct group ids the grantee currently holds group-tagged rows
    /// for.
    fn group_ids_for_grantee(&self, grantee: &PublicId) -> Result<Vec<GroupId>, StoreError>;

    fn insert(&mut self, grant: Grant) -> Result<(), StoreError>;

    /// Returns `true` when a row matched and was updated.
    fn update_access(
        &mut self,
        owner: UserId,
        book: BookRef,
        key: &GrantKey,
        access: AccessLevel,
    ) -> Result<bool, StoreError>;

    /// Returns `true` when a row matched and was deleted.
    fn delete(&mut self, owner: UserId, book: BookRef, key: &GrantKey) -> Result<bool, StoreError>;

    /// Delete all rows materialised from one group. Returns the number of
    /// deleted rows.
    fn delete_for_group(&mut self, group_id: GroupId) -> Result<usize, StoreError>;

    /// Delete one grantee's rows materialised from one group.
    fn delete_for_grantee_in_group(
        &mut self,
        grantee: &PublicId,
        group_id: GroupId,
    ) -> Result<usize, StoreError>;

    /// Delete all rows held by a grantee, regardless of provenance.
    fn delete_for_grantee(&mut self, grantee: &PublicId) -> Result<usize, StoreError>;
}

/// Failure-atomic scope around a batch of grant mutations.
///
/// When the closure returns an error no mutation it performed stays
/// visible; the whole batch rolls back.
pub trait TransactionalGrantStore: GrantStore {
    fn transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, StoreError>;
}

/// The user and group directory.
pub trait Directory {
    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn user_by_public_id(&self, public_id: &PublicId) -> Result<Option<User>, StoreError>;

    fn group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError>;

    /// Current members of a group. Unknown groups have no members.
    fn group_members(&self, id: GroupId) -> Result<Vec<User>, StoreError>;

    /// The tenant's implicit all-members group, if the tenant has one.
    fn tenant_group(&self, tenant: TenantId) -> Result<Option<GroupId>, StoreError>;
}

/// Registry of owned address books and their sync change counters.
pub trait BookRegistry {
    fn books_owned_by(&self, owner: UserId) -> Result<Vec<Book>, StoreError>;

    fn book_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    /// Current change counter of one (owner, storage) pair.
    fn change_tag(&self, owner: UserId, scope: SyncScope) -> Result<u64, StoreError>;

    /// Bump and return the change counter of one (owner, storage) pair.
    fn bump_change_tag(&mut self, owner: UserId, scope: SyncScope) -> Result<u64, StoreError>;
}

/// Store of contact records, reduced to the calls the router makes.
pub trait ContactStore {
    fn contact(&self, id: &ContactId, viewer: UserId) -> Result<Option<Contact>, StoreError>;

    /// Returns `true` when the record existed and was updated.
    fn update_contact(&mut self, viewer: UserId, contact: Contact) -> Result<bool, StoreError>;
}

/// Error reported by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error occurred in grant store: {0}")]
    GrantStore(String),

    #[error("error occurred in directory: {0}")]
    Directory(String),

    #[error("error occurred in book registry: {0}")]
    BookRegistry(String),

    #[error("error occurred in contact store: {0}")]
    ContactStore(String),
}
