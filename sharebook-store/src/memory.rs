// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use sharebook_core::{
    AccessLevel, BookId, BookRef, ContactId, Grant, GrantKey, GroupId, PublicId, TenantId, UserId,
};

use crate::traits::{
    BookRegistry, ContactStore, Directory, GrantStore, StoreError, TransactionalGrantStore,
};
use crate::types::{Book, Contact, Group, SyncScope, User};

/// In-memory implementation of all four collaborator contracts.
///
/// Grant rows are kept in insertion order, which is the order query methods
/// return them in. Transactions snapshot the grant rows and restore them
/// when the closure fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    grants: Vec<Grant>,
    users: HashMap<UserId, User>,
    groups: HashMap<GroupId, Group>,
    memberships: HashMap<GroupId, Vec<UserId>>,
    tenant_groups: HashMap<TenantId, GroupId>,
    books: HashMap<BookId, Book>,
    change_tags: HashMap<(UserId, SyncScope), u64>,
    contacts: HashMap<ContactId, Contact>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user into the directory.
    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Seed a group into the directory.
    pub fn add_group(&mut self, group: Group) {
        self.memberships.entry(group.id).or_default();
        self.groups.insert(group.id, group);
    }

    /// Seed a group membership into the directory.
    pub fn add_group_member(&mut self, group: GroupId, user: UserId) {
        let members = self.memberships.entry(group).or_default();
        if !members.contains(&user) {
            members.push(user);
        }
    }

    /// Drop a group membership from the directory.
    pub fn remove_group_member(&mut self, group: GroupId, user: UserId) {
        if let Some(members) = self.memberships.get_mut(&group) {
            members.retain(|member| *member != user);
        }
    }

    /// Remove a user from the directory.
    pub fn remove_user(&mut self, user: UserId) {
        self.users.remove(&user);
        for members in self.memberships.values_mut() {
            members.retain(|member| *member != user);
        }
    }

    /// Remove a group from the directory.
    pub fn remove_group(&mut self, group: GroupId) {
        self.groups.remove(&group);
        self.memberships.remove(&group);
    }

    /// Register the tenant's implicit all-members group.
    pub fn set_tenant_group(&mut self, tenant: TenantId, group: GroupId) {
        self.tenant_groups.insert(tenant, group);
    }

    /// Seed an owned address book into the registry.
    pub fn add_book(&mut self, book: Book) {
        self.books.insert(book.id, book);
    }

    /// Drop an address book from the registry.
    pub fn remove_book(&mut self, id: BookId) {
        self.books.remove(&id);
    }

    /// Seed a contact record.
    pub fn add_contact(&mut self, contact: Contact) {
        self.contacts.insert(contact.id.clone(), contact);
    }

    /// All grant rows, in insertion order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    fn matches(grant: &Grant, owner: UserId, book: BookRef, key: &GrantKey) -> bool {
        grant.owner == owner
            && grant.book == book
            && grant.grantee == key.grantee
            && grant.group_id == key.group_id
    }
}

impl GrantStore for MemoryStore {
    fn grants_by_grantee(&self, grantee: &PublicId) -> Result<Vec<Grant>, StoreError> {
        Ok(self
            .grants
            .iter()
            .filter(|grant| grant.grantee == *grantee)
            .cloned()
            .collect())
    }

    fn grants_for_book(&self, owner: UserId, book: BookRef) -> Result<Vec<Grant>, StoreError> {
        Ok(self
            .grants
            .iter()
            .filter(|grant| grant.owner == owner && grant.book == book)
            .cloned()
            .collect())
    }

    fn grants_for_group(&self, group_id: GroupId) -> Result<Vec<Grant>, StoreError> {
        Ok(self
            .grants
            .iter()
            .filter(|grant| grant.group_id == group_id)
            .cloned()
            .collect())
    }

    fn grants_for(
        &self,
        grantee: &PublicId,
        owner: UserId,
        book: BookRef,
    ) -> Result<Vec<Grant>, StoreError> {
        Ok(self
            .grants
            .iter()
            .filter(|grant| {
                grant.grantee == *grantee && grant.owner == owner && grant.book == book
            })
            .cloned()
            .collect())
    }

    fn group_ids_for_grantee(&self, grantee: &PublicId) -> Result<Vec<GroupId>, StoreError> {
        let mut group_ids = Vec::new();
        for grant in &self.grants {
            if grant.grantee == *grantee
                && grant.is_group_derived()
                && !group_ids.contains(&grant.group_id)
            {
                group_ids.push(grant.group_id);
            }
        }
        Ok(group_ids)
    }

    fn insert(&mut self, grant: Grant) -> Result<(), StoreError> {
        self.grants.push(grant);
        Ok(())
    }

    fn update_access(
        &mut self,
        owner: UserId,
        book: BookRef,
        key: &GrantKey,
        access: AccessLevel,
    ) -> Result<bool, StoreError> {
        let mut updated = false;
        for grant in &mut self.grants {
            if Self::matches(grant, owner, book, key) {
                grant.access = access;
                updated = true;
            }
        }
        Ok(updated)
    }

    fn delete(&mut self, owner: UserId, book: BookRef, key: &GrantKey) -> Result<bool, StoreError> {
        let before = self.grants.len();
        self.grants
            .retain(|grant| !Self::matches(grant, owner, book, key));
        Ok(self.grants.len() < before)
    }

    fn delete_for_group(&mut self, group_id: GroupId) -> Result<usize, StoreError> {
        let before = self.grants.len();
        self.grants.retain(|grant| grant.group_id != group_id);
        Ok(before - self.grants.len())
    }

    fn delete_for_grantee_in_group(
        &mut self,
        grantee: &PublicId,
        group_id: GroupId,
    ) -> Result<usize, StoreError> {
        let before = self.grants.len();
        self.grants
            .retain(|grant| !(grant.grantee == *grantee && grant.group_id == group_id));
        Ok(before - self.grants.len())
    }

    fn delete_for_grantee(&mut self, grantee: &PublicId) -> Result<usize, StoreError> {
        let before = self.grants.len();
        self.grants.retain(|grant| grant.grantee != *grantee);
        Ok(before - self.grants.len())
    }
}

impl TransactionalGrantStore for MemoryStore {
    fn transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, StoreError>,
    {
        let snapshot = self.grants.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.grants = snapshot;
                Err(err)
            }
        }
    }
}

impl Directory for MemoryStore {
    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_by_public_id(&self, public_id: &PublicId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .values()
            .find(|user| user.public_id == *public_id)
            .cloned())
    }

    fn group_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.groups.get(&id).cloned())
    }

    fn group_members(&self, id: GroupId) -> Result<Vec<User>, StoreError> {
        let Some(members) = self.memberships.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(members
            .iter()
            .filter_map(|member| self.users.get(member).cloned())
            .collect())
    }

    fn tenant_group(&self, tenant: TenantId) -> Result<Option<GroupId>, StoreError> {
        Ok(self.tenant_groups.get(&tenant).copied())
    }
}

impl BookRegistry for MemoryStore {
    fn books_owned_by(&self, owner: UserId) -> Result<Vec<Book>, StoreError> {
        let mut books: Vec<Book> = self
            .books
            .values()
            .filter(|book| book.owner == owner)
            .cloned()
            .collect();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    fn book_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.books.get(&id).cloned())
    }

    fn change_tag(&self, owner: UserId, scope: SyncScope) -> Result<u64, StoreError> {
        Ok(self.change_tags.get(&(owner, scope)).copied().unwrap_or(0))
    }

    fn bump_change_tag(&mut self, owner: UserId, scope: SyncScope) -> Result<u64, StoreError> {
        let tag = self.change_tags.entry((owner, scope)).or_insert(0);
        *tag += 1;
        Ok(*tag)
    }
}

impl ContactStore for MemoryStore {
    fn contact(&self, id: &ContactId, _viewer: UserId) -> Result<Option<Contact>, StoreError> {
        Ok(self.contacts.get(id).cloned())
    }

    fn update_contact(&mut self, _viewer: UserId, contact: Contact) -> Result<bool, StoreError> {
        match self.contacts.get_mut(&contact.id) {
            Some(existing) => {
                *existing = contact;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
