// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sharebook_core::{AccessLevel, BookRef, Grant, GrantKey, GroupId, Principal, UserId};
use sharebook_store::{BookRegistry, Directory, GrantStore, TransactionalGrantStore};
use tracing::{debug, warn};

use crate::Sharing;
use crate::error::SharingError;

/// One desired share as submitted by a book's owner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub grantee: Principal,
    pub access: AccessLevel,
}

impl ShareEntry {
    pub fn new(grantee: Principal, access: AccessLevel) -> Self {
        Self { grantee, access }
    }
}

impl<S> Sharing<S>
where
    S: TransactionalGrantStore + Directory + BookRegistry,
{
    /// Replace the share list of one book with the desired list.
    ///
    /// Group entries are materialised into one row per current member,
    /// tagged with the group id. Stored rows are diffed against the
    /// desired rows on their canonical key and the resulting deletes,
    /// creates and updates are applied inside one failure-atomic scope:
    /// either the whole desired state lands or nothing changes.
    ///
    /// An unresolvable owner or book fails before any mutation. An empty
    /// desired list is valid and clears all shares of the book.
    pub fn set_shares(
        &mut self,
        owner: UserId,
        book: BookRef,
        desired: &[ShareEntry],
    ) -> Result<(), SharingError> {
        if self.store().user_by_id(owner)?.is_none() {
            return Err(SharingError::UserNotFound(owner));
        }
        if let BookRef::Book(id) = book {
            match self.store().book_by_id(id)? {
                Some(record) if record.owner == owner => {}
                _ => return Err(SharingError::BookNotFound { owner, book }),
            }
        }

        // Materialise group entries into per-member rows. Later duplicates
        // of the same key overwrite earlier ones.
        let mut desired_order: Vec<GrantKey> = Vec::new();
        let mut desired_access: HashMap<GrantKey, AccessLevel> = HashMap::new();
        for entry in desired {
            match &entry.grantee {
                Principal::User(public_id) => {
                    let key = GrantKey {
                        grantee: public_id.clone(),
                        group_id: GroupId::DIRECT,
                    };
                    if desired_access.insert(key.clone(), entry.access).is_none() {
                        desired_order.push(key);
                    }
                }
                Principal::Group(group_id) => {
                    let members = self.store().group_members(*group_id)?;
                    if members.is_empty() {
                        warn!(group = %group_id, "share for unknown or empty group expands to no rows");
                    }
                    for member in members {
                        let key = GrantKey {
                            grantee: member.public_id,
                            group_id: *group_id,
                        };
                        if desired_access.insert(key.clone(), entry.access).is_none() {
                            desired_order.push(key);
                        }
                    }
                }
            }
        }

        let current = self.store().grants_for_book(owner, book)?;
        let current_keys: HashSet<GrantKey> = current.iter().map(Grant::key).collect();

        let to_delete: Vec<GrantKey> = current
            .iter()
            .map(Grant::key)
            .filter(|key| !desired_access.contains_key(key))
            .collect();
        let to_create: Vec<GrantKey> = desired_order
            .iter()
            .filter(|key| !current_keys.contains(key))
            .cloned()
            .collect();
        let to_update: Vec<GrantKey> = desired_order
            .iter()
            .filter(|key| current_keys.contains(key))
            .cloned()
            .collect();

        debug!(
            owner = %owner,
            deletes = to_delete.len(),
            creates = to_create.len(),
            updates = to_update.len(),
            "reconciling shares"
        );

        self.store_mut().transaction(|store| {
            for key in &to_delete {
                store.delete(owner, book, key)?;
            }
            for key in &to_create {
                store.insert(Grant {
                    grantee: key.grantee.clone(),
                    owner,
                    book,
                    access: desired_access[key],
                    group_id: key.group_id,
                })?;
            }
            // Levels are not compared first; the update is always issued.
            for key in &to_update {
                store.update_access(owner, book, key, desired_access[key])?;
            }
            Ok(())
        })?;

        Ok(())
    }

    /// Record that a grantee relinquishes a share they did not create.
    ///
    /// Deposited as an explicit `None`-access individual row rather than a
    /// delete, so a future group-membership change does not silently
    /// re-grant access the user opted out of.
    pub fn leave_share(
        &mut self,
        user: UserId,
        owner: UserId,
        book: BookRef,
    ) -> Result<(), SharingError> {
        let Some(leaver) = self.store().user_by_id(user)? else {
            return Err(SharingError::UserNotFound(user));
        };

        let rows = self.store().grants_for(&leaver.public_id, owner, book)?;
        let key = GrantKey {
            grantee: leaver.public_id.clone(),
            group_id: GroupId::DIRECT,
        };

        if rows.iter().any(|row| !row.is_group_derived()) {
            self.store_mut()
                .update_access(owner, book, &key, AccessLevel::None)?;
        } else {
            self.store_mut().insert(Grant {
                grantee: leaver.public_id,
                owner,
                book,
                access: AccessLevel::None,
                group_id: GroupId::DIRECT,
            })?;
        }

        debug!(user = %user, owner = %owner, "recorded share opt-out");
        Ok(())
    }
}
