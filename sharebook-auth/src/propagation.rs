// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

use sharebook_core::{AccessLevel, BookRef, Grant, GroupId, PublicId, UserId};
use sharebook_store::{Directory, GrantStore};
use tracing::debug;

use crate::Sharing;
use crate::error::SharingError;

/// Correlation value captured before a user is removed from the directory
/// and consumed by the matching after-hook.
///
/// The directory forgets the user's public identifier the moment the
/// account is gone; the caller threads this value from the before-hook call
/// site to the after-hook call site instead of caching it anywhere.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeletedUserContext {
    user: UserId,
    public_id: PublicId,
}

impl DeletedUserContext {
    pub fn user(&self) -> UserId {
        self.user
    }
}

impl<S> Sharing<S>
where
    S: GrantStore + Directory,
{
    /// A user joined a group: copy every distinct (book, access) pair the
    /// group holds to the new member, tagged with the group id.
    ///
    /// Returns the number of rows created. Runs synchronously; when it
    /// returns, grants are consistent with the new membership.
    pub fn on_group_member_added(
        &mut self,
        group: GroupId,
        user: UserId,
    ) -> Result<usize, SharingError> {
        let Some(member) = self.store().user_by_id(user)? else {
            return Ok(0);
        };

        let rows = self.store().grants_for_group(group)?;
        let mut seen: HashSet<(UserId, BookRef, AccessLevel)> = HashSet::new();
        let mut created = 0;
        for row in rows {
            if !seen.insert((row.owner, row.book, row.access)) {
                continue;
            }
            let existing = self
                .store()
                .grants_for(&member.public_id, row.owner, row.book)?;
            if existing.iter().any(|grant| grant.group_id == group) {
                continue;
            }
            self.store_mut().insert(Grant {
                grantee: member.public_id.clone(),
                owner: row.owner,
                book: row.book,
                access: row.access,
                group_id: group,
            })?;
            created += 1;
        }

        debug!(group = %group, user = %user, created, "copied group grants to new member");
        Ok(created)
    }

    /// A user left a group: drop their rows tagged with that group. Direct
    /// shares and rows from other groups are untouched.
    pub fn on_group_member_removed(
        &mut self,
        group: GroupId,
        user: UserId,
    ) -> Result<usize, SharingError> {
        let Some(member) = self.store().user_by_id(user)? else {
            return Ok(0);
        };

        let removed = self
            .store_mut()
            .delete_for_grantee_in_group(&member.public_id, group)?;
        debug!(group = %group, user = %user, removed, "dropped grants of removed member");
        Ok(removed)
    }

    /// A group was deleted: drop every row materialised from it.
    pub fn on_group_deleted(&mut self, group: GroupId) -> Result<usize, SharingError> {
        let removed = self.store_mut().delete_for_group(group)?;
        debug!(group = %group, removed, "dropped grants of deleted group");
        Ok(removed)
    }

    /// Capture the context the user-deletion after-hook needs, while the
    /// directory still knows the user.
    pub fn prepare_user_deletion(
        &self,
        user: UserId,
    ) -> Result<Option<DeletedUserContext>, SharingError> {
        Ok(self
            .store()
            .user_by_id(user)?
            .map(|user| DeletedUserContext {
                user: user.id,
                public_id: user.public_id,
            }))
    }

    /// A user was deleted: drop every row naming them as grantee,
    /// regardless of provenance.
    pub fn on_user_deleted(&mut self, context: &DeletedUserContext) -> Result<usize, SharingError> {
        let removed = self.store_mut().delete_for_grantee(&context.public_id)?;
        debug!(user = %context.user, removed, "dropped grants of deleted user");
        Ok(removed)
    }

    /// A user's group memberships were replaced wholesale.
    ///
    /// Diffs the group ids of the user's current group-tagged rows against
    /// the new membership list: rows of removed groups are dropped, newly
    /// added groups have their grants copied as in
    /// [`on_group_member_added`](Self::on_group_member_added).
    pub fn on_user_groups_replaced(
        &mut self,
        user: UserId,
        groups: &[GroupId],
    ) -> Result<(), SharingError> {
        let Some(member) = self.store().user_by_id(user)? else {
            return Ok(());
        };

        let current = self.store().group_ids_for_grantee(&member.public_id)?;
        for group in &current {
            if !groups.contains(group) {
                self.store_mut()
                    .delete_for_grantee_in_group(&member.public_id, *group)?;
            }
        }
        for group in groups {
            if !current.contains(group) {
                self.on_group_member_added(*group, user)?;
            }
        }

        Ok(())
    }

    /// A user was created: treat it as joining the tenant's implicit
    /// all-members group, when the tenant has one.
    pub fn on_user_created(&mut self, user: UserId) -> Result<(), SharingError> {
        let Some(created) = self.store().user_by_id(user)? else {
            return Ok(());
        };

        if let Some(group) = self.store().tenant_group(created.tenant)? {
            self.on_group_member_added(group, user)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sharebook_core::{AccessLevel, BookRef, GroupId, Principal};
    use sharebook_store::GrantStore;

    use crate::reconcile::ShareEntry;
    use crate::test_utils::{
        ALICE, BOB, BOOK, CAROL, DAVE, OTHER_GROUP, SECOND_BOOK, TEAM, TENANT, fixture, grant_row,
        public_id,
    };

    fn team_share() -> ShareEntry {
        ShareEntry::new(Principal::Group(TEAM), AccessLevel::Read)
    }

    #[test]
    fn new_member_receives_group_grants() {
        let mut sharing = fixture();
        sharing
            .set_shares(ALICE, BookRef::Book(BOOK), &[team_share()])
            .unwrap();

        sharing.store_mut().add_group_member(TEAM, DAVE);
        let created = sharing.on_group_member_added(TEAM, DAVE).unwrap();
        assert_eq!(created, 1);

        let entries = sharing.list_shared_books(DAVE).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].access, AccessLevel::Read);
        assert_eq!(entries[0].group_id, TEAM);

        // Copying twice creates nothing new.
        assert_eq!(sharing.on_group_member_added(TEAM, DAVE).unwrap(), 0);
    }

    #[test]
    fn removed_member_loses_group_grants_only() {
        let mut sharing = fixture();
        sharing
            .set_shares(
                ALICE,
                BookRef::Book(BOOK),
                &[
                    team_share(),
                    ShareEntry::new(Principal::User(public_id(BOB)), AccessLevel::Write),
                ],
            )
            .unwrap();

        sharing.store_mut().remove_group_member(TEAM, BOB);
        let removed = sharing.on_group_member_removed(TEAM, BOB).unwrap();
        assert_eq!(removed, 1);

        // The direct share survives.
        let entries = sharing.list_shared_books(BOB).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].group_id, GroupId::DIRECT);
        assert_eq!(entries[0].access, AccessLevel::Write);
    }

    #[test]
    fn deleted_group_leaves_no_rows_behind() {
        let mut sharing = fixture();
        sharing
            .set_shares(ALICE, BookRef::Book(BOOK), &[team_share()])
            .unwrap();

        sharing.store_mut().remove_group(TEAM);
        sharing.on_group_deleted(TEAM).unwrap();

        assert!(sharing.store().grants().is_empty());
    }

    #[test]
    fn deleted_user_leaves_no_rows_behind() {
        let mut sharing = fixture();
        sharing
            .set_shares(
                ALICE,
                BookRef::Book(BOOK),
                &[
                    team_share(),
                    ShareEntry::new(Principal::User(public_id(BOB)), AccessLevel::Write),
                ],
            )
            .unwrap();

        let context = sharing.prepare_user_deletion(BOB).unwrap().unwrap();
        sharing.store_mut().remove_user(BOB);
        sharing.on_user_deleted(&context).unwrap();

        assert!(
            sharing
                .store()
                .grants()
                .iter()
                .all(|row| row.grantee != public_id(BOB))
        );
        // Carol's group row is untouched.
        assert_eq!(sharing.list_shared_books(CAROL).unwrap().len(), 1);
    }

    #[test]
    fn replaced_memberships_are_diffed() {
        let mut sharing = fixture();
        sharing
            .set_shares(ALICE, BookRef::Book(BOOK), &[team_share()])
            .unwrap();
        // A second group holds a grant on another book; bob is not in it
        // yet.
        sharing
            .store_mut()
            .insert(grant_row(
                CAROL,
                ALICE,
                BookRef::Book(SECOND_BOOK),
                AccessLevel::Write,
                OTHER_GROUP,
            ))
            .unwrap();

        sharing
            .on_user_groups_replaced(BOB, &[OTHER_GROUP])
            .unwrap();

        let entries = sharing.list_shared_books(BOB).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].book, BookRef::Book(SECOND_BOOK));
        assert_eq!(entries[0].group_id, OTHER_GROUP);
    }

    #[test]
    fn created_user_joins_the_tenant_group() {
        let mut sharing = fixture();
        sharing
            .set_shares(ALICE, BookRef::Book(BOOK), &[team_share()])
            .unwrap();
        sharing.store_mut().set_tenant_group(TENANT, TEAM);

        sharing.on_user_created(DAVE).unwrap();

        assert_eq!(sharing.list_shared_books(DAVE).unwrap().len(), 1);
    }
}
