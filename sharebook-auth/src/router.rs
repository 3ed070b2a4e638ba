// SPDX-License-Identifier: MIT OR Apache-2.0

use sharebook_core::{BookRef, ContactId, UserId, VirtualAddress};
use sharebook_store::{BookRegistry, Contact, ContactStorage, ContactStore, SyncScope};
use tracing::debug;

use crate::Sharing;
use crate::error::SharingError;

impl<S> Sharing<S> {
    /// Unfold a loaded contact's virtual storage address into plain
    /// fields, so downstream logic sees the owning user and book directly.
    ///
    /// Records without a virtual address are left untouched.
    pub fn populate_contact(&self, contact: &mut Contact) {
        let ContactStorage::Virtual(address) = &contact.storage else {
            return;
        };

        match *address {
            VirtualAddress::SharedBook { owner, book } => {
                contact.user_id = owner;
                match book {
                    BookRef::Personal => {
                        contact.storage = ContactStorage::Personal;
                        contact.address_book = None;
                    }
                    BookRef::Book(id) => {
                        contact.storage = ContactStorage::AddressBook;
                        contact.address_book = Some(id);
                    }
                }
            }
            VirtualAddress::LegacyBook { book } => {
                contact.storage = ContactStorage::AddressBook;
                contact.address_book = Some(book);
            }
            // Not a concrete storage location; nothing to unfold.
            VirtualAddress::Shared => {}
        }
    }

    /// Fold a record addressed at another user's storage back into a
    /// virtual address before it is written, so the store sees the viewer
    /// as the record owner.
    pub fn prepare_contact_write(&self, contact: &mut Contact, viewer: UserId) {
        if contact.user_id == viewer {
            return;
        }
        if matches!(
            contact.storage,
            ContactStorage::Virtual(_) | ContactStorage::Shared
        ) {
            return;
        }

        let book = match (&contact.storage, contact.address_book) {
            (ContactStorage::AddressBook, Some(id)) => BookRef::Book(id),
            _ => BookRef::Personal,
        };
        contact.storage =
            ContactStorage::Virtual(VirtualAddress::shared_book(contact.user_id, book));
        contact.user_id = viewer;
        contact.address_book = None;
    }
}

impl<S> Sharing<S>
where
    S: ContactStore + BookRegistry,
{
    /// Toggle a batch of contacts between personal storage and the
    /// tenant-wide shared pool.
    ///
    /// Each record is processed independently: personal moves to shared,
    /// shared moves to personal, anything else is skipped. The change tag
    /// of the *previous* storage location is bumped so sync clients
    /// watching it observe the move. Returns the number of toggled
    /// records.
    pub fn toggle_storage(
        &mut self,
        viewer: UserId,
        ids: &[ContactId],
    ) -> Result<usize, SharingError> {
        let mut toggled = 0;
        for id in ids {
            let Some(mut contact) = self.store().contact(id, viewer)? else {
                continue;
            };

            let (next, previous) = match contact.storage {
                ContactStorage::Personal => (ContactStorage::Shared, SyncScope::Personal),
                ContactStorage::Shared => (ContactStorage::Personal, SyncScope::SharedPool),
                _ => continue,
            };

            self.store_mut().bump_change_tag(contact.user_id, previous)?;
            contact.storage = next;
            if self.store_mut().update_contact(viewer, contact)? {
                toggled += 1;
            }
        }

        debug!(viewer = %viewer, toggled, "toggled contact storage");
        Ok(toggled)
    }
}

#[cfg(test)]
mod tests {
    use sharebook_core::{BookRef, ContactId, VirtualAddress};
    use sharebook_store::{BookRegistry, ContactStorage, ContactStore, SyncScope};

    use crate::test_utils::{ALICE, BOB, BOOK, fixture, pool_contact, seeded_contact};

    #[test]
    fn populate_unfolds_personal_view() {
        let sharing = fixture();
        let mut contact = seeded_contact("c1", BOB, BookRef::Personal);
        contact.storage = ContactStorage::Virtual(VirtualAddress::shared_book(
            ALICE,
            BookRef::Personal,
        ));

        sharing.populate_contact(&mut contact);

        assert_eq!(contact.user_id, ALICE);
        assert_eq!(contact.storage, ContactStorage::Personal);
        assert_eq!(contact.address_book, None);
    }

    #[test]
    fn populate_unfolds_book_view() {
        let sharing = fixture();
        let mut contact = seeded_contact("c1", BOB, BookRef::Personal);
        contact.storage = ContactStorage::Virtual(VirtualAddress::shared_book(
            ALICE,
            BookRef::Book(BOOK),
        ));

        sharing.populate_contact(&mut contact);

        assert_eq!(contact.user_id, ALICE);
        assert_eq!(contact.storage, ContactStorage::AddressBook);
        assert_eq!(contact.address_book, Some(BOOK));
    }

    #[test]
    fn populate_keeps_legacy_owner() {
        let sharing = fixture();
        let mut contact = seeded_contact("c1", BOB, BookRef::Personal);
        contact.storage =
            ContactStorage::Virtual(VirtualAddress::LegacyBook { book: BOOK });

        sharing.populate_contact(&mut contact);

        // The legacy two-part form has no owner segment; the record owner
        // stays in place.
        assert_eq!(contact.user_id, BOB);
        assert_eq!(contact.storage, ContactStorage::AddressBook);
        assert_eq!(contact.address_book, Some(BOOK));
    }

    #[test]
    fn prepare_write_folds_foreign_storage() {
        let sharing = fixture();
        let mut contact = seeded_contact("c1", ALICE, BookRef::Book(BOOK));

        sharing.prepare_contact_write(&mut contact, BOB);

        assert_eq!(contact.user_id, BOB);
        assert_eq!(
            contact.storage,
            ContactStorage::Virtual(VirtualAddress::shared_book(ALICE, BookRef::Book(BOOK)))
        );
        assert_eq!(contact.address_book, None);
    }

    #[test]
    fn prepare_write_leaves_own_storage_alone() {
        let sharing = fixture();
        let mut contact = seeded_contact("c1", ALICE, BookRef::Book(BOOK));
        let before = contact.clone();

        sharing.prepare_contact_write(&mut contact, ALICE);
        assert_eq!(contact, before);
    }

    #[test]
    fn toggle_moves_between_personal_and_pool() {
        let mut sharing = fixture();
        sharing
            .store_mut()
            .add_contact(seeded_contact("c1", ALICE, BookRef::Personal));
        sharing.store_mut().add_contact(pool_contact("c2", ALICE));
        // A book-stored record is not toggled.
        sharing
            .store_mut()
            .add_contact(seeded_contact("c3", ALICE, BookRef::Book(BOOK)));

        let toggled = sharing
            .toggle_storage(
                ALICE,
                &[
                    ContactId::new("c1"),
                    ContactId::new("c2"),
                    ContactId::new("c3"),
                    ContactId::new("missing"),
                ],
            )
            .unwrap();
        assert_eq!(toggled, 2);

        let c1 = sharing
            .store()
            .contact(&ContactId::new("c1"), ALICE)
            .unwrap()
            .unwrap();
        assert_eq!(c1.storage, ContactStorage::Shared);
        let c2 = sharing
            .store()
            .contact(&ContactId::new("c2"), ALICE)
            .unwrap()
            .unwrap();
        assert_eq!(c2.storage, ContactStorage::Personal);
        let c3 = sharing
            .store()
            .contact(&ContactId::new("c3"), ALICE)
            .unwrap()
            .unwrap();
        assert_eq!(c3.storage, ContactStorage::AddressBook);

        // Each move bumped the counter of the location the record left.
        assert_eq!(
            sharing.store().change_tag(ALICE, SyncScope::Personal).unwrap(),
            1
        );
        assert_eq!(
            sharing
                .store()
                .change_tag(ALICE, SyncScope::SharedPool)
                .unwrap(),
            1
        );
    }
}
