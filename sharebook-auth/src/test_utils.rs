// SPDX-License-Identifier: MIT OR Apache-2.0

use sharebook_core::{
    AccessLevel, BookId, BookRef, ContactId, Grant, GroupId, PublicId, TenantId, UserId,
};
use sharebook_store::{Book, Contact, ContactStorage, Group, MemoryStore, User};

use crate::Sharing;

pub const TENANT: TenantId = TenantId(1);
pub const OTHER_TENANT: TenantId = TenantId(2);

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const CAROL: UserId = UserId(3);
pub const DAVE: UserId = UserId(4);
pub const OUTSIDER: UserId = UserId(8);
pub const SUPER_ADMIN: UserId = UserId(9);

pub const TEAM: GroupId = GroupId(7);
pub const OTHER_GROUP: GroupId = GroupId(8);

pub const BOOK: BookId = BookId(10);
pub const SECOND_BOOK: BookId = BookId(11);

pub fn public_id(user: UserId) -> PublicId {
    let name = match user {
        ALICE => "alice@example.org",
        BOB => "bob@example.org",
        CAROL => "carol@example.org",
        DAVE => "dave@example.org",
        OUTSIDER => "outsider@example.net",
        SUPER_ADMIN => "admin@example.net",
        other => panic!("no fixture user with id {}", other),
    };
    PublicId::new(name)
}

fn user(id: UserId, tenant: TenantId, super_admin: bool) -> User {
    User {
        id,
        public_id: public_id(id),
        tenant,
        display_name: public_id(id).as_str().to_string(),
        super_admin,
    }
}

/// A directory with two tenants, a team group (bob and carol) and two
/// books owned by alice.
pub fn store() -> MemoryStore {
    let mut store = MemoryStore::new();

    store.add_user(user(ALICE, TENANT, false));
    store.add_user(user(BOB, TENANT, false));
    store.add_user(user(CAROL, TENANT, false));
    store.add_user(user(DAVE, TENANT, false));
    store.add_user(user(OUTSIDER, OTHER_TENANT, false));
    store.add_user(user(SUPER_ADMIN, OTHER_TENANT, true));

    store.add_group(Group {
        id: TEAM,
        tenant: TENANT,
        name: "team".to_string(),
    });
    store.add_group(Group {
        id: OTHER_GROUP,
        tenant: TENANT,
        name: "designers".to_string(),
    });
    store.add_group_member(TEAM, BOB);
    store.add_group_member(TEAM, CAROL);

    store.add_book(Book {
        id: BOOK,
        owner: ALICE,
        uri: "friends".to_string(),
        display_name: "Friends".to_string(),
    });
    store.add_book(Book {
        id: SECOND_BOOK,
        owner: ALICE,
        uri: "clients".to_string(),
        display_name: "Clients".to_string(),
    });

    store
}

pub fn fixture() -> Sharing<MemoryStore> {
    Sharing::new(store())
}

pub fn grant_row(
    grantee: UserId,
    owner: UserId,
    book: BookRef,
    access: AccessLevel,
    group_id: GroupId,
) -> Grant {
    Grant {
        grantee: public_id(grantee),
        owner,
        book,
        access,
        group_id,
    }
}

/// A contact living in the tenant-wide shared pool.
pub fn pool_contact(id: &str, owner: UserId) -> Contact {
    Contact {
        id: ContactId::new(id),
        user_id: owner,
        tenant: TENANT,
        storage: ContactStorage::Shared,
        address_book: None,
    }
}

/// A contact living in the owner's personal storage or one of their books.
pub fn seeded_contact(id: &str, owner: UserId, book: BookRef) -> Contact {
    let (storage, address_book) = match book {
        BookRef::Personal => (ContactStorage::Personal, None),
        BookRef::Book(book_id) => (ContactStorage::AddressBook, Some(book_id)),
    };
    Contact {
        id: ContactId::new(id),
        user_id: owner,
        tenant: TENANT,
        storage,
        address_book,
    }
}
