// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sharebook_core::{BookId, BookRef, ContactId, GroupId, PublicId, TenantId, UserId, VirtualAddress};

/// A user account as known to the directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub public_id: PublicId,
    pub tenant: TenantId,
    pub display_name: String,
    pub super_admin: bool,
}

/// A group as known to the directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tenant: TenantId,
    pub name: String,
}

/// An owned address book as known to the registry.
///
/// The owner's personal storage is implicit and has no registry record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub owner: UserId,
    pub uri: String,
    pub display_name: String,
}

/// The storage classes a contact listing can be filtered by.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum StorageKind {
    Personal,

    /// The tenant-wide shared pool.
    Shared,

    AddressBook,
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StorageKind::Personal => "personal",
            StorageKind::Shared => "shared",
            StorageKind::AddressBook => "addressbook",
        };

        write!(f, "{}", s)
    }
}

/// Logical storage field of a contact record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ContactStorage {
    /// The record owner's personal storage.
    Personal,

    /// The tenant-wide shared pool.
    Shared,

    /// One of the record owner's address books.
    AddressBook,

    /// A shared view of another user's storage. Present when a client
    /// submitted a virtual address; the router rewrites it into plain
    /// fields before downstream logic sees the record.
    Virtual(VirtualAddress),
}

impl ContactStorage {
    /// Storage class of this field, with virtual addresses reported as
    /// their underlying class.
    pub fn kind(&self) -> StorageKind {
        match self {
            ContactStorage::Personal => StorageKind::Personal,
            ContactStorage::Shared => StorageKind::Shared,
            ContactStorage::AddressBook => StorageKind::AddressBook,
            ContactStorage::Virtual(VirtualAddress::SharedBook { book, .. }) => match book {
                BookRef::Personal => StorageKind::Personal,
                BookRef::Book(_) => StorageKind::AddressBook,
            },
            ContactStorage::Virtual(_) => StorageKind::AddressBook,
        }
    }
}

/// A contact record, reduced to the fields the sharing core routes on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,

    /// Owner of the storage the record lives in. Rewritten to the book
    /// owner when a virtual address is unfolded.
    pub user_id: UserId,

    pub tenant: TenantId,
    pub storage: ContactStorage,

    /// Set when the record lives in a specific address book.
    pub address_book: Option<BookId>,
}

/// Key of a sync change counter: one counter per owner and storage
/// location.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SyncScope {
    Personal,
    SharedPool,
    Book(BookId),
}

impl From<BookRef> for SyncScope {
    fn from(book: BookRef) -> Self {
        match book {
            BookRef::Personal => SyncScope::Personal,
            BookRef::Book(id) => SyncScope::Book(id),
        }
    }
}
