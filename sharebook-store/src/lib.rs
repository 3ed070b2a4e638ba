// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator contracts the sharing core consumes, plus in-memory
//! implementations.
//!
//! The sharing service talks to four external collaborators: the grant
//! store (the one table the core owns), the user/group directory, the
//! address-book registry and the contact store. Each is a plain trait here;
//! [`MemoryStore`] implements all four and backs the test suite and
//! embedders that bring no persistence of their own.

mod memory;
mod traits;
mod types;

pub use memory::MemoryStore;
pub use traits::{
    BookRegistry, ContactStore, Directory, GrantStore, StoreError, TransactionalGrantStore,
};
pub use types::{Book, Contact, ContactStorage, Group, StorageKind, SyncScope, User};
