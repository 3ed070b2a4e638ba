// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sharing service for personal address books.
//!
//! One user's address book can be shared with other users or whole groups
//! at a chosen access level. This crate owns the behaviour around the
//! persisted grant rows: resolving the effective access a viewer holds on
//! a book when overlapping grants exist, reconciling a desired share list
//! against the stored rows, keeping rows consistent across group and user
//! lifecycle events, and routing a contact's storage field through the
//! virtual addressing scheme.
//!
//! All state lives behind the collaborator contracts of
//! [`sharebook_store`]; [`Sharing`] itself is plain wiring.

mod error;
mod hooks;
mod propagation;
mod reconcile;
mod resolver;
mod router;
#[cfg(test)]
mod test_utils;

pub use error::SharingError;
pub use hooks::{AddressBookItem, Decision, FilterClause, StorageQuery};
pub use propagation::DeletedUserContext;
pub use reconcile::ShareEntry;
pub use resolver::SharedBookEntry;

/// The sharing service.
///
/// Owns the collaborator set (grant store, directory, book registry and
/// contact store, usually one object implementing all four) and exposes the
/// operations the surrounding dispatcher hooks into. Construction is plain
/// wiring; there is no configuration surface.
#[derive(Debug)]
pub struct Sharing<S> {
    store: S,
}

impl<S> Sharing<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
