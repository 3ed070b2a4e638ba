// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for shared address books.
//!
//! This crate holds the plain data types the sharing service operates on:
//! access levels, identity newtypes, the persisted [`Grant`] row and the
//! virtual storage address codec. It does no I/O and owns no state.

mod access;
mod address;
mod grant;
mod identity;

pub use access::{AccessLevel, UnknownAccessLevel};
pub use address::{AddressError, BookRef, VirtualAddress};
pub use grant::{Grant, GrantKey};
pub use identity::{BookId, ContactId, GroupId, Principal, PublicId, TenantId, UserId};
