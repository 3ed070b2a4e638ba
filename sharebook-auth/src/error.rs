// SPDX-License-Identifier: MIT OR Apache-2.0

use sharebook_core::{AddressError, BookRef, UserId};
use sharebook_store::StoreError;
use thiserror::Error;

/// Errors reported by the sharing service.
///
/// Access denial is never an error; it is a normal
/// [`Decision`](crate::Decision) value. Absent users, books or grants are
/// errors only where an operation names them as a hard precondition.
#[derive(Debug, Error)]
pub enum SharingError {
    /// A required argument was missing; the operation never started.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A share update named a book that does not resolve to the owner.
    #[error("address book {book} of user {owner} not found")]
    BookNotFound { owner: UserId, book: BookRef },

    /// An operation named a user the directory does not know.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
