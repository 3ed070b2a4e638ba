// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{BookId, UserId};

/// Namespace tag of the shared storage addressing scheme.
const SHARED_TAG: &str = "shared";

/// Second segment naming the owner's personal (default) book.
const PERSONAL_SEGMENT: &str = "personal";

const DELIMITER: char = '-';

/// Target of a grant: one owned address book or the owner's personal
/// storage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookRef {
    /// The owner's personal (default) book.
    Personal,

    /// A specific owned book.
    Book(BookId),
}

impl BookRef {
    /// Return true if this refers to the owner's personal book.
    pub fn is_personal(&self) -> bool {
        matches!(self, BookRef::Personal)
    }

    /// Numeric book id, if this is a specific book.
    pub fn book_id(&self) -> Option<BookId> {
        match self {
            BookRef::Personal => None,
            BookRef::Book(id) => Some(*id),
        }
    }
}

impl Display for BookRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookRef::Personal => write!(f, "{}", PERSONAL_SEGMENT),
            BookRef::Book(id) => write!(f, "{}", id),
        }
    }
}

/// Typed form of the string-encoded virtual storage address.
///
/// The string encoding is a stable external format; it is decoded into this
/// type at the boundary and the raw string never travels further inward.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum VirtualAddress {
    /// All books shared with the current user. Resolved dynamically, never
    /// persisted.
    Shared,

    /// One specific shared view of another user's book or personal storage.
    SharedBook { owner: UserId, book: BookRef },

    /// Legacy two-part form: the owner is the implicit current user.
    ///
    /// Previously issued addresses used this shape; new addresses are
    /// always emitted three-part.
    LegacyBook { book: BookId },
}

impl VirtualAddress {
    /// Address of one specific shared view.
    pub fn shared_book(owner: UserId, book: BookRef) -> Self {
        VirtualAddress::SharedBook { owner, book }
    }

    /// Encode into the stable external string form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode the external string form.
    ///
    /// Fails unless the address carries the shared-namespace tag and has
    /// the expected arity; a partial result is never produced.
    pub fn decode(address: &str) -> Result<Self, AddressError> {
        let not_recognized = || AddressError::NotRecognized(address.to_string());

        let segments: Vec<&str> = address.split(DELIMITER).collect();
        if segments.first() != Some(&SHARED_TAG) {
            return Err(not_recognized());
        }

        match segments.as_slice() {
            [_] => Ok(VirtualAddress::Shared),
            [_, book] => {
                let book = BookId(u64::from_str(book).map_err(|_| not_recognized())?);
                Ok(VirtualAddress::LegacyBook { book })
            }
            [_, owner, book] => {
                let owner = UserId(u64::from_str(owner).map_err(|_| not_recognized())?);
                let book = if *book == PERSONAL_SEGMENT {
                    BookRef::Personal
                } else {
                    BookRef::Book(BookId(u64::from_str(book).map_err(|_| not_recognized())?))
                };
                Ok(VirtualAddress::SharedBook { owner, book })
            }
            _ => Err(not_recognized()),
        }
    }
}

impl Display for VirtualAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VirtualAddress::Shared => write!(f, "{}", SHARED_TAG),
            VirtualAddress::SharedBook { owner, book } => {
                write!(f, "{}{}{}{}{}", SHARED_TAG, DELIMITER, owner, DELIMITER, book)
            }
            VirtualAddress::LegacyBook { book } => {
                write!(f, "{}{}{}", SHARED_TAG, DELIMITER, book)
            }
        }
    }
}

impl FromStr for VirtualAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VirtualAddress::decode(s)
    }
}

/// The string is not a well-formed shared storage address.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AddressError {
    /// Wrong namespace tag, wrong arity or a non-numeric segment.
    #[error("not a shared storage address: {0}")]
    NotRecognized(String),
}

#[cfg(test)]
mod tests {
    use crate::identity::{BookId, UserId};

    use super::{AddressError, BookRef, VirtualAddress};

    #[test]
    fn encode_decode_round_trip() {
        let addresses = [
            VirtualAddress::shared_book(UserId(3), BookRef::Personal),
            VirtualAddress::shared_book(UserId(3), BookRef::Book(BookId(17))),
            VirtualAddress::shared_book(UserId(120), BookRef::Book(BookId(1))),
        ];

        for address in addresses {
            assert_eq!(VirtualAddress::decode(&address.encode()), Ok(address));
        }
    }

    #[test]
    fn encoded_forms() {
        assert_eq!(
            VirtualAddress::shared_book(UserId(3), BookRef::Personal).encode(),
            "shared-3-personal"
        );
        assert_eq!(
            VirtualAddress::shared_book(UserId(3), BookRef::Book(BookId(17))).encode(),
            "shared-3-17"
        );
    }

    #[test]
    fn bare_tag_is_the_all_shared_address() {
        assert_eq!(VirtualAddress::decode("shared"), Ok(VirtualAddress::Shared));
    }

    #[test]
    fn legacy_two_part_form() {
        assert_eq!(
            VirtualAddress::decode("shared-42"),
            Ok(VirtualAddress::LegacyBook { book: BookId(42) })
        );
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for address in [
            "",
            "personal",
            "private-3-personal",
            "shared-x-personal",
            "shared-3-banana",
            "shared-3-17-9",
            "shared--",
        ] {
            assert_eq!(
                VirtualAddress::decode(address),
                Err(AddressError::NotRecognized(address.to_string())),
                "expected {:?} to be rejected",
                address
            );
        }
    }
}
