//! Contact-type identifiers.
//!
//! The inner integer is `pub`, but callers should prefer [`ContactTypeId::index`]
//! when indexing a `[period][type]` table.

use std::fmt;

/// Index of a contact type (inbound or outbound call class, e-mail, …).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContactTypeId(pub u32);

impl ContactTypeId {
    /// No contact type; the default.
    pub const INVALID: ContactTypeId = ContactTypeId(u32::MAX);

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Every type of a model with `num_types` types, in index order.
    pub fn all(num_types: usize) -> impl Iterator<Item = ContactTypeId> {
        (0..num_types as u32).map(ContactTypeId)
    }
}

impl Default for ContactTypeId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ContactTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "type {}", self.0)
        } else {
            f.write_str("type ?")
        }
    }
}

impl TryFrom<usize> for ContactTypeId {
    type Error = std::num::TryFromIntError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        u32::try_from(k).map(ContactTypeId)
    }
}
