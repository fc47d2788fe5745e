//! # Component Signatures
//!
//! A fixed-width bitset with one bit per [`ComponentKind`].
//!
//! The registry keeps one signature per entity slot (which components the
//! entity has) and one per system (which components it requires).

use std::fmt;
use std::ops::{BitAnd, BitOr};

use super::component::{Component, ComponentKind, MAX_COMPONENT_KINDS};

/// Set of component kinds, packed into a single `u64`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u64);

const _: () = assert!(MAX_COMPONENT_KINDS <= u64::BITS as usize);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self(0);

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Returns the signature extended with component `C`.
    ///
    /// # Panics
    ///
    /// Panics if `C` needs a new kind and none are left.
    #[must_use]
    pub fn with<C: Component>(self) -> Self {
        self.with_kind(ComponentKind::of::<C>())
    }

    /// Returns the signature extended with `kind`.
    #[inline]
    #[must_use]
    pub const fn with_kind(self, kind: ComponentKind) -> Self {
        Self(self.0 | (1 << kind.index()))
    }

    /// Sets the bit for `kind`.
    #[inline]
    pub fn insert(&mut self, kind: ComponentKind) {
        self.0 |= 1 << kind.index();
    }

    /// Clears the bit for `kind`.
    #[inline]
    pub fn remove(&mut self, kind: ComponentKind) {
        self.0 &= !(1 << kind.index());
    }

    /// Checks whether the bit for `kind` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, kind: ComponentKind) -> bool {
        (self.0 >> kind.index()) & 1 == 1
    }

    /// Checks whether every kind of `required` is also in `self`.
    ///
    /// This is the system match test: `(entity & system) == system`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw bit representation.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Iterates over the kinds in ascending order.
    ///
    /// Uses `trailing_zeros` to skip clear regions.
    #[must_use]
    pub fn iter(self) -> SignatureIter {
        SignatureIter { remaining: self.0 }
    }
}

impl BitAnd for Signature {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(ComponentKind::index)).finish()
    }
}

impl FromIterator<ComponentKind> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with_kind)
    }
}

impl IntoIterator for Signature {
    type Item = ComponentKind;
    type IntoIter = SignatureIter;

    fn into_iter(self) -> SignatureIter {
        self.iter()
    }
}

/// Iterator over the kinds of a [`Signature`].
pub struct SignatureIter {
    remaining: u64,
}

impl Iterator for SignatureIter {
    type Item = ComponentKind;

    #[inline]
    fn next(&mut self) -> Option<ComponentKind> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros() as usize;
        // Clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(ComponentKind::from_index(bit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SignatureIter {}
