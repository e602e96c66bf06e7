//! Index newtypes for pipe cells, cell faces and accumulation zones.
//!
//! A pipeline with `n` cells has `n + 1` faces; face `i` sits between cell
//! `i - 1` and cell `i`, so face 0 is the inlet and face `n` the outlet.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// The following index.
            #[inline]
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }

            /// The preceding index, `None` at zero.
            #[inline]
            pub fn checked_prev(self) -> Option<Self> {
                self.0.checked_sub(1).map(Self)
            }

            /// Iterate over `[0, n)`.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = Self> {
                (0..n).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Index of a pipe section (finite-volume cell).
    ///
    /// ```
    /// use pipeflow::types::CellIndex;
    ///
    /// let cell = CellIndex::new(3);
    /// assert_eq!(cell.get(), 3);
    /// assert_eq!(cell.to_string(), "C3");
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Index of a cell face. Face `i` is the upstream face of cell `i`.
    FaceIndex,
    "F"
);

define_index!(
    /// Index of an accumulation zone in registration order.
    ZoneIndex,
    "Z"
);

impl CellIndex {
    /// Upstream face of this cell.
    #[inline]
    pub fn upstream_face(self) -> FaceIndex {
        FaceIndex(self.0)
    }

    /// Downstream face of this cell.
    #[inline]
    pub fn downstream_face(self) -> FaceIndex {
        FaceIndex(self.0 + 1)
    }
}
