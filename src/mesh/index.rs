//! Handle types for mesh elements.
//!
//! Elements live in index-stable arenas and are addressed by type-safe handles.
//! A handle is a `u32` slot index with `u32::MAX` reserved as the null value.
//! Elements are never removed from a store, so a handle stays valid for the
//! lifetime of the mesh that issued it.

/// Defines a `u32`-backed handle type with a null sentinel.
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $display:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from a slot index.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large for a handle", index);
                Self(index as u32)
            }

            /// Create a null handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self(u32::MAX)
            }

            /// Get the slot index.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a non-null handle.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.0)
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

pub(crate) use define_handle;

define_handle!(
    /// Handle to a vertex.
    VertexId,
    "V"
);
define_handle!(
    /// Handle to a half-edge.
    HalfEdgeId,
    "HE"
);
define_handle!(
    /// Handle to a face.
    FaceId,
    "F"
);
