//! Arena indices for declarations and types.
//!
//! Both ids are dense `u32` indices into the vectors owned by a
//! [`DeclarationGraph`](crate::DeclarationGraph). They are only meaningful
//! for the graph that produced them.

/// Macro to define `u32` arena index newtypes.
///
/// Each generated type has:
/// - `new()`, `raw()`, `index()` and `from_index()` helpers
/// - `Debug` showing the index as `TypeName(n)`
/// - Ordering by index, so sorted id lists follow arena order
#[macro_export]
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Create an id from a `Vec` position.
            #[inline]
            #[allow(clippy::cast_possible_truncation, reason = "arenas never exceed u32::MAX entries")]
            pub const fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    )* };
}

define_id!(
    /// Index of a declaration in a [`DeclarationGraph`](crate::DeclarationGraph).
    DeclId,
    /// Index of a type in a [`DeclarationGraph`](crate::DeclarationGraph).
    TypeId,
);
