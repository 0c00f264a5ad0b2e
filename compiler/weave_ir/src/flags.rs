//! Per-declaration boolean attributes.

use bitflags::bitflags;

bitflags! {
    /// Flags read from the introspection dump.
    ///
    /// Only a subset applies to each declaration kind; the scanner sets
    /// whichever attributes the record carries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct DeclFlags: u16 {
        /// `virtual` member function.
        const VIRTUAL = 1 << 0;
        /// `= 0` member function. Always combined with `VIRTUAL`.
        const PURE_VIRTUAL = 1 << 1;
        /// `static` member or free declaration.
        const STATIC = 1 << 2;
        /// `const` member function.
        const CONST = 1 << 3;
        /// `explicit` constructor.
        const EXPLICIT = 1 << 4;
        /// Compiler generated (implicit constructors, destructors, `operator=`).
        const ARTIFICIAL = 1 << 5;
        /// Has an exception specification.
        const THROWS = 1 << 6;
        /// `inline` function.
        const INLINE = 1 << 7;
        /// `extern` variable or function.
        const EXTERN = 1 << 8;
        /// `mutable` data member.
        const MUTABLE = 1 << 9;
    }
}

impl Default for DeclFlags {
    fn default() -> Self {
        Self::empty()
    }
}
