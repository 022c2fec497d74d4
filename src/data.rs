//! Small scalar types shared across the engine: a handful of type aliases
//! for the primitive quantities that get passed around, kept separate from
//! the types that use them so every module can depend on them without a
//! cycle.

/// A dense, non-negative "extended index": values below a host mesh's
/// element count name an original element, values at or above it name an
/// element staged in a [`crate::change::MeshAdd`] buffer.
pub type ExtIndex = usize;

/// A 3D position in double precision.
pub type Position = [f64; 3];

/// A unit-length (or near enough) direction vector.
pub type Normal = [f64; 3];

/// The caller-supplied absolute-length tolerance used throughout the engine.
///
/// Stored as `f64` even though one comparison (vertex coincidence; see
/// [`crate::change::MeshAdd::add_vert`]) is intentionally carried out in
/// single precision to match the host mesh's stored vertex precision.
pub type Eps = f64;

/// Per-original-face bitmap recording which operand(s) a face belongs to and
/// whether it was produced by merging two opposed duplicate faces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SideFlags(u8);

impl SideFlags {
    pub const SIDE_A: SideFlags = SideFlags(1 << 0);
    pub const SIDE_B: SideFlags = SideFlags(1 << 1);
    pub const OPP_NORMALS: SideFlags = SideFlags(1 << 2);

    pub const NONE: SideFlags = SideFlags(0);

    pub fn union(self, other: SideFlags) -> SideFlags {
        SideFlags(self.0 | other.0)
    }

    pub fn contains(self, flag: SideFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn intersects(self, flag: SideFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn is_both_sides(self) -> bool {
        self.contains(SideFlags::SIDE_A) && self.contains(SideFlags::SIDE_B)
    }

    /// True for a face the caller's side predicate marked ignored — on
    /// neither operand.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn with(self, flag: SideFlags, value: bool) -> SideFlags {
        if value {
            self.union(flag)
        } else {
            SideFlags(self.0 & !flag.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_contains() {
        let flags = SideFlags::SIDE_A.union(SideFlags::OPP_NORMALS);
        assert!(flags.contains(SideFlags::SIDE_A));
        assert!(flags.contains(SideFlags::OPP_NORMALS));
        assert!(!flags.contains(SideFlags::SIDE_B));
        assert!(!flags.is_both_sides());
    }

    #[test]
    fn both_sides_requires_both_bits() {
        let flags = SideFlags::SIDE_A.union(SideFlags::SIDE_B);
        assert!(flags.is_both_sides());
    }
}
