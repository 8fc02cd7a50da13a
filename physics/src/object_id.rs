/// Opaque 32-bit form of an [`ObjectId`] as stored in the BVH's object-ID array.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=23  : dense `index` of the object in its owner's array
/// - bits 24..=31 : [`ObjectKind`] tag (u8)
///
/// # Invariants
/// - Two different `(kind, index)` pairs must never produce the same packed value.
/// - `index` must fit in 24 bits; [`ObjectId::new`] masks anything above.
///
/// Callers never shift or mask this themselves; go through [`ObjectId`].
pub type PackedObjectId = u32;

const INDEX_BITS: u32 = 24;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Discriminator for the kind of game object a BVH entry refers to.
///
/// The numeric values are part of the packed format. Do not reorder or reuse
/// values.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Slot not written by the fill callback.
    #[default]
    Unassigned = 0,
    Ship = 1,
    Station = 2,
    Asteroid = 3,
    Projectile = 4,
    Debris = 5,
}

impl ObjectKind {
    pub fn from_tag(tag: u8) -> Option<ObjectKind> {
        match tag {
            0 => Some(ObjectKind::Unassigned),
            1 => Some(ObjectKind::Ship),
            2 => Some(ObjectKind::Station),
            3 => Some(ObjectKind::Asteroid),
            4 => Some(ObjectKind::Projectile),
            5 => Some(ObjectKind::Debris),
            _ => None,
        }
    }
}

/// Identifies the game object behind a BVH leaf entry or a rigid body.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub kind: ObjectKind,
    pub index: u32,
}

impl ObjectId {
    /// Largest index representable in the packed form.
    pub const MAX_INDEX: u32 = INDEX_MASK;

    #[inline]
    pub fn new(kind: ObjectKind, index: u32) -> Self {
        debug_assert!(index <= Self::MAX_INDEX, "object index {index} exceeds 24 bits");
        Self {
            kind,
            index: index & INDEX_MASK,
        }
    }

    #[inline]
    pub fn pack(self) -> PackedObjectId {
        ((self.kind as u32) << INDEX_BITS) | (self.index & INDEX_MASK)
    }

    /// Safely unpacks a [`PackedObjectId`].
    ///
    /// Returns `None` if the kind tag is unknown (corruption or a packing rule
    /// from a different build).
    #[inline]
    pub fn try_unpack(packed: PackedObjectId) -> Option<ObjectId> {
        let kind = ObjectKind::from_tag((packed >> INDEX_BITS) as u8)?;
        Some(ObjectId {
            kind,
            index: packed & INDEX_MASK,
        })
    }

    /// Unpacks a value produced by [`ObjectId::pack`]. Unknown tags decode as
    /// [`ObjectKind::Unassigned`].
    #[inline]
    pub fn unpack(packed: PackedObjectId) -> ObjectId {
        Self::try_unpack(packed).unwrap_or(ObjectId {
            kind: ObjectKind::Unassigned,
            index: packed & INDEX_MASK,
        })
    }
}
