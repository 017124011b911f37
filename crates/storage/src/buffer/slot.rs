use {
    super::{SlotId, TrainKey},
    std::{fmt, ops},
};

/// State bits of a slot.
#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct SlotBits(u8);

impl SlotBits {
    pub const EMPTY: SlotBits = SlotBits(0);
    /// Touched since the clock hand last passed.
    pub const REFER: SlotBits = SlotBits(1 << 0);
    /// Modified since it was read; must be written back before reuse.
    pub const DIRTY: SlotBits = SlotBits(1 << 1);

    pub fn contains(self, other: SlotBits) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: SlotBits) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: SlotBits) {
        self.0 &= !other.0;
    }
}

impl ops::BitOr for SlotBits {
    type Output = SlotBits;

    fn bitor(self, rhs: SlotBits) -> SlotBits {
        SlotBits(self.0 | rhs.0)
    }
}

impl fmt::Display for SlotBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let refer = if self.contains(Self::REFER) { 'R' } else { '-' };
        let dirty = if self.contains(Self::DIRTY) { 'D' } else { '-' };

        write!(f, "{}{}", refer, dirty)
    }
}

/// Metadata of one pool element. Page bytes live with the caller.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub(super) key: Option<TrainKey>,
    pub(super) bits: SlotBits,
    pub(super) fixed: u32,
    pub(super) next_hash: Option<SlotId>,
}

impl Slot {
    pub fn key(&self) -> Option<TrainKey> {
        self.key
    }

    pub fn bits(&self) -> SlotBits {
        self.bits
    }

    pub fn fixed(&self) -> u32 {
        self.fixed
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed > 0
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }
}
