use super::{BufferType, Slot, SlotBits, SlotId, TrainKey};

/// Writes a slot's contents back to storage before the slot is reused.
pub trait Flush {
    type Error: std::error::Error + Send + Sync + 'static;

    fn flush(
        &mut self,
        key: &TrainKey,
        buffer_type: BufferType,
        slot: SlotId,
    ) -> Result<(), Self::Error>;
}

impl<F, E> Flush for F
where
    F: FnMut(&TrainKey, BufferType, SlotId) -> Result<(), E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn flush(&mut self, key: &TrainKey, buffer_type: BufferType, slot: SlotId) -> Result<(), E> {
        self(key, buffer_type, slot)
    }
}

/// Second chance sweep starting at `start`.
///
/// Fixed slots are passed over untouched. An unfixed slot with REFER set loses
/// the bit and is passed over; the first unfixed slot without it is returned.
/// At most two full revolutions are made, so every unfixed slot is either
/// cleared on the first pass and taken on the second, or none exists.
///
/// Bits cleared during a sweep that finds nothing stay cleared.
pub(super) fn sweep(slots: &mut [Slot], start: SlotId) -> Option<SlotId> {
    let capacity = slots.len();
    let mut victim = start;

    for _ in 0..capacity * 2 {
        let slot = &mut slots[victim];

        if !slot.is_fixed() {
            if slot.bits.contains(SlotBits::REFER) {
                slot.bits.remove(SlotBits::REFER);
            } else {
                return Some(victim);
            }
        }

        victim = (victim + 1) % capacity;
    }

    None
}
