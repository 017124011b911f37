use {
    super::{
        clock::{self, Flush},
        config::PoolConfig,
        error::{self, Result},
        hash::{HashTable, Removal},
        BufferType, Slot, SlotBits, SlotId, TrainKey,
    },
    snafu::prelude::*,
    tracing::{debug, warn},
};

/// Fixed-capacity array of slots for one buffer type, the clock hand that
/// sweeps it and the hash table that maps keys onto it.
///
/// All relations between slots are indices into the array. The pool does no
/// locking; callers sharing a pool must serialize access to it.
#[derive(Debug)]
pub struct Pool {
    buffer_type: BufferType,
    slots: Vec<Slot>,
    table: HashTable,
    next_victim: SlotId,
    use_bulk_flush: bool,
    evictions: u64,
}

impl Pool {
    pub fn new(buffer_type: BufferType, config: PoolConfig, use_bulk_flush: bool) -> Result<Self> {
        ensure!(
            config.capacity > 0 && config.buckets > 0,
            error::InvalidConfigSnafu {
                details: format!(
                    "{} pool needs a positive capacity and bucket count, got {:?}",
                    buffer_type, config
                ),
            }
        );

        Ok(Self {
            buffer_type,
            slots: vec![Slot::default(); config.capacity],
            table: HashTable::new(config.buckets),
            next_victim: 0,
            use_bulk_flush,
            evictions: 0,
        })
    }

    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn buckets(&self) -> usize {
        self.table.buckets()
    }

    pub fn next_victim(&self) -> SlotId {
        self.next_victim
    }

    /// Number of resident trains pushed out by `select_victim`.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: SlotId) -> Result<&Slot> {
        self.check_index(index)?;
        Ok(&self.slots[index])
    }

    /// Picks a slot to hold a new train using the second chance algorithm.
    ///
    /// If the victim holds a train, dirty contents are handed to `flusher`,
    /// its bits are cleared, the clock hand moves past it and its mapping is
    /// removed. A failed flush leaves the victim's metadata and the hand
    /// untouched. Only the victim's own chain entry is unlinked, so a stale
    /// key left by `reset_index` never disturbs another slot. The returned
    /// slot has no identity; the caller inserts one once the new contents are
    /// in place.
    pub fn select_victim<F: Flush>(&mut self, flusher: &mut F) -> Result<SlotId> {
        ensure!(!self.use_bulk_flush, error::UnsupportedConfigSnafu);

        let victim = clock::sweep(&mut self.slots, self.next_victim).context(
            error::NoUnfixedBufferSnafu {
                buffer_type: self.buffer_type,
            },
        )?;

        if let Some(key) = self.slots[victim].key {
            if self.slots[victim].bits.contains(SlotBits::DIRTY) {
                debug!(%key, slot = victim, buffer_type = %self.buffer_type, "flushing victim");

                flusher
                    .flush(&key, self.buffer_type, victim)
                    .map_err(Into::into)
                    .context(error::FlushSnafu { key })?;
            }

            self.slots[victim].bits = SlotBits::EMPTY;
            self.next_victim = (victim + 1) % self.capacity();
            if !self.table.unlink(&mut self.slots, victim) {
                debug!(%key, slot = victim, buffer_type = %self.buffer_type, "victim was not indexed");
            }
            self.evictions += 1;
        }

        debug!(slot = victim, buffer_type = %self.buffer_type, "victim selected");

        Ok(victim)
    }

    /// Maps `key` to `index`. Whatever the slot held before is unlinked
    /// first; other slots are never touched. Mapping one key to two slots is
    /// not checked.
    pub fn insert(&mut self, key: TrainKey, index: SlotId) -> Result<()> {
        self.check_index(index)?;

        self.table.unlink(&mut self.slots, index);

        self.table.insert(&mut self.slots, key, index);
        debug!(%key, slot = index, buffer_type = %self.buffer_type, "hash entry inserted");

        Ok(())
    }

    /// Unmaps `key`. Only an empty bucket counts as not found; a bucket whose
    /// chain has no match is left alone and reported as success.
    pub fn delete(&mut self, key: &TrainKey) -> Result<()> {
        match self.table.remove(&mut self.slots, key) {
            Removal::Removed(index) => {
                debug!(%key, slot = index, buffer_type = %self.buffer_type, "hash entry deleted");
                Ok(())
            }
            Removal::Unmatched => {
                debug!(%key, buffer_type = %self.buffer_type, "no hash entry to delete");
                Ok(())
            }
            Removal::EmptyBucket => error::NotFoundSnafu {
                key: *key,
                buffer_type: self.buffer_type,
            }
            .fail(),
        }
    }

    pub fn lookup(&self, key: &TrainKey) -> Option<SlotId> {
        self.table.lookup(&self.slots, key)
    }

    /// Empties every bucket. Slot metadata is kept; a slot still carrying its
    /// old key is simply unindexed until it is reused.
    pub fn reset_index(&mut self) {
        self.table.clear();
    }

    /// Forgets every slot's train and state, then empties the index. Fixed
    /// counts are dropped too.
    pub fn discard_slots(&mut self) {
        self.slots.iter_mut().for_each(Slot::reset);
        self.table.clear();
        self.next_victim = 0;
    }

    pub fn set_bits(&mut self, index: SlotId, bits: SlotBits) -> Result<()> {
        self.check_index(index)?;
        self.slots[index].bits.insert(bits);
        Ok(())
    }

    pub fn clear_bits(&mut self, index: SlotId, bits: SlotBits) -> Result<()> {
        self.check_index(index)?;
        self.slots[index].bits.remove(bits);
        Ok(())
    }

    /// Pins the slot and returns its new fixed count.
    pub fn fix(&mut self, index: SlotId) -> Result<u32> {
        self.check_index(index)?;

        let slot = &mut self.slots[index];
        slot.fixed += 1;

        Ok(slot.fixed)
    }

    /// Releases one pin and returns the new fixed count.
    pub fn unfix(&mut self, index: SlotId) -> Result<u32> {
        self.check_index(index)?;

        let slot = &mut self.slots[index];
        if slot.fixed == 0 {
            warn!(slot = index, buffer_type = %self.buffer_type, "unfixing a slot that is not fixed");
        } else {
            slot.fixed -= 1;
        }

        Ok(slot.fixed)
    }

    fn check_index(&self, index: SlotId) -> Result<()> {
        ensure!(
            index < self.capacity(),
            error::BadBufferIndexSnafu {
                index,
                capacity: self.capacity(),
            }
        );
        Ok(())
    }
}
