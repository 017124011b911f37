use super::{Slot, SlotId, TrainKey};

/// Outcome of removing a key from the table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(super) enum Removal {
    Removed(SlotId),
    /// The bucket held entries but none matched.
    Unmatched,
    EmptyBucket,
}

/// Maps a train key to the slot holding it.
///
/// Buckets hold the head of a chain; the chain itself is threaded through
/// `Slot::next_hash`, so the table only stores one index per bucket. Newly
/// inserted slots go to the front of their chain.
#[derive(Debug)]
pub(super) struct HashTable {
    heads: Vec<Option<SlotId>>,
}

impl HashTable {
    pub(super) fn new(buckets: usize) -> Self {
        Self {
            heads: vec![None; buckets],
        }
    }

    pub(super) fn buckets(&self) -> usize {
        self.heads.len()
    }

    pub(super) fn bucket(&self, key: &TrainKey) -> usize {
        ((key.vol_no as u64 + key.page_no as u64) % self.heads.len() as u64) as usize
    }

    /// Links `index` at the head of `key`'s chain and stamps the slot with `key`.
    /// The slot must not already be on a chain.
    pub(super) fn insert(&mut self, slots: &mut [Slot], key: TrainKey, index: SlotId) {
        debug_assert!(
            slots[index].key.is_none(),
            "slot {} still carries a key",
            index
        );
        let bucket = self.bucket(&key);

        slots[index].key = Some(key);
        slots[index].next_hash = self.heads[bucket];
        self.heads[bucket] = Some(index);
    }

    pub(super) fn remove(&mut self, slots: &mut [Slot], key: &TrainKey) -> Removal {
        if self.heads[self.bucket(key)].is_none() {
            return Removal::EmptyBucket;
        }

        match self.lookup(slots, key) {
            Some(index) => {
                self.unlink(slots, index);
                Removal::Removed(index)
            }
            None => Removal::Unmatched,
        }
    }

    /// Takes exactly slot `index` off the chain of the key it carries and
    /// clears its key and link. Returns whether the slot was on that chain;
    /// a slot left over from before `clear` is not, and no other slot is
    /// touched.
    pub(super) fn unlink(&mut self, slots: &mut [Slot], index: SlotId) -> bool {
        let linked = match slots[index].key {
            Some(key) => {
                let bucket = self.bucket(&key);
                let mut prev: Option<SlotId> = None;
                let mut cur = self.heads[bucket];

                loop {
                    match cur {
                        Some(i) if i == index => {
                            let next = slots[i].next_hash;
                            match prev {
                                None => self.heads[bucket] = next,
                                Some(p) => slots[p].next_hash = next,
                            }
                            break true;
                        }
                        Some(i) => {
                            prev = cur;
                            cur = slots[i].next_hash;
                        }
                        None => break false,
                    }
                }
            }
            None => false,
        };

        slots[index].key = None;
        slots[index].next_hash = None;

        linked
    }

    pub(super) fn lookup(&self, slots: &[Slot], key: &TrainKey) -> Option<SlotId> {
        let mut cur = self.heads[self.bucket(key)];

        while let Some(i) = cur {
            if slots[i].key.as_ref() == Some(key) {
                return Some(i);
            }
            cur = slots[i].next_hash;
        }

        None
    }

    /// Forgets every chain. Slot links are left as they are and become
    /// unreachable.
    pub(super) fn clear(&mut self) {
        self.heads.fill(None);
    }

    #[cfg(test)]
    pub(super) fn chain(&self, slots: &[Slot], bucket: usize) -> Vec<SlotId> {
        let mut chain = vec![];
        let mut cur = self.heads[bucket];

        while let Some(i) = cur {
            chain.push(i);
            cur = slots[i].next_hash;
        }

        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: usize, buckets: usize) -> (HashTable, Vec<Slot>) {
        (HashTable::new(buckets), vec![Slot::default(); capacity])
    }

    #[test]
    fn hash_is_additive() {
        let (table, _) = setup(1, 7);

        assert_eq!(table.bucket(&TrainKey::new(3, 5)), 1);
        assert_eq!(table.bucket(&TrainKey::new(5, 3)), 1);
        assert_eq!(table.bucket(&TrainKey::new(0, 7)), 0);
    }

    #[test]
    fn hash_does_not_overflow() {
        let (table, _) = setup(1, 13);
        let key = TrainKey::new(u32::MAX, u32::MAX);

        assert_eq!(table.bucket(&key), ((2 * u32::MAX as u64) % 13) as usize);
    }

    #[test]
    fn colliding_keys_chain_newest_first() {
        let (mut table, mut slots) = setup(4, 4);
        let keys = [TrainKey::new(0, 1), TrainKey::new(0, 5), TrainKey::new(1, 8)];

        for (i, key) in keys.iter().enumerate() {
            table.insert(&mut slots, *key, i);
        }

        assert_eq!(table.chain(&slots, 1), vec![2, 1, 0]);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(table.lookup(&slots, key), Some(i));
        }

        // middle of the chain
        assert_eq!(table.remove(&mut slots, &keys[1]), Removal::Removed(1));
        assert_eq!(table.chain(&slots, 1), vec![2, 0]);
        assert_eq!(table.lookup(&slots, &keys[1]), None);
        assert_eq!(table.lookup(&slots, &keys[0]), Some(0));
        assert_eq!(table.lookup(&slots, &keys[2]), Some(2));
        assert_eq!(slots[1].key, None);
        assert_eq!(slots[1].next_hash, None);
    }

    #[test]
    fn remove_relinks_every_position() {
        let (mut table, mut slots) = setup(4, 4);
        let keys = [
            TrainKey::new(0, 2),
            TrainKey::new(1, 5),
            TrainKey::new(2, 8),
            TrainKey::new(3, 11),
        ];
        for (i, key) in keys.iter().enumerate() {
            table.insert(&mut slots, *key, i);
        }
        assert_eq!(table.chain(&slots, 2), vec![3, 2, 1, 0]);

        // tail: predecessor, no successor
        assert_eq!(table.remove(&mut slots, &keys[0]), Removal::Removed(0));
        assert_eq!(table.chain(&slots, 2), vec![3, 2, 1]);

        // head: successor, no predecessor
        assert_eq!(table.remove(&mut slots, &keys[3]), Removal::Removed(3));
        assert_eq!(table.chain(&slots, 2), vec![2, 1]);

        // tail again, then the sole entry
        assert_eq!(table.remove(&mut slots, &keys[1]), Removal::Removed(1));
        assert_eq!(table.remove(&mut slots, &keys[2]), Removal::Removed(2));
        assert!(table.chain(&slots, 2).is_empty());
    }

    #[test]
    fn remove_reports_empty_bucket_and_unmatched_chain() {
        let (mut table, mut slots) = setup(2, 4);

        assert_eq!(
            table.remove(&mut slots, &TrainKey::new(0, 1)),
            Removal::EmptyBucket
        );

        table.insert(&mut slots, TrainKey::new(0, 1), 0);
        assert_eq!(
            table.remove(&mut slots, &TrainKey::new(0, 5)),
            Removal::Unmatched
        );
        assert_eq!(table.chain(&slots, 1), vec![0]);
    }

    #[test]
    fn unlink_after_clear_leaves_live_entries() {
        let (mut table, mut slots) = setup(3, 4);
        let key = TrainKey::new(0, 1);

        table.insert(&mut slots, key, 0);
        table.clear();
        table.insert(&mut slots, key, 1);
        table.insert(&mut slots, TrainKey::new(0, 5), 2);

        // slot 0 still carries `key` but is on no chain
        assert!(!table.unlink(&mut slots, 0));
        assert_eq!(slots[0].key, None);
        assert_eq!(table.chain(&slots, 1), vec![2, 1]);
        assert_eq!(table.lookup(&slots, &key), Some(1));

        assert!(table.unlink(&mut slots, 1));
        assert_eq!(table.chain(&slots, 1), vec![2]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "still carries a key")]
    fn insert_into_keyed_slot_panics() {
        let (mut table, mut slots) = setup(1, 4);

        table.insert(&mut slots, TrainKey::new(0, 1), 0);
        table.insert(&mut slots, TrainKey::new(0, 2), 0);
    }

    #[test]
    fn clear_empties_every_bucket() {
        let (mut table, mut slots) = setup(3, 2);
        for i in 0..3 {
            table.insert(&mut slots, TrainKey::new(1, i as u32), i);
        }

        table.clear();

        for i in 0..3 {
            assert_eq!(table.lookup(&slots, &TrainKey::new(1, i as u32)), None);
        }
        assert_eq!(table.buckets(), 2);
    }
}
