use {
    super::{
        config::BufferConfig,
        error::{self, Result},
        BufferType, Pool, SlotBits, SlotId, TrainKey,
    },
    crate::store::TrainStore,
    common::pub_fields_struct,
    snafu::prelude::*,
    std::io,
    tracing::{debug, info},
};

pub_fields_struct! {
    #[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
    struct Stats {
        hits: u64,
        misses: u64,
        evictions: u64,
        flushes: u64,
    }
}

/// Caches pages and trains of a `TrainStore` in one pool per buffer type.
///
/// `get_train` fixes the returned slot; every call must be paired with a
/// `free_train` before the slot can be evicted again.
pub struct BufferManager<S: TrainStore> {
    config: BufferConfig,
    pools: [Pool; 2],
    frames: [Vec<Vec<u8>>; 2],
    store: S,
    hits: u64,
    misses: u64,
    flushes: u64,
}

impl<S: TrainStore> BufferManager<S> {
    pub fn new(config: BufferConfig, store: S) -> Result<Self> {
        config.validate()?;

        let pool = |buffer_type: BufferType| {
            Pool::new(buffer_type, config.pool(buffer_type), config.use_bulk_flush)
        };
        let frames = |buffer_type: BufferType| {
            let unit = buffer_type.unit_size(config.train_pages);
            vec![vec![0; unit]; config.pool(buffer_type).capacity]
        };

        info!(
            page_pool = config.page_pool.capacity,
            train_pool = config.train_pool.capacity,
            train_pages = config.train_pages,
            "buffer manager initialized"
        );

        let pools = [pool(BufferType::Page)?, pool(BufferType::Train)?];
        let frames = [frames(BufferType::Page), frames(BufferType::Train)];

        Ok(Self {
            config,
            pools,
            frames,
            store,
            hits: 0,
            misses: 0,
            flushes: 0,
        })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn pool(&self, buffer_type: BufferType) -> &Pool {
        &self.pools[buffer_type.index()]
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.pools.iter().map(Pool::evictions).sum(),
            flushes: self.flushes,
        }
    }

    pub fn lookup(&self, key: &TrainKey, buffer_type: BufferType) -> Option<SlotId> {
        self.pool(buffer_type).lookup(key)
    }

    /// Fixes the train in the pool, reading it from the store if it is not
    /// resident, and returns its slot.
    pub fn get_train(&mut self, key: TrainKey, buffer_type: BufferType) -> Result<SlotId> {
        let t = buffer_type.index();

        if let Some(index) = self.pools[t].lookup(&key) {
            self.pools[t].fix(index)?;
            self.pools[t].set_bits(index, SlotBits::REFER)?;
            self.hits += 1;

            return Ok(index);
        }

        let index = {
            let Self {
                pools,
                frames,
                store,
                flushes,
                ..
            } = self;
            let frames = &frames[t];

            let mut flusher = |key: &TrainKey, _: BufferType, slot: SlotId| -> io::Result<()> {
                store.write(key, &frames[slot])?;
                *flushes += 1;
                Ok(())
            };

            pools[t].select_victim(&mut flusher)?
        };

        self.store
            .read(&key, &mut self.frames[t][index])
            .context(error::ReadSnafu { key })?;

        let pool = &mut self.pools[t];
        pool.insert(key, index)?;
        pool.fix(index)?;
        pool.set_bits(index, SlotBits::REFER)?;
        self.misses += 1;

        debug!(%key, slot = index, %buffer_type, "train read into pool");

        Ok(index)
    }

    /// Releases one fix taken by `get_train`.
    pub fn free_train(&mut self, key: &TrainKey, buffer_type: BufferType) -> Result<()> {
        let index = self.resident(key, buffer_type)?;
        self.pools[buffer_type.index()].unfix(index)?;

        Ok(())
    }

    pub fn set_dirty(&mut self, key: &TrainKey, buffer_type: BufferType) -> Result<()> {
        let index = self.resident(key, buffer_type)?;
        self.pools[buffer_type.index()].set_bits(index, SlotBits::DIRTY)
    }

    pub fn frame(&self, buffer_type: BufferType, index: SlotId) -> Result<&[u8]> {
        self.pool(buffer_type).slot(index)?;
        Ok(&self.frames[buffer_type.index()][index])
    }

    pub fn frame_mut(&mut self, buffer_type: BufferType, index: SlotId) -> Result<&mut [u8]> {
        self.pool(buffer_type).slot(index)?;
        Ok(&mut self.frames[buffer_type.index()][index])
    }

    /// Writes the train back if it is dirty.
    pub fn flush_train(&mut self, key: &TrainKey, buffer_type: BufferType) -> Result<()> {
        let index = self.resident(key, buffer_type)?;
        self.flush_slot(buffer_type, index)
    }

    /// Writes back every dirty slot of every pool.
    pub fn flush_all(&mut self) -> Result<()> {
        for buffer_type in BufferType::ALL {
            for index in 0..self.pool(buffer_type).capacity() {
                self.flush_slot(buffer_type, index)?;
            }
        }

        Ok(())
    }

    /// Forgets every resident train without writing anything back.
    pub fn discard_all(&mut self) {
        for pool in self.pools.iter_mut() {
            pool.discard_slots();
        }
        debug!("all pools discarded");
    }

    /// Empties the hash table of every pool, leaving slot metadata alone.
    /// Slots that still carry a train are reused by later `get_train` calls,
    /// with a dirty one written back first.
    pub fn reset_all(&mut self) {
        for pool in self.pools.iter_mut() {
            pool.reset_index();
        }
    }

    /// Flushes and then discards every pool.
    pub fn close(&mut self) -> Result<()> {
        self.flush_all()?;
        self.discard_all();

        info!(stats = ?self.stats(), "buffer manager closed");

        Ok(())
    }

    fn flush_slot(&mut self, buffer_type: BufferType, index: SlotId) -> Result<()> {
        let t = buffer_type.index();
        let slot = self.pools[t].slot(index)?;

        let key = match slot.key() {
            Some(key) if slot.bits().contains(SlotBits::DIRTY) => key,
            _ => return Ok(()),
        };

        self.store
            .write(&key, &self.frames[t][index])
            .map_err(Into::into)
            .context(error::FlushSnafu { key })?;
        self.flushes += 1;

        self.pools[t].clear_bits(index, SlotBits::DIRTY)
    }

    fn resident(&self, key: &TrainKey, buffer_type: BufferType) -> Result<SlotId> {
        self.lookup(key, buffer_type).context(error::NotFoundSnafu {
            key: *key,
            buffer_type,
        })
    }
}
