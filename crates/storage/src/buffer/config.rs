use {
    super::{
        error::{self, Result},
        BufferType,
    },
    common::pub_fields_struct,
    snafu::ensure,
};

pub_fields_struct! {
    /// Sizes of one pool and its hash table.
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    struct PoolConfig {
        capacity: usize,
        buckets: usize,
    }

    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    struct BufferConfig {
        use_bulk_flush: bool,
        page_pool: PoolConfig,
        train_pool: PoolConfig,
        train_pages: usize,
    }
}

impl PoolConfig {
    pub fn new(capacity: usize, buckets: usize) -> Self {
        Self { capacity, buckets }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            use_bulk_flush: false,
            page_pool: PoolConfig::new(64, 67),
            train_pool: PoolConfig::new(16, 17),
            train_pages: 4,
        }
    }
}

impl BufferConfig {
    pub fn pool(&self, buffer_type: BufferType) -> PoolConfig {
        match buffer_type {
            BufferType::Page => self.page_pool,
            BufferType::Train => self.train_pool,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for buffer_type in BufferType::ALL {
            let pool = self.pool(buffer_type);

            ensure!(
                pool.capacity > 0,
                error::InvalidConfigSnafu {
                    details: format!("{} pool capacity must be positive", buffer_type),
                }
            );
            ensure!(
                pool.buckets > 0,
                error::InvalidConfigSnafu {
                    details: format!("{} pool bucket count must be positive", buffer_type),
                }
            );
        }

        ensure!(
            self.train_pages > 0,
            error::InvalidConfigSnafu {
                details: "a train must span at least one page",
            }
        );

        Ok(())
    }
}
