use {
    super::error::{self, Result},
    rand::prelude::*,
    snafu::{ensure, ResultExt},
    std::{fmt, path::Path},
    storage::{
        buffer::{BufferConfig, BufferManager, BufferType, SlotBits, SlotId, Stats, TrainKey},
        FileStore, TrainStore,
    },
    tracing::info,
};

/// Random page requests against volume 0. Four in five requests go to the
/// first fifth of the pages.
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub requests: u64,
    pub pages: u32,
    pub dirty_percent: u32,
    pub seed: Option<u64>,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            requests: 10_000,
            pages: 512,
            dirty_percent: 20,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    pub index: SlotId,
    pub key: Option<TrainKey>,
    pub bits: SlotBits,
    pub fixed: u32,
}

impl fmt::Display for SlotSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key {
            Some(key) => write!(
                f,
                "slot {:>4}: {} bits {} fixed {}",
                self.index, key, self.bits, self.fixed
            ),
            None => write!(f, "slot {:>4}: empty", self.index),
        }
    }
}

/// Runs the workload over a file store in `data_dir`, closes the pool and
/// returns the final counters.
pub fn simulate(data_dir: &Path, config: BufferConfig, workload: &Workload) -> Result<Stats> {
    let mut manager = open(data_dir, config)?;

    run(&mut manager, workload)?;
    manager.close().context(error::BufferSnafu)?;

    let stats = manager.stats();
    info!(?stats, "simulation finished");

    Ok(stats)
}

/// Runs the workload and reports the page pool as it stood before closing.
pub fn inspect(
    data_dir: &Path,
    config: BufferConfig,
    workload: &Workload,
) -> Result<Vec<SlotSummary>> {
    let mut manager = open(data_dir, config)?;

    run(&mut manager, workload)?;

    let summary = manager
        .pool(BufferType::Page)
        .slots()
        .iter()
        .enumerate()
        .map(|(index, slot)| SlotSummary {
            index,
            key: slot.key(),
            bits: slot.bits(),
            fixed: slot.fixed(),
        })
        .collect();

    manager.close().context(error::BufferSnafu)?;

    Ok(summary)
}

fn open(data_dir: &Path, config: BufferConfig) -> Result<BufferManager<FileStore>> {
    let store = FileStore::new(data_dir).context(error::DataDirectorySnafu)?;
    BufferManager::new(config, store).context(error::BufferSnafu)
}

fn run<S: TrainStore>(manager: &mut BufferManager<S>, workload: &Workload) -> Result<()> {
    ensure!(workload.pages > 0, error::EmptyWorkloadSnafu);

    let mut rng = match workload.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let hot = (workload.pages / 5).max(1);

    for _ in 0..workload.requests {
        let page_no = if rng.gen_bool(0.8) {
            rng.gen_range(0..hot)
        } else {
            rng.gen_range(0..workload.pages)
        };
        let key = TrainKey::new(0, page_no);

        let index = manager
            .get_train(key, BufferType::Page)
            .context(error::BufferSnafu)?;

        if rng.gen_range(0..100) < workload.dirty_percent {
            let frame = manager
                .frame_mut(BufferType::Page, index)
                .context(error::BufferSnafu)?;
            frame[..4].copy_from_slice(&page_no.to_le_bytes());

            manager
                .set_dirty(&key, BufferType::Page)
                .context(error::BufferSnafu)?;
        }

        manager
            .free_train(&key, BufferType::Page)
            .context(error::BufferSnafu)?;
    }

    Ok(())
}
