mod clock;
mod config;
mod error;
mod hash;
mod manager;
mod pool;
mod slot;

pub use self::{
    clock::Flush,
    config::{BufferConfig, PoolConfig},
    error::{Error, Result},
    manager::{BufferManager, Stats},
    pool::Pool,
    slot::{Slot, SlotBits},
};
use {
    crate::{PageNum, VolumeId, PAGE_SIZE},
    common::pub_fields_struct,
    std::fmt,
};

pub type SlotId = usize;

pub_fields_struct! {
    /// Names one persisted page or train.
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    struct TrainKey {
        vol_no: VolumeId,
        page_no: PageNum,
    }
}

impl TrainKey {
    pub fn new(vol_no: VolumeId, page_no: PageNum) -> Self {
        Self { vol_no, page_no }
    }
}

impl fmt::Display for TrainKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.vol_no, self.page_no)
    }
}

/// Selects which pool and hash table an operation targets.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum BufferType {
    Page,
    Train,
}

impl BufferType {
    pub const ALL: [BufferType; 2] = [BufferType::Page, BufferType::Train];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Page => 0,
            Self::Train => 1,
        }
    }

    /// Bytes held by one slot of this type's pool.
    pub fn unit_size(self, train_pages: usize) -> usize {
        match self {
            Self::Page => PAGE_SIZE,
            Self::Train => train_pages * PAGE_SIZE,
        }
    }
}

impl TryFrom<u8> for BufferType {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(Self::Page),
            1 => Ok(Self::Train),
            _ => error::BadBufferTypeSnafu { raw }.fail(),
        }
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::Train => write!(f, "train"),
        }
    }
}
