pub mod buffer;
pub mod file;
pub mod store;

pub use self::{file::FileStore, store::MemoryStore, store::TrainStore};

pub type VolumeId = u32;
pub type PageNum = u32;

pub const PAGE_SIZE: usize = 1 << 12;
