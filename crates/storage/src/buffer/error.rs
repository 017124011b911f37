use {
    super::{BufferType, SlotId, TrainKey},
    snafu::{prelude::*, Backtrace},
    std::io,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("bulk flush mode is not supported by the victim selector"))]
    UnsupportedConfig { backtrace: Backtrace },

    #[snafu(display("no unfixed buffer in the {} pool", buffer_type))]
    NoUnfixedBuffer {
        backtrace: Backtrace,
        buffer_type: BufferType,
    },

    #[snafu(display("bad buffer type {}", raw))]
    BadBufferType { backtrace: Backtrace, raw: u8 },

    #[snafu(display("buffer index {} out of range 0..{}", index, capacity))]
    BadBufferIndex {
        backtrace: Backtrace,
        index: SlotId,
        capacity: usize,
    },

    #[snafu(display("train {} not found in the {} pool", key, buffer_type))]
    NotFound {
        backtrace: Backtrace,
        key: TrainKey,
        buffer_type: BufferType,
    },

    #[snafu(display("failed to flush train {}, source: {}", key, source))]
    Flush {
        key: TrainKey,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[snafu(display("failed to read train {}, source: {}", key, source))]
    Read { key: TrainKey, source: io::Error },

    #[snafu(display("invalid buffer config: {}", details))]
    InvalidConfig {
        backtrace: Backtrace,
        details: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
