use {
    snafu::{prelude::*, Backtrace},
    std::io,
    storage::buffer::Error as BufferError,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("Failed with buffer error, source: {}", source))]
    Buffer {
        #[snafu(backtrace)]
        source: BufferError,
    },

    #[snafu(display("Failed to open data directory, source: {}", source))]
    DataDirectory {
        backtrace: Backtrace,
        source: io::Error,
    },

    #[snafu(display("workload must touch at least one page"))]
    EmptyWorkload { backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;
