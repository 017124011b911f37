mod error;
mod simulate;


pub use {
    error::{Error, Result},
    simulate::{inspect, simulate, SlotSummary, Workload},
};
