pub mod config;
pub mod error;
pub mod filter;
pub mod progress;
pub mod rate;
pub mod storage;

#[cfg(test)]
mod config_test;

pub use config::*;
pub use error::*;
pub use filter::{Direction, FilterParam, FilterState, TransformState};
pub use progress::*;
pub use rate::*;
pub use storage::*;
