pub mod core;
pub mod engine;
pub mod hotkeys;
pub mod sim;
pub mod video;

pub use engine::{Engine, Host, KeyOutcome};
