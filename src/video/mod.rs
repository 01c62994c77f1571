pub mod discovery;
pub mod feedback;
pub mod player;
pub mod registry;
pub mod timers;

pub use discovery::*;
pub use feedback::*;
pub use player::*;
pub use registry::*;
pub use timers::*;
