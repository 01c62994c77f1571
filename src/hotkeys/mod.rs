pub mod dispatcher;
pub mod events;
pub mod gate;


pub use dispatcher::*;
pub use events::*;
pub use gate::*;
