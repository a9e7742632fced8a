pub mod chain_of_thought;
pub mod pipeline;
pub mod stage;

pub use chain_of_thought::*;
pub use pipeline::*;
pub use stage::*;
