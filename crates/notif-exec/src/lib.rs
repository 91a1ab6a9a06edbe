pub mod adapters;
pub mod contracts;
pub mod engine;
pub mod executor;

pub use adapters::*;
pub use contracts::*;
pub use engine::*;
pub use executor::*;
