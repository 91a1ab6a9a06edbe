pub mod actions;
pub mod catalog;
pub mod config;
pub mod keywords;
pub mod reconcile;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use catalog::*;
pub use config::*;
pub use keywords::*;
pub use reducer::*;
pub use state::*;
