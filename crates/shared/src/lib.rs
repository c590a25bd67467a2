pub mod api;
pub mod model;
pub mod schedule;
pub mod stats;
pub mod types;

mod utils;
pub use utils::*;
