mod telemetry;
pub use telemetry::*;

mod date;
pub use date::*;
