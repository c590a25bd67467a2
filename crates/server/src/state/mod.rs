mod state;
pub use state::*;

mod args;
pub use args::*;

mod http_client;
pub use http_client::*;
