//! CLI command handlers, one file per command.

mod config;
mod status;
pub(crate) mod watch;

pub use config::run_config;
pub use status::run_status;
pub use watch::{run_watch, WatchOptions};
