mod args;
mod ensure;
mod params;
mod resolve;

pub use args::{Args, Command, init_tracing, parse_args};
pub use ensure::{ensure_all, run_ensure};
pub use params::EnsureParams;
pub use resolve::resolve_command;
