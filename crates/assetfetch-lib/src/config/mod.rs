mod builtin;
mod loader;
mod model;

pub use builtin::{BUFFALO_L_ID, BUFFALO_L_URL, buffalo_l};
pub use loader::load_config;
pub use model::{Config, DEFAULT_GOOGLE_DRIVE_ENDPOINT, TransportConfig};
