pub mod clipboard;
pub mod config_io;
pub mod lock;
pub mod logging;
pub mod paths;
pub mod store;
