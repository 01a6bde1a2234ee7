pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod state;
pub mod status;
