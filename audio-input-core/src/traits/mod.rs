pub mod capture_callback;
pub mod capture_delegate;
pub mod hardware;
pub mod permission;
pub mod session;
