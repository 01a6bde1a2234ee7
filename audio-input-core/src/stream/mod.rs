pub mod capture_stream;
pub mod features;
pub(crate) mod initializer;
pub mod permission_gate;
pub mod render;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
