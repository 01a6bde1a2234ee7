pub mod scratch_buffer;
