use serde::{Deserialize, Serialize};

/// Counters for debugging a capture stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDiagnostics {
    pub stream_id: String,
    pub render_callbacks: u64,
    /// Callbacks refused because the stream was closed or busy.
    pub rejected_callbacks: u64,
    pub render_failures: u64,
    pub buffer_allocations: u64,
    pub frames_delivered: u64,
    /// Per-channel scratch region size in bytes.
    pub scratch_buffer_size: u32,
    /// Whole scratch footprint: list header, descriptors and sample data.
    pub scratch_allocated_bytes: u64,
    pub opened_at: Option<String>,
}

impl StreamDiagnostics {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
