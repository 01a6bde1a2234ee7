use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Configuration for a capture stream.
///
/// Fixed for the lifetime of a [`CaptureStream`](crate::CaptureStream);
/// every `open` applies it to the hardware unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfiguration {
    /// Capture sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Number of input channels (default: 1). Valid values: 1..=8.
    pub channel_count: u32,

    /// How long `open` waits for the hardware initialization task, in
    /// milliseconds (default: 5000).
    pub init_timeout_ms: u64,

    /// Delay before retrying a transient initialization failure, in
    /// milliseconds (default: 10).
    pub transient_retry_delay_ms: u64,

    /// Name reported for the single virtual capture device.
    pub device_name: String,
}

impl StreamConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if !(1..=8).contains(&self.channel_count) {
            return Err(format!("unsupported channel count: {}", self.channel_count));
        }
        if self.init_timeout_ms == 0 {
            return Err("initialization timeout must be positive".into());
        }
        Ok(())
    }

    /// Parse a JSON configuration, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to parse configuration: {}", e))
        })?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn transient_retry_delay(&self) -> Duration {
        Duration::from_millis(self.transient_retry_delay_ms)
    }

    /// Bytes one render cycle of `frame_count` frames occupies per channel buffer.
    pub fn bytes_for_frames(&self, frame_count: u32) -> usize {
        frame_count as usize * self.channel_count as usize * std::mem::size_of::<f32>()
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channel_count: 1,
            init_timeout_ms: 5000,
            transient_retry_delay_ms: 10,
            device_name: "Default iOS Audio Device".into(),
        }
    }
}

/// Per-open parameters supplied by the owning audio subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDeviceParams {
    /// Drives both hardware echo cancellation and automatic gain control.
    pub use_hardware_echo_cancellation: bool,
}
