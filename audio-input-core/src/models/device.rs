use serde::{Deserialize, Serialize};

/// Read-only description of the capture device backing a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub device_name: String,
    pub input_channels: u32,
    pub preferred_sample_rate: u32,
}

/// Optional hardware-assist capabilities of the voice processing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareFeature {
    EchoCancellation,
    AutomaticGainControl,
}
