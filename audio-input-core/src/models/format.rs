/// Audio unit bus (element) numbers of an I/O unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    /// Element 0: the speaker side.
    Output = 0,
    /// Element 1: the microphone side.
    Input = 1,
}

impl Bus {
    pub fn element(self) -> u32 {
        self as u32
    }
}

/// Linear PCM stream description, laid out like `AudioStreamBasicDescription`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
    pub bytes_per_frame: u32,
    pub frames_per_packet: u32,
    pub bytes_per_packet: u32,
}

impl StreamFormat {
    /// 32-bit native float, packed and interleaved.
    pub fn float32_packed(sample_rate: u32, channels: u32) -> Self {
        let bytes_per_sample = std::mem::size_of::<f32>() as u32;
        let bytes_per_frame = bytes_per_sample * channels;
        let frames_per_packet = 1;
        Self {
            sample_rate: sample_rate as f64,
            channels_per_frame: channels,
            bits_per_channel: 8 * bytes_per_sample,
            bytes_per_frame,
            frames_per_packet,
            bytes_per_packet: frames_per_packet * bytes_per_frame,
        }
    }
}

/// Render action flags passed through from the hardware runtime untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderActionFlags(pub u32);

/// Timing of a render cycle, copied from the hardware timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioTimestamp {
    pub sample_time: f64,
    pub host_time: u64,
    pub rate_scalar: f64,
    pub word_clock_time: u64,
    pub flags: u32,
}
