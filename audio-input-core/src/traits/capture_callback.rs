use std::sync::Arc;

/// One render cycle's worth of captured audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturedAudio<'a> {
    /// Samples of the first channel buffer.
    pub samples: &'a [f32],
    pub frame_count: u32,
    pub channel_count: u32,
    pub sample_rate: u32,
    /// Seconds of audio delivered before this buffer.
    pub stream_time: f64,
    /// Always `false`; overruns are not detected.
    pub overflowed: bool,
}

/// Consumer callback invoked on the real-time audio thread.
///
/// Keep processing minimal: the hardware deadline applies.
pub type OnAudioCaptured = Arc<dyn Fn(&CapturedAudio<'_>) + Send + Sync + 'static>;
