use crate::models::format::{AudioTimestamp, Bus, RenderActionFlags, StreamFormat};
use crate::models::status::OsStatus;
use crate::processing::scratch_buffer::ScratchBuffer;
use crate::stream::render::RenderContext;

/// Voice processing properties that back the hardware feature toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceProcessingProperty {
    /// Bypasses echo cancellation when set.
    BypassVoiceProcessing,
    EnableAgc,
}

/// Creates hardware units. Called once per `open`, on the initialization thread.
pub trait HardwareUnitFactory: Send + Sync {
    /// Instantiate a voice-processing capable input/output unit.
    fn instantiate_voice_processing_io(&self) -> Result<Box<dyn HardwareUnit>, OsStatus>;
}

/// A single instantiated input/output unit.
///
/// Dropping the unit disposes the underlying hardware instance and must stop
/// any further render callbacks.
pub trait HardwareUnit: Send {
    /// Enable or disable I/O on one bus.
    fn set_io_enabled(&mut self, bus: Bus, enabled: bool) -> Result<(), OsStatus>;

    /// Set the format the unit delivers on the output scope of `bus`.
    fn set_stream_format(&mut self, bus: Bus, format: &StreamFormat) -> Result<(), OsStatus>;

    /// Register the input callback on the global scope of `bus`.
    ///
    /// The unit must keep `context` alive, at a stable address, until it is
    /// dropped.
    fn set_input_callback(&mut self, bus: Bus, context: RenderContext) -> Result<(), OsStatus>;

    fn initialize(&mut self) -> Result<(), OsStatus>;

    /// Clear transient render state (global scope).
    fn reset(&mut self) -> Result<(), OsStatus>;

    fn start(&mut self) -> Result<(), OsStatus>;

    fn stop(&mut self) -> Result<(), OsStatus>;

    fn set_voice_processing_property(
        &mut self,
        property: VoiceProcessingProperty,
        enabled: bool,
    ) -> Result<(), OsStatus>;

    /// Pull `frame_count` captured frames into `buffers`.
    ///
    /// Called only from the render callback. Must not block.
    fn render(
        &mut self,
        action_flags: &mut RenderActionFlags,
        timestamp: &AudioTimestamp,
        bus: u32,
        frame_count: u32,
        buffers: &mut ScratchBuffer,
    ) -> Result<(), OsStatus>;
}
