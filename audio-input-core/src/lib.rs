//! # audio-input-core
//!
//! Platform-agnostic audio input core library.
//!
//! Drives a microphone capture stream: permission gate, audio session setup,
//! hardware initialization on a background thread with a bounded wait, the
//! real-time render callback and its scratch buffer. Platform backends
//! (iOS VoiceProcessingIO) implement the collaborator traits and plug into
//! the generic `CaptureStream`.
//!
//! ## Architecture
//!
//! ```text
//! audio-input-core (this crate)
//! ├── traits/       ← PermissionProvider, SessionConfigurer, HardwareUnit, CaptureDelegate
//! ├── models/       ← CaptureError, StreamState, StreamConfiguration, OsStatus, etc.
//! ├── processing/   ← ScratchBuffer
//! ├── sync/         ← one-shot cell, cancellation token
//! └── stream/       ← CaptureStream, RenderContext, PermissionGate
//! ```

pub mod models;
pub mod processing;
pub mod stream;
pub mod sync;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureDeviceParams, StreamConfiguration};
pub use models::device::{DeviceDescriptor, HardwareFeature};
pub use models::diagnostics::StreamDiagnostics;
pub use models::error::{CaptureError, HardwareStep, SessionStep};
pub use models::format::{AudioTimestamp, Bus, RenderActionFlags, StreamFormat};
pub use models::state::StreamState;
pub use models::status::OsStatus;
pub use processing::scratch_buffer::{BufferDescriptor, ScratchBuffer};
pub use stream::capture_stream::{AudioPlatform, CaptureStream};
pub use stream::permission_gate::PermissionGate;
pub use stream::render::RenderContext;
pub use traits::capture_callback::{CapturedAudio, OnAudioCaptured};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::hardware::{HardwareUnit, HardwareUnitFactory, VoiceProcessingProperty};
pub use traits::permission::{PermissionCompletion, PermissionProvider, RecordPermission};
pub use traits::session::{SessionCategory, SessionCategoryOptions, SessionConfigurer};
