//! # audio-input-ios
//!
//! iOS backend for audio-input-core.
//!
//! Provides:
//! - `AvAudioPermissions`: record permission via AVAudioApplication (iOS 17+)
//!   or AVAudioSession
//! - `AvAudioSessionConfigurer`: play-and-record session category and activation
//! - `VoiceProcessingIoFactory`: VoiceProcessingIO audio unit instances
//!
//! ## Platform Requirements
//! - iOS 13+; AVAudioApplication is used when present at runtime
//! - `NSMicrophoneUsageDescription` in the host app's Info.plist
//!
//! ## Usage
//! ```ignore
//! use audio_input_core::{CaptureDeviceParams, CaptureStream, StreamConfiguration};
//!
//! let platform = audio_input_ios::platform();
//! let mut stream = CaptureStream::new(StreamConfiguration::default(), platform)?;
//! stream.open(CaptureDeviceParams::default(), on_captured, 256)?;
//! stream.start()?;
//! ```

pub mod codes;

#[cfg(target_os = "ios")]
pub mod audio_session;
#[cfg(target_os = "ios")]
pub mod permissions;
#[cfg(target_os = "ios")]
pub mod voice_processing_io;

#[cfg(target_os = "ios")]
pub use audio_session::AvAudioSessionConfigurer;
#[cfg(target_os = "ios")]
pub use permissions::AvAudioPermissions;
#[cfg(target_os = "ios")]
pub use voice_processing_io::{VoiceProcessingIoFactory, VoiceProcessingIoUnit};

/// Collaborators backed by the real iOS audio stack.
#[cfg(target_os = "ios")]
pub fn platform() -> audio_input_core::AudioPlatform {
    use std::sync::Arc;

    audio_input_core::AudioPlatform {
        permissions: Arc::new(AvAudioPermissions),
        session: Arc::new(AvAudioSessionConfigurer),
        hardware: Arc::new(VoiceProcessingIoFactory),
    }
}
