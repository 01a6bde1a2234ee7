//! Raw platform constants and their mapping onto core types.
//!
//! Kept free of platform bindings so the mappings build and test on any host.

use audio_input_core::models::status::OsStatus;
use audio_input_core::processing::scratch_buffer::{DESCRIPTOR_BYTES, LIST_HEADER_BYTES};
use audio_input_core::traits::permission::RecordPermission;
use audio_input_core::traits::session::SessionCategoryOptions;

/// `AVAudioSessionRecordPermissionGranted` / `AVAudioApplicationRecordPermissionGranted` ('grnt').
pub const RECORD_PERMISSION_GRANTED: u32 = u32::from_be_bytes(*b"grnt");
/// 'deny'
pub const RECORD_PERMISSION_DENIED: u32 = u32::from_be_bytes(*b"deny");
/// 'undt'
pub const RECORD_PERMISSION_UNDETERMINED: u32 = u32::from_be_bytes(*b"undt");

pub const CATEGORY_OPTION_ALLOW_BLUETOOTH: usize = 0x4;
pub const CATEGORY_OPTION_DEFAULT_TO_SPEAKER: usize = 0x8;

/// `kAudio_ParamError`, reported when no voice processing component exists.
pub const PARAM_ERROR: OsStatus = OsStatus(-50);

pub fn record_permission_from_raw(raw: u32) -> RecordPermission {
    match raw {
        RECORD_PERMISSION_GRANTED => RecordPermission::Granted,
        RECORD_PERMISSION_DENIED => RecordPermission::Denied,
        _ => RecordPermission::Undetermined,
    }
}

pub fn category_options_to_raw(options: SessionCategoryOptions) -> usize {
    let mut raw = 0;
    if options.default_to_speaker {
        raw |= CATEGORY_OPTION_DEFAULT_TO_SPEAKER;
    }
    if options.allow_bluetooth {
        raw |= CATEGORY_OPTION_ALLOW_BLUETOOTH;
    }
    raw
}

/// Size of an `AudioBufferList` with room for `buffers` entries.
///
/// The list struct already embeds its first `AudioBuffer`.
pub fn buffer_list_bytes(buffers: u32) -> usize {
    LIST_HEADER_BYTES + buffers.saturating_sub(1) as usize * DESCRIPTOR_BYTES
}
