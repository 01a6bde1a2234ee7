//! AVAudioSession configuration.

use std::ptr;

use objc::runtime::{Object, BOOL, NO, YES};
use objc::{class, msg_send, sel, sel_impl};

use audio_input_core::models::status::OsStatus;
use audio_input_core::traits::session::{
    SessionCategory, SessionCategoryOptions, SessionConfigurer,
};

use crate::codes::category_options_to_raw;

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {}

const CATEGORY_PLAY_AND_RECORD: &[u8] = b"AVAudioSessionCategoryPlayAndRecord\0";

/// The process-wide `AVAudioSession`.
pub(crate) fn shared_session() -> *mut Object {
    unsafe { msg_send![class!(AVAudioSession), sharedInstance] }
}

/// Configures the shared audio session for capture.
pub struct AvAudioSessionConfigurer;

impl SessionConfigurer for AvAudioSessionConfigurer {
    fn set_category(
        &self,
        category: SessionCategory,
        options: SessionCategoryOptions,
    ) -> Result<(), OsStatus> {
        let name = match category {
            SessionCategory::PlayAndRecord => CATEGORY_PLAY_AND_RECORD,
        };
        let raw_options = category_options_to_raw(options);

        unsafe {
            let category: *mut Object =
                msg_send![class!(NSString), stringWithUTF8String: name.as_ptr()];
            let mut error: *mut Object = ptr::null_mut();
            let ok: BOOL = msg_send![
                shared_session(),
                setCategory: category
                withOptions: raw_options
                error: &mut error
            ];
            ns_result(ok, error)
        }
    }

    fn set_active(&self, active: bool) -> Result<(), OsStatus> {
        let flag: BOOL = if active { YES } else { NO };
        unsafe {
            let mut error: *mut Object = ptr::null_mut();
            let ok: BOOL = msg_send![shared_session(), setActive: flag error: &mut error];
            ns_result(ok, error)
        }
    }
}

/// Map a `BOOL` + `NSError**` pair to the error's code.
unsafe fn ns_result(ok: BOOL, error: *mut Object) -> Result<(), OsStatus> {
    if ok == YES && error.is_null() {
        return Ok(());
    }
    if error.is_null() {
        return Err(OsStatus(-1));
    }
    let code: isize = msg_send![error, code];
    Err(OsStatus(code as i32))
}
