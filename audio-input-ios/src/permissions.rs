//! iOS microphone record permission.
//!
//! iOS 17 moved record permission to `AVAudioApplication`; older systems
//! answer through `AVAudioSession`. The class is probed at runtime so one
//! build covers both.

use block::ConcreteBlock;
use objc::runtime::{Class, Object, BOOL, YES};
use objc::{msg_send, sel, sel_impl};
use parking_lot::Mutex;

use audio_input_core::traits::permission::{
    PermissionCompletion, PermissionProvider, RecordPermission,
};

use crate::audio_session::shared_session;
use crate::codes::record_permission_from_raw;

/// Record permission backed by AVFAudio.
pub struct AvAudioPermissions;

impl PermissionProvider for AvAudioPermissions {
    fn record_permission(&self) -> RecordPermission {
        let raw: usize = unsafe {
            match Class::get("AVAudioApplication") {
                Some(class) => {
                    let app: *mut Object = msg_send![class, sharedInstance];
                    msg_send![app, recordPermission]
                }
                None => msg_send![shared_session(), recordPermission],
            }
        };
        record_permission_from_raw(raw as u32)
    }

    fn request_record_permission(&self, completion: PermissionCompletion) {
        // The block type must be Fn; the completion runs at most once.
        let completion = Mutex::new(Some(completion));
        let handler = ConcreteBlock::new(move |granted: BOOL| {
            if let Some(done) = completion.lock().take() {
                done(granted == YES);
            }
        })
        .copy();

        unsafe {
            match Class::get("AVAudioApplication") {
                Some(class) => {
                    let _: () =
                        msg_send![class, requestRecordPermissionWithCompletionHandler: &*handler];
                }
                None => {
                    let _: () = msg_send![shared_session(), requestRecordPermission: &*handler];
                }
            }
        }
    }
}
