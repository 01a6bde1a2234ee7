use std::sync::Arc;

use crate::sync::one_shot::one_shot;
use crate::traits::permission::{PermissionProvider, RecordPermission};

/// Blocks the calling thread until microphone permission is known.
pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
}

impl PermissionGate {
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self { provider }
    }

    /// Returns immediately when permission is already granted. Otherwise
    /// requests it and waits, without a timeout, for the platform's answer.
    pub fn ensure_permission(&self) -> bool {
        if self.provider.record_permission() == RecordPermission::Granted {
            return true;
        }

        log::warn!("Permission to record audio is not granted. Requesting permission...");

        let (tx, rx) = one_shot();
        self.provider
            .request_record_permission(Box::new(move |granted| tx.send(granted)));

        match rx.recv() {
            Ok(true) => {
                log::warn!("Permission to record audio was granted. Opening capture stream...");
                true
            }
            Ok(false) => {
                log::error!("Permission to record audio was not granted");
                false
            }
            Err(_) => {
                log::error!("Permission request finished without an answer; treating as denied");
                false
            }
        }
    }
}
