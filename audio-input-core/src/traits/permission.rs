/// Current record permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordPermission {
    Granted,
    Denied,
    Undetermined,
}

/// Completion handler for an asynchronous permission request.
///
/// May be invoked on any thread. Dropping it without calling it counts as a
/// denial.
pub type PermissionCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform microphone authorization.
///
/// Implemented by:
/// - `AvAudioPermissions` (iOS)
pub trait PermissionProvider: Send + Sync {
    /// Synchronous query of the current authorization status.
    fn record_permission(&self) -> RecordPermission;

    /// Ask the platform for record permission.
    ///
    /// Must return without waiting for the user; the answer arrives through
    /// `completion`.
    fn request_record_permission(&self, completion: PermissionCompletion);
}
