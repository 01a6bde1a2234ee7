use crate::models::error::CaptureError;
use crate::models::state::StreamState;

/// Lifecycle notifications for a capture stream.
///
/// Called from whichever thread drives the transition (the caller of `open`,
/// `start`, ... or the initialization thread), never from the render callback.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the stream state changes.
    fn on_state_changed(&self, state: StreamState);

    /// Called when an operation fails.
    fn on_error(&self, error: &CaptureError);
}
