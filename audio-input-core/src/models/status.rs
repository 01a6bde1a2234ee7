use std::fmt;

/// Raw status code returned by the platform audio runtime.
///
/// Mirrors Core Audio's `OSStatus`: zero is success, anything else is an
/// error code that is only meaningful to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsStatus(pub i32);

impl OsStatus {
    pub const NO_ERR: OsStatus = OsStatus(0);

    /// Returned by the render handler when the stream is not live.
    pub const RENDER_REJECTED: OsStatus = OsStatus(-1);

    /// `AudioUnitInitialize` fails with this code when called back-to-back on
    /// different voice-processing instances. A second attempt after a short
    /// sleep succeeds.
    pub const INITIALIZE_TRANSIENT: OsStatus = OsStatus(-66635);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Converts a raw status into a `Result`, mapping zero to `Ok`.
    pub fn into_result(self) -> Result<(), OsStatus> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
