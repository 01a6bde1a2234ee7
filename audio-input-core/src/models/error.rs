use std::fmt;

use thiserror::Error;

use super::status::OsStatus;

/// Audio session configuration steps performed before hardware setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStep {
    SetCategory,
    Activate,
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SetCategory => "setting audio session category",
            Self::Activate => "setting audio session active",
        };
        f.write_str(label)
    }
}

/// Hardware unit calls that can fail, in the order the stream performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareStep {
    Instantiate,
    EnableInput,
    DisableOutput,
    SetStreamFormat,
    SetInputCallback,
    Initialize,
    InitializeRetry,
    Reset,
    Start,
    Stop,
}

impl fmt::Display for HardwareStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Instantiate => "creating voice processing unit",
            Self::EnableInput => "enabling input",
            Self::DisableOutput => "disabling output",
            Self::SetStreamFormat => "setting output format",
            Self::SetInputCallback => "setting callback",
            Self::Initialize => "initializing audio unit",
            Self::InitializeRetry => "initializing audio unit after retry",
            Self::Reset => "resetting audio unit",
            Self::Start => "starting audio unit",
            Self::Stop => "stopping audio unit",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while driving a capture stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission to record audio was not granted")]
    PermissionDenied,

    #[error("error {status} when {step}")]
    Session { step: SessionStep, status: OsStatus },

    #[error("error {status} when {step}")]
    Hardware { step: HardwareStep, status: OsStatus },

    #[error("timeout waiting for audio unit initialization")]
    Timeout,

    #[error("audio unit initialization was cancelled")]
    Cancelled,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    pub fn hardware(step: HardwareStep, status: OsStatus) -> Self {
        Self::Hardware { step, status }
    }

    pub fn session(step: SessionStep, status: OsStatus) -> Self {
        Self::Session { step, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_step() {
        let err = CaptureError::hardware(HardwareStep::EnableInput, OsStatus(-10851));
        assert_eq!(err.to_string(), "error -10851 when enabling input");

        let err = CaptureError::session(SessionStep::Activate, OsStatus(561017449));
        assert_eq!(
            err.to_string(),
            "error 561017449 when setting audio session active"
        );
    }
}
