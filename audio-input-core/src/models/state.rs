/// Capture stream state machine.
///
/// State transitions:
/// ```text
/// closed → opening → open ⇄ capturing
///    ↑                 │        │
///    └──── close / abort ───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
    Closed,
    Opening,
    Open,
    Capturing,
}

impl StreamState {
    /// Open or capturing. A capturing stream is always open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::Capturing)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub(crate) fn from_flags(is_open: bool, is_capturing: bool) -> Self {
        match (is_open, is_capturing) {
            (true, true) => Self::Capturing,
            (true, false) => Self::Open,
            _ => Self::Closed,
        }
    }
}
