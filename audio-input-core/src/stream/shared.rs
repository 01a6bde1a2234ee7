use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::diagnostics::StreamDiagnostics;
use crate::processing::scratch_buffer::ScratchBuffer;
use crate::traits::capture_callback::OnAudioCaptured;
use crate::traits::hardware::HardwareUnit;

/// State touched by the render callback.
///
/// The control plane locks it; the render callback only ever `try_lock`s it.
pub(crate) struct RenderState {
    pub(crate) unit: Option<Box<dyn HardwareUnit>>,
    pub(crate) scratch: ScratchBuffer,
    pub(crate) on_captured: Option<OnAudioCaptured>,
    pub(crate) sample_rate: u32,
    pub(crate) channel_count: u32,
    pub(crate) frames_delivered: u64,
}

/// Counters read by `diagnostics()` without touching the render lock.
#[derive(Default)]
pub(crate) struct RenderCounters {
    pub(crate) render_callbacks: AtomicU64,
    pub(crate) rejected_callbacks: AtomicU64,
    pub(crate) render_failures: AtomicU64,
    pub(crate) frames_delivered: AtomicU64,
    pub(crate) buffer_allocations: AtomicU64,
    pub(crate) scratch_buffer_size: AtomicU32,
    pub(crate) scratch_allocated_bytes: AtomicU64,
}

/// Everything a capture stream shares with its initialization thread and
/// the hardware render callback.
pub(crate) struct StreamShared {
    pub(crate) stream_id: String,
    is_open: AtomicBool,
    is_capturing: AtomicBool,
    pub(crate) render: Mutex<RenderState>,
    pub(crate) counters: RenderCounters,
    /// Never locked by the render path.
    opened_at: Mutex<Option<DateTime<Utc>>>,
}

impl StreamShared {
    pub(crate) fn new(stream_id: String, sample_rate: u32, channel_count: u32) -> Self {
        Self {
            stream_id,
            is_open: AtomicBool::new(false),
            is_capturing: AtomicBool::new(false),
            render: Mutex::new(RenderState {
                unit: None,
                scratch: ScratchBuffer::new(channel_count),
                on_captured: None,
                sample_rate,
                channel_count,
                frames_delivered: 0,
            }),
            counters: RenderCounters::default(),
            opened_at: Mutex::new(None),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub(crate) fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.is_open.store(open, Ordering::SeqCst);
    }

    /// Capturing may only be set while open.
    pub(crate) fn set_capturing(&self, capturing: bool) {
        self.is_capturing
            .store(capturing && self.is_open(), Ordering::SeqCst);
    }

    pub(crate) fn mark_opened(&self) {
        *self.opened_at.lock() = Some(Utc::now());
    }

    /// Mirror the scratch buffer's footprint into the lock-free counters.
    /// Call after every change to `scratch`.
    pub(crate) fn publish_scratch(&self, scratch: &ScratchBuffer) {
        let counters = &self.counters;
        counters
            .buffer_allocations
            .store(scratch.allocation_count(), Ordering::Relaxed);
        counters
            .scratch_buffer_size
            .store(scratch.size_in_bytes(), Ordering::Relaxed);
        counters
            .scratch_allocated_bytes
            .store(scratch.allocated_bytes() as u64, Ordering::Relaxed);
    }

    /// Snapshot of the counters. Does not take the render lock, so polling it
    /// never costs a render cycle.
    pub(crate) fn diagnostics(&self) -> StreamDiagnostics {
        let counters = &self.counters;
        StreamDiagnostics {
            stream_id: self.stream_id.clone(),
            render_callbacks: counters.render_callbacks.load(Ordering::Relaxed),
            rejected_callbacks: counters.rejected_callbacks.load(Ordering::Relaxed),
            render_failures: counters.render_failures.load(Ordering::Relaxed),
            buffer_allocations: counters.buffer_allocations.load(Ordering::Relaxed),
            frames_delivered: counters.frames_delivered.load(Ordering::Relaxed),
            scratch_buffer_size: counters.scratch_buffer_size.load(Ordering::Relaxed),
            scratch_allocated_bytes: counters.scratch_allocated_bytes.load(Ordering::Relaxed),
            opened_at: self.opened_at.lock().map(|t| t.to_rfc3339()),
        }
    }
}
