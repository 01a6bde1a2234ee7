//! Real-time render callback handler.
//!
//! Runs on the hardware's I/O thread. Never blocks: render state is only
//! `try_lock`ed, and a cycle that finds the control plane holding it is
//! rejected. The only allocation is scratch buffer growth when the host
//! raises its frame count.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use crate::models::format::{AudioTimestamp, RenderActionFlags};
use crate::models::status::OsStatus;
use crate::traits::capture_callback::CapturedAudio;

use super::shared::StreamShared;

/// Capability handed to the hardware unit when its input callback is
/// registered.
///
/// Holds only a weak reference, so a registered unit never keeps its stream
/// alive. Clone it into a stable heap location before passing its address
/// to the platform.
#[derive(Clone)]
pub struct RenderContext {
    shared: Weak<StreamShared>,
}

impl RenderContext {
    pub(crate) fn new(shared: &Arc<StreamShared>) -> Self {
        Self {
            shared: Arc::downgrade(shared),
        }
    }

    /// Render entry point.
    ///
    /// Returns [`OsStatus::RENDER_REJECTED`] when the stream is gone, closed
    /// or being torn down. Render failures are logged and reported to the
    /// hardware as success so its calling loop stays stable.
    pub fn on_render(
        &self,
        action_flags: &mut RenderActionFlags,
        timestamp: &AudioTimestamp,
        bus: u32,
        frame_count: u32,
    ) -> OsStatus {
        match self.shared.upgrade() {
            Some(shared) => render_cycle(&shared, action_flags, timestamp, bus, frame_count),
            None => OsStatus::RENDER_REJECTED,
        }
    }
}

fn render_cycle(
    shared: &StreamShared,
    action_flags: &mut RenderActionFlags,
    timestamp: &AudioTimestamp,
    bus: u32,
    frame_count: u32,
) -> OsStatus {
    let counters = &shared.counters;
    counters.render_callbacks.fetch_add(1, Ordering::Relaxed);

    if !shared.is_open() {
        return reject(shared);
    }
    let Some(mut guard) = shared.render.try_lock() else {
        return reject(shared);
    };
    let state = &mut *guard;
    let Some(unit) = state.unit.as_mut() else {
        return reject(shared);
    };

    let needed = frame_count as u64 * state.channel_count as u64 * std::mem::size_of::<f32>() as u64;
    let Ok(needed) = u32::try_from(needed) else {
        log::error!(
            "[{}] Render request of {} frames exceeds scratch buffer limits",
            shared.stream_id,
            frame_count
        );
        return reject(shared);
    };

    if state.scratch.ensure_capacity(needed) {
        shared.publish_scratch(&state.scratch);
    }
    state.scratch.set_data_byte_sizes(needed);

    if let Err(status) = unit.render(action_flags, timestamp, bus, frame_count, &mut state.scratch) {
        log::error!(
            "[{}] Unable to process audio unit render callback for capture device: {}",
            shared.stream_id,
            status
        );
        counters.render_failures.fetch_add(1, Ordering::Relaxed);
        return OsStatus::NO_ERR;
    }

    let stream_time = state.frames_delivered as f64 / state.sample_rate as f64;
    state.frames_delivered += frame_count as u64;
    counters
        .frames_delivered
        .fetch_add(frame_count as u64, Ordering::Relaxed);

    // Only the first channel buffer is forwarded.
    if let (Some(on_captured), Some(samples)) = (state.on_captured.as_ref(), state.scratch.channel(0)) {
        on_captured(&CapturedAudio {
            samples,
            frame_count,
            channel_count: state.channel_count,
            sample_rate: state.sample_rate,
            stream_time,
            overflowed: false,
        });
    }

    OsStatus::NO_ERR
}

fn reject(shared: &StreamShared) -> OsStatus {
    shared
        .counters
        .rejected_callbacks
        .fetch_add(1, Ordering::Relaxed);
    OsStatus::RENDER_REJECTED
}
