use std::sync::Arc;

use crate::models::config::{CaptureDeviceParams, StreamConfiguration};
use crate::models::device::{DeviceDescriptor, HardwareFeature};
use crate::models::diagnostics::StreamDiagnostics;
use crate::models::error::{CaptureError, HardwareStep, SessionStep};
use crate::models::format::StreamFormat;
use crate::models::state::StreamState;
use crate::models::status::OsStatus;
use crate::sync::cancellation::CancellationToken;
use crate::sync::one_shot::{one_shot, RecvError};
use crate::traits::capture_callback::OnAudioCaptured;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::hardware::HardwareUnitFactory;
use crate::traits::permission::PermissionProvider;
use crate::traits::session::{SessionCategory, SessionCategoryOptions, SessionConfigurer};

use super::features::apply_feature;
use super::initializer::InitializationTask;
use super::permission_gate::PermissionGate;
use super::shared::StreamShared;

/// Platform collaborators a capture stream drives.
#[derive(Clone)]
pub struct AudioPlatform {
    pub permissions: Arc<dyn PermissionProvider>,
    pub session: Arc<dyn SessionConfigurer>,
    pub hardware: Arc<dyn HardwareUnitFactory>,
}

/// Microphone capture stream.
///
/// Owns the hardware unit and the scratch buffer the render callback fills.
/// Control operations take `&mut self`, so open/start/stop/close on one
/// stream are serialized by construction; the render callback reaches the
/// stream through a [`RenderContext`](super::render::RenderContext).
///
/// ```text
/// [open] → permission gate → audio session → init thread ─┐
///                                                          ├→ open
/// [caller] ──────────── bounded wait on outcome ──────────┘
/// [start] → hardware → render callback → scratch buffer → on_captured
/// ```
pub struct CaptureStream {
    config: StreamConfiguration,
    platform: AudioPlatform,
    permission_gate: PermissionGate,
    shared: Arc<StreamShared>,
    pending_init: Option<CancellationToken>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl CaptureStream {
    pub fn new(config: StreamConfiguration, platform: AudioPlatform) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let stream_id = uuid::Uuid::new_v4().to_string();
        let shared = Arc::new(StreamShared::new(
            stream_id,
            config.sample_rate,
            config.channel_count,
        ));

        Ok(Self {
            permission_gate: PermissionGate::new(Arc::clone(&platform.permissions)),
            config,
            platform,
            shared,
            pending_init: None,
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn id(&self) -> &str {
        &self.shared.stream_id
    }

    pub fn state(&self) -> StreamState {
        StreamState::from_flags(self.shared.is_open(), self.shared.is_capturing())
    }

    pub fn is_stream_open(&self) -> bool {
        self.shared.is_open()
    }

    pub fn is_capturing(&self) -> bool {
        self.shared.is_capturing()
    }

    /// Stream time is not tracked at this level.
    pub fn stream_time(&self) -> f64 {
        0.0
    }

    /// The single virtual capture device. Every index maps to it.
    pub fn capture_device_info(&self, _index: usize) -> DeviceDescriptor {
        DeviceDescriptor {
            device_name: self.config.device_name.clone(),
            input_channels: self.config.channel_count,
            preferred_sample_rate: self.config.sample_rate,
        }
    }

    /// Always exactly one device.
    pub fn input_devices(&self) -> Vec<DeviceDescriptor> {
        vec![self.capture_device_info(0)]
    }

    pub fn diagnostics(&self) -> StreamDiagnostics {
        self.shared.diagnostics()
    }

    /// Open the stream. Transitions: closed → opening → open.
    ///
    /// Blocks on the permission prompt (no timeout) and then on hardware
    /// initialization (bounded by `init_timeout_ms`). Opening an already open
    /// stream succeeds without touching the hardware.
    pub fn open(
        &mut self,
        params: CaptureDeviceParams,
        on_captured: OnAudioCaptured,
        frames_desired: u32,
    ) -> Result<(), CaptureError> {
        if self.is_stream_open() {
            log::error!(
                "[{}] Unable to open capture stream because it is already open",
                self.id()
            );
            return Ok(());
        }

        self.notify_state(StreamState::Opening);

        match self.open_inner(params, on_captured, frames_desired) {
            Ok(()) => {
                log::info!(
                    "[{}] Capture stream open ({} Hz, {} ch)",
                    self.id(),
                    self.config.sample_rate,
                    self.config.channel_count
                );
                self.notify_state(StreamState::Open);
                Ok(())
            }
            Err(e) => {
                self.force_closed();
                self.report(&e);
                self.notify_state(StreamState::Closed);
                Err(e)
            }
        }
    }

    fn open_inner(
        &mut self,
        params: CaptureDeviceParams,
        on_captured: OnAudioCaptured,
        frames_desired: u32,
    ) -> Result<(), CaptureError> {
        if !self.permission_gate.ensure_permission() {
            return Err(CaptureError::PermissionDenied);
        }

        {
            let mut state = self.shared.render.lock();
            state.on_captured = Some(on_captured);
            state.sample_rate = self.config.sample_rate;
            state.channel_count = self.config.channel_count;
            state.frames_delivered = 0;
            state.scratch.set_channel_count(self.config.channel_count);
            self.shared.publish_scratch(&state.scratch);
        }

        self.configure_session()?;
        self.presize_scratch(frames_desired);

        let token = CancellationToken::new();
        let (outcome_tx, outcome_rx) = one_shot();
        InitializationTask {
            factory: Arc::clone(&self.platform.hardware),
            shared: Arc::clone(&self.shared),
            format: StreamFormat::float32_packed(self.config.sample_rate, self.config.channel_count),
            params,
            retry_delay: self.config.transient_retry_delay(),
            token: token.clone(),
        }
        .spawn(outcome_tx)?;
        self.pending_init = Some(token);

        match outcome_rx.recv_timeout(self.config.init_timeout()) {
            Ok(outcome) => {
                self.pending_init = None;
                outcome
            }
            Err(RecvError::Timeout) => {
                log::error!(
                    "[{}] Timeout waiting for audio unit initialization after {:?}",
                    self.id(),
                    self.config.init_timeout()
                );
                Err(CaptureError::Timeout)
            }
            Err(RecvError::Disconnected) => Err(CaptureError::Unknown(
                "initialization thread exited without reporting".into(),
            )),
        }
    }

    fn configure_session(&self) -> Result<(), CaptureError> {
        let session = &self.platform.session;
        session
            .set_category(SessionCategory::PlayAndRecord, SessionCategoryOptions::capture())
            .map_err(|status| self.session_failed(SessionStep::SetCategory, status))?;
        session
            .set_active(true)
            .map_err(|status| self.session_failed(SessionStep::Activate, status))?;
        Ok(())
    }

    fn session_failed(&self, step: SessionStep, status: OsStatus) -> CaptureError {
        let error = CaptureError::session(step, status);
        log::error!("[{}] Unable to open capture stream due to {}", self.id(), error);
        error
    }

    /// Size the scratch buffer for the caller's expected frame count so the
    /// render callback normally starts without allocating.
    fn presize_scratch(&self, frames_desired: u32) {
        if frames_desired == 0 {
            return;
        }
        match u32::try_from(self.config.bytes_for_frames(frames_desired)) {
            Ok(bytes) => {
                let mut state = self.shared.render.lock();
                state.scratch.allocate(bytes);
                self.shared.publish_scratch(&state.scratch);
            }
            Err(_) => log::warn!(
                "[{}] Ignoring oversized frames_desired {}",
                self.id(),
                frames_desired
            ),
        }
    }

    /// Start capture. Transitions: open → capturing.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        let result = {
            let mut state = self.shared.render.lock();
            match state.unit.as_mut() {
                Some(unit) if self.shared.is_open() && !self.shared.is_capturing() => unit
                    .reset()
                    .map_err(|status| CaptureError::hardware(HardwareStep::Reset, status))
                    .and_then(|()| {
                        unit.start()
                            .map_err(|status| CaptureError::hardware(HardwareStep::Start, status))
                    }),
                _ => Err(CaptureError::InvalidState(
                    "cannot start stream: not open, already capturing, or no hardware unit".into(),
                )),
            }
        };

        match result {
            Ok(()) => {
                self.shared.set_capturing(true);
                log::info!("[{}] Capture started", self.id());
                self.notify_state(StreamState::Capturing);
                Ok(())
            }
            Err(e) => {
                log::error!("[{}] Failed to start capture: {}", self.id(), e);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Stop capture. Transitions: capturing → open.
    ///
    /// A hardware stop failure is returned, but the stream no longer counts
    /// as capturing either way.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.is_stream_open() || !self.is_capturing() {
            log::warn!("[{}] Cannot stop stream: not capturing", self.id());
            return Err(CaptureError::InvalidState("stream is not capturing".into()));
        }

        let result = self.stop_hardware();
        self.notify_state(StreamState::Open);
        if let Err(ref e) = result {
            log::error!("[{}] Failed to stop capture: {}", self.id(), e);
            self.report(e);
        } else {
            log::info!("[{}] Capture stopped", self.id());
        }
        result
    }

    fn stop_hardware(&mut self) -> Result<(), CaptureError> {
        let mut state = self.shared.render.lock();
        let result = match state.unit.as_mut() {
            Some(unit) => unit
                .stop()
                .map_err(|status| CaptureError::hardware(HardwareStep::Stop, status)),
            None => Ok(()),
        };
        self.shared.set_capturing(false);
        result
    }

    /// Close the stream, disposing the hardware unit and the scratch buffer.
    /// Always succeeds; closing a closed stream changes nothing.
    pub fn close(&mut self) {
        if self.is_capturing() {
            let _ = self.stop();
        }

        let was_open = self.is_stream_open();
        self.force_closed();
        if was_open {
            log::info!("[{}] Capture stream closed", self.id());
            self.notify_state(StreamState::Closed);
        }
    }

    /// Stop and close regardless of the current state.
    pub fn abort(&mut self) {
        if self.is_stream_open() {
            log::warn!("[{}] Aborting capture stream", self.id());
        }
        self.close();
    }

    /// Toggle echo cancellation or automatic gain control on the open unit.
    /// Does nothing while no unit exists; hardware errors are ignored.
    ///
    /// Holds the render lock while the property is set, so a render cycle
    /// arriving meanwhile is skipped.
    pub fn set_hardware_feature_enabled(&self, feature: HardwareFeature, enabled: bool) {
        let mut state = self.shared.render.lock();
        if let Some(unit) = state.unit.as_mut() {
            apply_feature(unit.as_mut(), feature, enabled);
        }
    }

    /// Return to closed, cancelling any initialization still in flight.
    ///
    /// Cancellation and the init thread's commit both happen under the render
    /// lock, so a unit committed after `open` gave up is always disposed here
    /// or by the init thread itself, never left installed.
    fn force_closed(&mut self) {
        let stale_unit = {
            let mut state = self.shared.render.lock();
            if let Some(token) = self.pending_init.take() {
                token.cancel();
            }
            self.shared.set_capturing(false);
            self.shared.set_open(false);
            state.scratch.release();
            self.shared.publish_scratch(&state.scratch);
            state.on_captured = None;
            state.unit.take()
        };
        drop(stale_unit);
    }

    fn notify_state(&self, state: StreamState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn report(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.abort();
    }
}
