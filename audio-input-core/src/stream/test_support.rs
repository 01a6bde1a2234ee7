//! Deterministic fakes for the platform collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::config::StreamConfiguration;
use crate::models::error::{CaptureError, HardwareStep};
use crate::models::format::{AudioTimestamp, Bus, RenderActionFlags, StreamFormat};
use crate::models::state::StreamState;
use crate::models::status::OsStatus;
use crate::processing::scratch_buffer::ScratchBuffer;
use crate::traits::capture_callback::{CapturedAudio, OnAudioCaptured};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::hardware::{HardwareUnit, HardwareUnitFactory, VoiceProcessingProperty};
use crate::traits::permission::{PermissionCompletion, PermissionProvider, RecordPermission};
use crate::traits::session::{SessionCategory, SessionCategoryOptions, SessionConfigurer};

use super::capture_stream::{AudioPlatform, CaptureStream};
use super::render::RenderContext;

/// Short timeouts so failing tests do not hang.
pub(crate) fn fixture_config() -> StreamConfiguration {
    StreamConfiguration {
        init_timeout_ms: 2000,
        transient_retry_delay_ms: 1,
        ..Default::default()
    }
}

pub(crate) struct Fixture {
    pub(crate) permissions: Arc<FakePermissions>,
    pub(crate) session: Arc<FakeSession>,
    pub(crate) hardware: Arc<FakeHardware>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_permissions(FakePermissions::granted())
    }

    pub(crate) fn with_permissions(permissions: FakePermissions) -> Self {
        Self {
            permissions: Arc::new(permissions),
            session: Arc::new(FakeSession::default()),
            hardware: Arc::new(FakeHardware::default()),
        }
    }

    pub(crate) fn platform(&self) -> AudioPlatform {
        AudioPlatform {
            permissions: self.permissions.clone(),
            session: self.session.clone(),
            hardware: self.hardware.clone(),
        }
    }

    pub(crate) fn stream(&self) -> CaptureStream {
        self.stream_with(fixture_config())
    }

    pub(crate) fn stream_with(&self, config: StreamConfiguration) -> CaptureStream {
        CaptureStream::new(config, self.platform()).unwrap()
    }
}

pub(crate) fn render_with(context: &RenderContext, frame_count: u32) -> OsStatus {
    let mut flags = RenderActionFlags::default();
    context.on_render(
        &mut flags,
        &AudioTimestamp::default(),
        Bus::Input.element(),
        frame_count,
    )
}

pub(crate) fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// --- Permissions ---

pub(crate) struct FakePermissions {
    status: RecordPermission,
    answer: Option<bool>,
    requests: AtomicUsize,
}

impl FakePermissions {
    pub(crate) fn granted() -> Self {
        Self::answering(RecordPermission::Granted, true)
    }

    /// Answers asynchronously, from another thread.
    pub(crate) fn answering(status: RecordPermission, answer: bool) -> Self {
        Self {
            status,
            answer: Some(answer),
            requests: AtomicUsize::new(0),
        }
    }

    /// Drops the completion handler without calling it.
    pub(crate) fn unanswered() -> Self {
        Self {
            status: RecordPermission::Undetermined,
            answer: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PermissionProvider for FakePermissions {
    fn record_permission(&self) -> RecordPermission {
        self.status
    }

    fn request_record_permission(&self, completion: PermissionCompletion) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Some(granted) => {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5));
                    completion(granted);
                });
            }
            None => drop(completion),
        }
    }
}

// --- Session ---

#[derive(Default)]
pub(crate) struct FakeSession {
    calls: Mutex<Vec<String>>,
    category_failure: Mutex<Option<OsStatus>>,
    activate_failure: Mutex<Option<OsStatus>>,
}

impl FakeSession {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn fail_category(&self, status: OsStatus) {
        *self.category_failure.lock() = Some(status);
    }

    pub(crate) fn fail_activate(&self, status: OsStatus) {
        *self.activate_failure.lock() = Some(status);
    }
}

impl SessionConfigurer for FakeSession {
    fn set_category(
        &self,
        category: SessionCategory,
        options: SessionCategoryOptions,
    ) -> Result<(), OsStatus> {
        let mut flags = Vec::new();
        if options.default_to_speaker {
            flags.push("speaker");
        }
        if options.allow_bluetooth {
            flags.push("bluetooth");
        }
        self.calls
            .lock()
            .push(format!("set_category({:?}, {})", category, flags.join("+")));
        self.category_failure.lock().map_or(Ok(()), Err)
    }

    fn set_active(&self, active: bool) -> Result<(), OsStatus> {
        self.calls.lock().push(format!("set_active({})", active));
        self.activate_failure.lock().map_or(Ok(()), Err)
    }
}

// --- Hardware ---

#[derive(Default)]
struct HardwareProbe {
    calls: Mutex<Vec<String>>,
    properties: Mutex<Vec<(VoiceProcessingProperty, bool)>>,
    failures: Mutex<HashMap<HardwareStep, OsStatus>>,
    initialize_script: Mutex<VecDeque<Result<(), OsStatus>>>,
    render_failure: Mutex<Option<OsStatus>>,
    fail_properties: AtomicBool,
    context: Mutex<Option<RenderContext>>,
    instantiated: AtomicUsize,
    live_units: AtomicUsize,
    held: Mutex<bool>,
    released: Condvar,
}

impl HardwareProbe {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn outcome(&self, step: HardwareStep) -> Result<(), OsStatus> {
        self.failures.lock().get(&step).map_or(Ok(()), |status| Err(*status))
    }
}

/// Factory handing out [`FakeUnit`]s that report into one shared probe.
#[derive(Default)]
pub(crate) struct FakeHardware {
    probe: Arc<HardwareProbe>,
}

impl FakeHardware {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.probe.calls.lock().clone()
    }

    pub(crate) fn properties(&self) -> Vec<(VoiceProcessingProperty, bool)> {
        self.probe.properties.lock().clone()
    }

    pub(crate) fn instantiated(&self) -> usize {
        self.probe.instantiated.load(Ordering::SeqCst)
    }

    pub(crate) fn live_units(&self) -> usize {
        self.probe.live_units.load(Ordering::SeqCst)
    }

    pub(crate) fn fail(&self, step: HardwareStep, status: OsStatus) {
        self.probe.failures.lock().insert(step, status);
    }

    /// Results for successive `initialize` calls; `Ok` once exhausted.
    pub(crate) fn script_initialize(&self, results: Vec<Result<(), OsStatus>>) {
        *self.probe.initialize_script.lock() = results.into();
    }

    pub(crate) fn fail_render(&self, status: Option<OsStatus>) {
        *self.probe.render_failure.lock() = status;
    }

    pub(crate) fn fail_properties(&self) {
        self.probe.fail_properties.store(true, Ordering::SeqCst);
    }

    /// Block `instantiate` until [`release_instantiate`](Self::release_instantiate).
    pub(crate) fn hold_instantiate(&self) {
        *self.probe.held.lock() = true;
    }

    pub(crate) fn release_instantiate(&self) {
        *self.probe.held.lock() = false;
        self.probe.released.notify_all();
    }

    /// Drive one render cycle through the most recently registered callback.
    pub(crate) fn render(&self, frame_count: u32) -> OsStatus {
        let context = self.probe.context.lock().clone();
        match context {
            Some(context) => render_with(&context, frame_count),
            None => OsStatus::RENDER_REJECTED,
        }
    }
}

impl HardwareUnitFactory for FakeHardware {
    fn instantiate_voice_processing_io(&self) -> Result<Box<dyn HardwareUnit>, OsStatus> {
        {
            let mut held = self.probe.held.lock();
            while *held {
                self.probe.released.wait(&mut held);
            }
        }

        self.probe.record("instantiate");
        self.probe.outcome(HardwareStep::Instantiate)?;
        self.probe.instantiated.fetch_add(1, Ordering::SeqCst);
        self.probe.live_units.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeUnit {
            probe: Arc::clone(&self.probe),
        }))
    }
}

pub(crate) struct FakeUnit {
    probe: Arc<HardwareProbe>,
}

impl HardwareUnit for FakeUnit {
    fn set_io_enabled(&mut self, bus: Bus, enabled: bool) -> Result<(), OsStatus> {
        self.probe
            .record(format!("set_io_enabled({:?}, {})", bus, enabled));
        let step = if bus == Bus::Input {
            HardwareStep::EnableInput
        } else {
            HardwareStep::DisableOutput
        };
        self.probe.outcome(step)
    }

    fn set_stream_format(&mut self, bus: Bus, format: &StreamFormat) -> Result<(), OsStatus> {
        self.probe.record(format!(
            "set_stream_format({:?}, {} Hz, {} ch, {} bytes/frame)",
            bus, format.sample_rate, format.channels_per_frame, format.bytes_per_frame
        ));
        self.probe.outcome(HardwareStep::SetStreamFormat)
    }

    fn set_input_callback(&mut self, bus: Bus, context: RenderContext) -> Result<(), OsStatus> {
        self.probe.record(format!("set_input_callback({:?})", bus));
        self.probe.outcome(HardwareStep::SetInputCallback)?;
        *self.probe.context.lock() = Some(context);
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), OsStatus> {
        self.probe.record("initialize");
        let scripted = self.probe.initialize_script.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => self.probe.outcome(HardwareStep::Initialize),
        }
    }

    fn reset(&mut self) -> Result<(), OsStatus> {
        self.probe.record("reset");
        self.probe.outcome(HardwareStep::Reset)
    }

    fn start(&mut self) -> Result<(), OsStatus> {
        self.probe.record("start");
        self.probe.outcome(HardwareStep::Start)
    }

    fn stop(&mut self) -> Result<(), OsStatus> {
        self.probe.record("stop");
        self.probe.outcome(HardwareStep::Stop)
    }

    fn set_voice_processing_property(
        &mut self,
        property: VoiceProcessingProperty,
        enabled: bool,
    ) -> Result<(), OsStatus> {
        self.probe.record(format!("set_property({:?}, {})", property, enabled));
        self.probe.properties.lock().push((property, enabled));
        if self.probe.fail_properties.load(Ordering::SeqCst) {
            return Err(OsStatus(-10879));
        }
        Ok(())
    }

    /// Fills the first channel with a ramp `0.0, 1.0, 2.0, ...`.
    fn render(
        &mut self,
        _action_flags: &mut RenderActionFlags,
        _timestamp: &AudioTimestamp,
        _bus: u32,
        _frame_count: u32,
        buffers: &mut ScratchBuffer,
    ) -> Result<(), OsStatus> {
        if let Some(status) = *self.probe.render_failure.lock() {
            return Err(status);
        }
        if let Some(channel) = buffers.channel_mut(0) {
            for (index, sample) in channel.iter_mut().enumerate() {
                *sample = index as f32;
            }
        }
        Ok(())
    }
}

impl Drop for FakeUnit {
    fn drop(&mut self) {
        self.probe.record("dispose");
        self.probe.live_units.fetch_sub(1, Ordering::SeqCst);
    }
}

// --- Consumer and delegate ---

#[derive(Debug, Clone)]
pub(crate) struct CaptureRecord {
    pub(crate) samples: Vec<f32>,
    pub(crate) frame_count: u32,
    pub(crate) channel_count: u32,
    pub(crate) sample_rate: u32,
    pub(crate) stream_time: f64,
    pub(crate) overflowed: bool,
}

#[derive(Default, Clone)]
pub(crate) struct RecordingConsumer {
    records: Arc<Mutex<Vec<CaptureRecord>>>,
}

impl RecordingConsumer {
    pub(crate) fn callback(&self) -> OnAudioCaptured {
        let records = Arc::clone(&self.records);
        Arc::new(move |audio: &CapturedAudio<'_>| {
            records.lock().push(CaptureRecord {
                samples: audio.samples.to_vec(),
                frame_count: audio.frame_count,
                channel_count: audio.channel_count,
                sample_rate: audio.sample_rate,
                stream_time: audio.stream_time,
                overflowed: audio.overflowed,
            });
        })
    }

    pub(crate) fn records(&self) -> Vec<CaptureRecord> {
        self.records.lock().clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    states: Mutex<Vec<StreamState>>,
    errors: Mutex<Vec<CaptureError>>,
}

impl RecordingDelegate {
    pub(crate) fn states(&self) -> Vec<StreamState> {
        self.states.lock().clone()
    }

    pub(crate) fn errors(&self) -> Vec<CaptureError> {
        self.errors.lock().clone()
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: StreamState) {
        self.states.lock().push(state);
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }
}
