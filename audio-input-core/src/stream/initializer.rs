use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::config::CaptureDeviceParams;
use crate::models::device::HardwareFeature;
use crate::models::error::{CaptureError, HardwareStep};
use crate::models::format::{Bus, StreamFormat};
use crate::models::status::OsStatus;
use crate::sync::cancellation::CancellationToken;
use crate::sync::one_shot::OneShotSender;
use crate::traits::hardware::{HardwareUnit, HardwareUnitFactory};

use super::features::apply_feature;
use super::render::RenderContext;
use super::shared::StreamShared;

/// Outcome of one initialization attempt.
pub(crate) type InitializationOutcome = Result<(), CaptureError>;

/// Hardware configuration performed off the caller's thread during `open`.
///
/// Sequence:
/// 1. Instantiate the voice processing I/O unit
/// 2. Enable the input bus, disable the output bus
/// 3. Set the float32 stream format on the input bus
/// 4. Register the render callback
/// 5. Initialize, retrying once on the transient error
/// 6. Apply echo cancellation and AGC
/// 7. Commit the unit to the stream and mark it open
///
/// The cancellation token is checked between steps and again, under the
/// render lock, at commit.
pub(crate) struct InitializationTask {
    pub(crate) factory: Arc<dyn HardwareUnitFactory>,
    pub(crate) shared: Arc<StreamShared>,
    pub(crate) format: StreamFormat,
    pub(crate) params: CaptureDeviceParams,
    pub(crate) retry_delay: Duration,
    pub(crate) token: CancellationToken,
}

impl InitializationTask {
    /// Run on a dedicated thread, delivering the outcome through `outcome`.
    pub(crate) fn spawn(
        self,
        outcome: OneShotSender<InitializationOutcome>,
    ) -> Result<(), CaptureError> {
        thread::Builder::new()
            .name("audio-input-init".into())
            .spawn(move || {
                let result = self.run();
                outcome.send(result);
            })
            .map(|_| ())
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn init thread: {}", e)))
    }

    fn run(self) -> InitializationOutcome {
        let mut unit = self
            .factory
            .instantiate_voice_processing_io()
            .map_err(|status| self.failed(HardwareStep::Instantiate, status))?;
        self.checkpoint()?;

        unit.set_io_enabled(Bus::Input, true)
            .map_err(|status| self.failed(HardwareStep::EnableInput, status))?;
        unit.set_io_enabled(Bus::Output, false)
            .map_err(|status| self.failed(HardwareStep::DisableOutput, status))?;
        self.checkpoint()?;

        unit.set_stream_format(Bus::Input, &self.format)
            .map_err(|status| self.failed(HardwareStep::SetStreamFormat, status))?;
        unit.set_input_callback(Bus::Input, RenderContext::new(&self.shared))
            .map_err(|status| self.failed(HardwareStep::SetInputCallback, status))?;
        self.checkpoint()?;

        self.initialize(unit.as_mut())?;

        let enabled = self.params.use_hardware_echo_cancellation;
        apply_feature(unit.as_mut(), HardwareFeature::EchoCancellation, enabled);
        apply_feature(unit.as_mut(), HardwareFeature::AutomaticGainControl, enabled);

        self.commit(unit)
    }

    fn initialize(&self, unit: &mut dyn HardwareUnit) -> InitializationOutcome {
        match unit.initialize() {
            Ok(()) => Ok(()),
            Err(OsStatus::INITIALIZE_TRANSIENT) => {
                log::warn!(
                    "[{}] AudioUnitInitialize failed with error {}, retrying after {:?}",
                    self.shared.stream_id,
                    OsStatus::INITIALIZE_TRANSIENT,
                    self.retry_delay
                );
                thread::sleep(self.retry_delay);
                self.checkpoint()?;
                unit.initialize()
                    .map_err(|status| self.failed(HardwareStep::InitializeRetry, status))
            }
            Err(status) => Err(self.failed(HardwareStep::Initialize, status)),
        }
    }

    /// Install the unit unless `open` has already given up on this attempt.
    fn commit(&self, unit: Box<dyn HardwareUnit>) -> InitializationOutcome {
        let mut state = self.shared.render.lock();
        if self.token.is_cancelled() {
            drop(state);
            log::warn!(
                "[{}] Audio unit initialization finished after open gave up; disposing unit",
                self.shared.stream_id
            );
            drop(unit);
            return Err(CaptureError::Cancelled);
        }

        state.unit = Some(unit);
        self.shared.mark_opened();
        self.shared.set_open(true);
        log::info!("[{}] Audio unit initialization succeeded", self.shared.stream_id);
        Ok(())
    }

    fn checkpoint(&self) -> InitializationOutcome {
        if self.token.is_cancelled() {
            log::warn!(
                "[{}] Audio unit initialization cancelled",
                self.shared.stream_id
            );
            return Err(CaptureError::Cancelled);
        }
        Ok(())
    }

    fn failed(&self, step: HardwareStep, status: OsStatus) -> CaptureError {
        let error = CaptureError::hardware(step, status);
        log::error!(
            "[{}] Unable to open capture stream due to {}",
            self.shared.stream_id,
            error
        );
        error
    }
}
